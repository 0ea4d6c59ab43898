//! Registration, explicit key reset and sign-out.
//!
//! A missing local private key is never repaired here behind the user's
//! back. Replacing a published key strands every envelope wrapped for the
//! old one, so it only happens through [`reset_identity_key`].

use crate::directory::Directory;
use crate::error::RelayResult;
use crate::feed::SessionEpoch;
use crate::key_store::LocalKeyStore;
use courier_crypto::{KeyPair, PublicKey};
use tracing::{info, warn};

/// Issues a key pair for `identity`, publishes the public half and stores
/// the private half locally.
///
/// The directory is written before the key store, so a rejected binding
/// leaves any existing local key untouched.
pub fn register(
    identity: &str,
    directory: &dyn Directory,
    key_store: &dyn LocalKeyStore,
) -> RelayResult<PublicKey> {
    let KeyPair { public, private } = KeyPair::generate()?;
    directory.put_public_key(identity, &public)?;
    key_store.set(&private)?;
    info!(identity, "registered identity key");
    Ok(public)
}

/// Replaces the key pair bound to `identity`.
///
/// Messages wrapped for the previous key can no longer be read by this
/// identity. Only call this in response to an explicit user action.
pub fn reset_identity_key(
    identity: &str,
    directory: &dyn Directory,
    key_store: &dyn LocalKeyStore,
) -> RelayResult<PublicKey> {
    let KeyPair { public, private } = KeyPair::generate()?;
    directory.reset_public_key(identity, &public)?;
    key_store.set(&private)?;
    warn!(identity, "identity key pair replaced");
    Ok(public)
}

/// Ends the local session: invalidates in-flight feed batches, then wipes
/// the stored private key.
pub fn sign_out(key_store: &dyn LocalKeyStore, epoch: &SessionEpoch) -> RelayResult<()> {
    let ended = epoch.advance();
    key_store.clear()?;
    info!(session = ended, "signed out");
    Ok(())
}

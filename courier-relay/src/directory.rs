//! Identity → public key directory.
//!
//! The directory is operated by the relay. Bindings are append-only: once an
//! identity has published a key, every envelope wrapped for or signed by it
//! depends on that key staying put. The only way to rebind is the explicit
//! [`Directory::reset_public_key`] administrative action.

use crate::error::{RelayError, RelayResult};
use courier_crypto::PublicKey;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, warn};

/// Lookup and one-time publication of identity public keys.
pub trait Directory: Send + Sync {
    /// Returns the public key bound to `identity`.
    fn get_public_key(&self, identity: &str) -> RelayResult<PublicKey>;

    /// Binds `identity` to `key`.
    ///
    /// Re-publishing the same key is a no-op; a different key fails with
    /// [`RelayError::IdentityAlreadyBound`].
    fn put_public_key(&self, identity: &str, key: &PublicKey) -> RelayResult<()>;

    /// Replaces the key bound to `identity`.
    ///
    /// Envelopes addressed to the previous key become unreadable for this
    /// identity. Callers must surface this to the user before invoking it.
    fn reset_public_key(&self, identity: &str, key: &PublicKey) -> RelayResult<()>;
}

/// Process-local directory holding keys in their textual wire form.
#[derive(Default)]
pub struct InMemoryDirectory {
    keys: RwLock<HashMap<String, String>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.read().map(|k| k.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Directory for InMemoryDirectory {
    fn get_public_key(&self, identity: &str) -> RelayResult<PublicKey> {
        let keys = self.keys.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        let text = keys
            .get(identity)
            .ok_or_else(|| RelayError::DirectoryLookup(identity.to_string()))?;
        Ok(PublicKey::from_base64(text)?)
    }

    fn put_public_key(&self, identity: &str, key: &PublicKey) -> RelayResult<()> {
        let mut keys = self.keys.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let encoded = key.to_base64();
        match keys.get(identity) {
            Some(existing) if *existing == encoded => {
                debug!(identity, "public key already published");
                Ok(())
            }
            Some(_) => Err(RelayError::IdentityAlreadyBound(identity.to_string())),
            None => {
                keys.insert(identity.to_string(), encoded);
                debug!(identity, "published public key");
                Ok(())
            }
        }
    }

    fn reset_public_key(&self, identity: &str, key: &PublicKey) -> RelayResult<()> {
        let previous = self
            .keys
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(identity.to_string(), key.to_base64());
        warn!(
            identity,
            had_previous = previous.is_some(),
            "identity key reset; envelopes wrapped for the old key are no longer readable"
        );
        Ok(())
    }
}

//! Hybrid envelope encryption for a fixed set of readers.
//!
//! One random content key encrypts the plaintext once; that key is then
//! wrapped separately for every reader. In a direct conversation the reader
//! set is {sender, recipient}, which lets the author reread sent history with
//! nothing but their own private key.
//!
//! Every envelope carries an explicit [`EnvelopeScheme`] tag. The tag is also
//! the AEAD associated data, so a ciphertext cannot be reinterpreted under a
//! different scheme.

use crate::cipher::{self, ContentKey, NONCE_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::keypair::{PrivateKey, PublicKey};
use crate::wrap::{self, WrappedKey};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

/// Versioned envelope format identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum EnvelopeScheme {
    /// X25519/XSalsa20-Poly1305 key wrap, ChaCha20-Poly1305 content,
    /// Ed25519 signature.
    #[default]
    V1,
}

impl EnvelopeScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "courier-v1",
        }
    }

    fn aad(&self) -> &'static [u8] {
        self.as_str().as_bytes()
    }
}

impl fmt::Display for EnvelopeScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvelopeScheme {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "courier-v1" => Ok(Self::V1),
            other => Err(CryptoError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// A reader the content key is wrapped for.
#[derive(Clone, Copy, Debug)]
pub struct Reader<'a> {
    pub id: &'a str,
    pub public_key: &'a PublicKey,
}

impl<'a> Reader<'a> {
    pub fn new(id: &'a str, public_key: &'a PublicKey) -> Self {
        Self { id, public_key }
    }
}

/// A content key wrapped for one named reader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReaderKey {
    pub reader_id: String,
    pub wrapped: WrappedKey,
}

/// Ciphertext, nonce, and one wrapped content key per reader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub scheme: EnvelopeScheme,
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_SIZE],
    pub wrapped_keys: Vec<ReaderKey>,
}

impl Envelope {
    /// Returns the wrapped key addressed to `reader_id`, if any.
    pub fn wrapped_key_for(&self, reader_id: &str) -> Option<&WrappedKey> {
        self.wrapped_keys
            .iter()
            .find(|rk| rk.reader_id == reader_id)
            .map(|rk| &rk.wrapped)
    }

    pub fn reader_ids(&self) -> impl Iterator<Item = &str> {
        self.wrapped_keys.iter().map(|rk| rk.reader_id.as_str())
    }
}

/// Encrypts `plaintext` once and wraps the content key for every reader.
///
/// A repeated reader id is wrapped only once. Fails with
/// [`CryptoError::NoReaders`] for an empty reader list and with
/// [`CryptoError::Generation`] if randomness is unavailable.
pub fn wrap_for_recipients(plaintext: &[u8], readers: &[Reader<'_>]) -> CryptoResult<Envelope> {
    if readers.is_empty() {
        return Err(CryptoError::NoReaders);
    }

    let scheme = EnvelopeScheme::default();
    let content_key = ContentKey::random()?;
    let nonce = cipher::random_nonce()?;
    let ciphertext = cipher::seal(&content_key, &nonce, plaintext, scheme.aad())?;

    let mut wrapped_keys: Vec<ReaderKey> = Vec::with_capacity(readers.len());
    for reader in readers {
        if wrapped_keys.iter().any(|rk| rk.reader_id == reader.id) {
            continue;
        }
        wrapped_keys.push(ReaderKey {
            reader_id: reader.id.to_string(),
            wrapped: wrap::wrap_key(&content_key, reader.public_key)?,
        });
    }

    Ok(Envelope {
        scheme,
        ciphertext,
        nonce,
        wrapped_keys,
    })
}

/// Recovers the plaintext as `reader_id`.
///
/// Fails with [`CryptoError::KeyUnwrap`] when no blob is addressed to the
/// reader or the private key does not open it, and with
/// [`CryptoError::Decryption`] when the content itself does not authenticate.
pub fn unwrap(
    envelope: &Envelope,
    reader_id: &str,
    private_key: &PrivateKey,
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    let wrapped = envelope.wrapped_key_for(reader_id).ok_or_else(|| {
        CryptoError::KeyUnwrap(format!("no wrapped key addressed to reader {reader_id}"))
    })?;
    let content_key = wrap::unwrap_key(wrapped, private_key)?;
    cipher::open(
        &content_key,
        &envelope.nonce,
        &envelope.ciphertext,
        envelope.scheme.aad(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypair::generate_keypair;

    #[test]
    fn duplicate_reader_is_wrapped_once() {
        let kp = generate_keypair().unwrap();
        let env = wrap_for_recipients(
            b"note to self",
            &[Reader::new("ana", &kp.public), Reader::new("ana", &kp.public)],
        )
        .unwrap();
        assert_eq!(env.wrapped_keys.len(), 1);
        assert_eq!(unwrap(&env, "ana", &kp.private).unwrap().as_slice(), b"note to self");
    }

    #[test]
    fn scheme_tag_parses_back() {
        let tag = EnvelopeScheme::V1.to_string();
        assert_eq!(tag.parse::<EnvelopeScheme>().unwrap(), EnvelopeScheme::V1);
        assert!("courier-v0".parse::<EnvelopeScheme>().is_err());
    }
}

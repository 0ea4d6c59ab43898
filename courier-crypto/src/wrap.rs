//! Content-key wrapping for a single reader.
//!
//! Uses X25519 key exchange + XSalsa20-Poly1305. Each wrap generates its own
//! ephemeral X25519 secret and nonce, so wrapping the same content key twice
//! for the same reader never yields the same blob.
//!
//! Blob layout: `ephemeral_public_key(32) || nonce(24) || sealed_key(48)`.

use crate::cipher::{CONTENT_KEY_SIZE, ContentKey, TAG_SIZE};
use crate::encoding::{from_base64, to_base64};
use crate::error::{CryptoError, CryptoResult};
use crate::keypair::{KEY_SIZE, PrivateKey, PublicKey, random_bytes};
use crypto_box::SalsaBox;
use crypto_box::aead::Aead;
use zeroize::Zeroizing;

/// XSalsa20 nonce size in bytes.
pub const WRAP_NONCE_SIZE: usize = 24;

/// Total serialized length of a wrapped content key.
pub const WRAPPED_KEY_LEN: usize = KEY_SIZE + WRAP_NONCE_SIZE + CONTENT_KEY_SIZE + TAG_SIZE;

/// A content key sealed to one reader's agreement key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrappedKey {
    /// Ephemeral X25519 public key (sender side of DH).
    pub ephemeral_public_key: [u8; KEY_SIZE],
    pub nonce: [u8; WRAP_NONCE_SIZE],
    /// Sealed content key + Poly1305 tag.
    pub ciphertext: Vec<u8>,
}

impl WrappedKey {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(KEY_SIZE + WRAP_NONCE_SIZE + self.ciphertext.len());
        out.extend_from_slice(&self.ephemeral_public_key);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != WRAPPED_KEY_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: WRAPPED_KEY_LEN,
                actual: bytes.len(),
            });
        }
        let mut ephemeral_public_key = [0u8; KEY_SIZE];
        let mut nonce = [0u8; WRAP_NONCE_SIZE];
        ephemeral_public_key.copy_from_slice(&bytes[..KEY_SIZE]);
        nonce.copy_from_slice(&bytes[KEY_SIZE..KEY_SIZE + WRAP_NONCE_SIZE]);
        Ok(Self {
            ephemeral_public_key,
            nonce,
            ciphertext: bytes[KEY_SIZE + WRAP_NONCE_SIZE..].to_vec(),
        })
    }

    pub fn to_base64(&self) -> String {
        to_base64(&self.to_bytes())
    }

    pub fn from_base64(text: &str) -> CryptoResult<Self> {
        Self::from_bytes(&from_base64(text)?)
    }
}

/// Seals a content key for one reader.
pub(crate) fn wrap_key(key: &ContentKey, reader: &PublicKey) -> CryptoResult<WrappedKey> {
    let ephemeral_bytes = Zeroizing::new(random_bytes::<KEY_SIZE>()?);
    let ephemeral = crypto_box::SecretKey::from(*ephemeral_bytes);
    let ephemeral_pk = ephemeral.public_key();

    let salsa_box = SalsaBox::new(&reader.agreement_key(), &ephemeral);
    let nonce = random_bytes::<WRAP_NONCE_SIZE>()?;

    let ciphertext = salsa_box
        .encrypt(crypto_box::Nonce::from_slice(&nonce), key.as_bytes().as_slice())
        .map_err(|e| CryptoError::Encryption(format!("key wrap failed: {e}")))?;

    Ok(WrappedKey {
        ephemeral_public_key: *ephemeral_pk.as_bytes(),
        nonce,
        ciphertext,
    })
}

/// Opens a wrapped content key with the reader's private key.
pub(crate) fn unwrap_key(wrapped: &WrappedKey, reader: &PrivateKey) -> CryptoResult<ContentKey> {
    let ephemeral_pk = crypto_box::PublicKey::from(wrapped.ephemeral_public_key);
    let salsa_box = SalsaBox::new(&ephemeral_pk, &reader.agreement_secret());

    let opened = salsa_box
        .decrypt(
            crypto_box::Nonce::from_slice(&wrapped.nonce),
            wrapped.ciphertext.as_ref(),
        )
        .map(Zeroizing::new)
        .map_err(|_| {
            CryptoError::KeyUnwrap("wrapped key did not open (wrong key or tampered data)".to_string())
        })?;

    ContentKey::from_slice(&opened)
        .map_err(|e| CryptoError::KeyUnwrap(format!("unwrapped key malformed: {e}")))
}

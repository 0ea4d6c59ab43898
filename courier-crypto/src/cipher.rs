//! Per-message content encryption.
//!
//! ChaCha20-Poly1305 with a random 256-bit content key and a random 96-bit
//! nonce, both drawn fresh for every message. The content key never leaves
//! this crate unwrapped.

use crate::error::{CryptoError, CryptoResult};
use crate::keypair::random_bytes;
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use zeroize::{ZeroizeOnDrop, Zeroizing};

/// Content key size in bytes.
pub const CONTENT_KEY_SIZE: usize = 32;

/// ChaCha20-Poly1305 nonce size in bytes.
pub const NONCE_SIZE: usize = 12;

/// Poly1305 tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// Symmetric key for exactly one message.
#[derive(ZeroizeOnDrop)]
pub struct ContentKey([u8; CONTENT_KEY_SIZE]);

impl ContentKey {
    pub(crate) fn random() -> CryptoResult<Self> {
        Ok(Self(random_bytes::<CONTENT_KEY_SIZE>()?))
    }

    pub(crate) fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let arr: [u8; CONTENT_KEY_SIZE] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: CONTENT_KEY_SIZE,
                    actual: bytes.len(),
                })?;
        Ok(Self(arr))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; CONTENT_KEY_SIZE] {
        &self.0
    }
}

pub(crate) fn random_nonce() -> CryptoResult<[u8; NONCE_SIZE]> {
    random_bytes::<NONCE_SIZE>()
}

/// Encrypts `plaintext` under `key`/`nonce`, authenticating `aad`.
pub(crate) fn seal(
    key: &ContentKey,
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
    aad: &[u8],
) -> CryptoResult<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    cipher
        .encrypt(Nonce::from_slice(nonce), Payload { msg: plaintext, aad })
        .map_err(|e| CryptoError::Encryption(format!("content seal failed: {e}")))
}

/// Decrypts and authenticates content sealed by [`seal`].
pub(crate) fn open(
    key: &ContentKey,
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
    aad: &[u8],
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    if ciphertext.len() < TAG_SIZE {
        return Err(CryptoError::Decryption(format!(
            "ciphertext shorter than {TAG_SIZE}-byte tag"
        )));
    }
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    cipher
        .decrypt(Nonce::from_slice(nonce), Payload { msg: ciphertext, aad })
        .map(Zeroizing::new)
        .map_err(|_| {
            CryptoError::Decryption("content open failed (wrong key or tampered data)".to_string())
        })
}

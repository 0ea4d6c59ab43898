//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors produced by key issuance, envelope encryption and signing.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The OS randomness source could not supply bytes.
    #[error("key generation failed: {0}")]
    Generation(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// The wrapped content key could not be recovered for this reader.
    #[error("key unwrap failed: {0}")]
    KeyUnwrap(String),

    /// The content key was recovered but the ciphertext did not authenticate.
    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("unsupported envelope scheme: {0}")]
    UnsupportedScheme(String),

    #[error("envelope must have at least one reader")]
    NoReaders,

    #[error("base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),
}

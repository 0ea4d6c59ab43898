//! Relay-side error types.

use thiserror::Error;

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// Errors that abort a single registration, send or read action.
///
/// Per-message read failures are not errors at this level; the pipeline
/// reports them as outcomes so one bad record never hides the rest.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("no public key registered for identity {0}")]
    DirectoryLookup(String),

    #[error("identity {0} is already bound to a different public key")]
    IdentityAlreadyBound(String),

    #[error("local private key not found")]
    MissingPrivateKey,

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("crypto error: {0}")]
    Crypto(#[from] courier_crypto::CryptoError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("key store I/O error: {0}")]
    KeyStore(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("feed is not running")]
    FeedClosed,
}

/// Errors decoding a transport record into a signed message.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("malformed field {field}: {reason}")]
    MalformedField { field: &'static str, reason: String },

    #[error("envelope has no wrapped key for {0}")]
    MissingWrappedKey(String),
}

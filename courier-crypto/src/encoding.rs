//! Textual encoding shared with the transport boundary.
//!
//! Every binary field that leaves this crate (keys, wrapped keys, nonces,
//! ciphertext, signatures) is carried as standard padded base64.

use crate::error::CryptoResult;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encodes raw bytes as standard base64.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes standard base64 into raw bytes.
pub fn from_base64(text: &str) -> CryptoResult<Vec<u8>> {
    Ok(STANDARD.decode(text.trim())?)
}

/// Decodes base64 into a fixed-size array, rejecting any other length.
pub fn from_base64_array<const N: usize>(text: &str) -> CryptoResult<[u8; N]> {
    let bytes = from_base64(text)?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| crate::CryptoError::InvalidKeyLength { expected: N, actual })
}

//! Identity key pair issuance.
//!
//! A principal's identity is a bundle of two fixed-parameter halves:
//!
//! - **agreement**: X25519, used to unwrap per-message content keys
//! - **signing**: Ed25519, used to sign message plaintext
//!
//! Both halves are 32 bytes. The public bundle is published once through the
//! directory; the private bundle stays with the caller, who passes it by
//! reference into each sign/unwrap call.
//!
//! Bundle wire format (before base64): `version(1) || agreement(32) || signing(32)`.

use crate::encoding::{from_base64, to_base64};
use crate::error::{CryptoError, CryptoResult};
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::TryRngCore;
use rand::rngs::OsRng;
use std::fmt;
use zeroize::{ZeroizeOnDrop, Zeroizing};

/// Size of each key half in bytes.
pub const KEY_SIZE: usize = 32;

/// Version byte prefixed to serialized key bundles.
pub const KEY_BUNDLE_VERSION: u8 = 1;

/// Serialized length of a public or private bundle.
pub const KEY_BUNDLE_LEN: usize = 1 + 2 * KEY_SIZE;

/// Fills a fixed-size array from the OS CSPRNG.
///
/// Randomness failures are reported as [`CryptoError::Generation`] so that
/// callers never proceed with predictable key material.
pub(crate) fn random_bytes<const N: usize>() -> CryptoResult<[u8; N]> {
    let mut out = [0u8; N];
    OsRng
        .try_fill_bytes(&mut out)
        .map_err(|e| CryptoError::Generation(format!("OS randomness unavailable: {e}")))?;
    Ok(out)
}

/// Public half of an identity bundle. Safe to publish and log.
#[derive(Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PublicKey {
    agreement: [u8; KEY_SIZE],
    verifying: [u8; KEY_SIZE],
}

impl PublicKey {
    /// X25519 public key used as the wrap target.
    pub fn agreement_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.agreement
    }

    /// Ed25519 verifying key.
    pub fn verifying_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.verifying
    }

    pub(crate) fn agreement_key(&self) -> crypto_box::PublicKey {
        crypto_box::PublicKey::from(self.agreement)
    }

    pub(crate) fn verifying_key(&self) -> CryptoResult<VerifyingKey> {
        VerifyingKey::from_bytes(&self.verifying)
            .map_err(|e| CryptoError::InvalidKey(format!("bad verifying key: {e}")))
    }

    pub fn to_bytes(&self) -> [u8; KEY_BUNDLE_LEN] {
        let mut out = [0u8; KEY_BUNDLE_LEN];
        out[0] = KEY_BUNDLE_VERSION;
        out[1..1 + KEY_SIZE].copy_from_slice(&self.agreement);
        out[1 + KEY_SIZE..].copy_from_slice(&self.verifying);
        out
    }

    /// Parses a serialized public bundle, validating version, length and
    /// that the signing half is a valid curve point.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let (agreement, verifying) = split_bundle(bytes, "public")?;
        let key = Self { agreement, verifying };
        key.verifying_key()?;
        Ok(key)
    }

    pub fn to_base64(&self) -> String {
        to_base64(&self.to_bytes())
    }

    pub fn from_base64(text: &str) -> CryptoResult<Self> {
        Self::from_bytes(&from_base64(text)?)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_base64()).finish()
    }
}

impl From<PublicKey> for String {
    fn from(key: PublicKey) -> Self {
        key.to_base64()
    }
}

impl TryFrom<String> for PublicKey {
    type Error = CryptoError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Self::from_base64(&text)
    }
}

/// Private half of an identity bundle.
///
/// Deliberately not `Clone`: each holder is a scoped handle and the bytes are
/// wiped when it drops.
#[derive(ZeroizeOnDrop)]
pub struct PrivateKey {
    agreement: [u8; KEY_SIZE],
    signing: [u8; KEY_SIZE],
}

impl PrivateKey {
    /// Recomputes the matching public bundle.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            agreement: *self.agreement_secret().public_key().as_bytes(),
            verifying: self.signing_key().verifying_key().to_bytes(),
        }
    }

    pub(crate) fn agreement_secret(&self) -> crypto_box::SecretKey {
        crypto_box::SecretKey::from(self.agreement)
    }

    pub(crate) fn signing_key(&self) -> SigningKey {
        SigningKey::from_bytes(&self.signing)
    }

    pub fn to_bytes(&self) -> Zeroizing<[u8; KEY_BUNDLE_LEN]> {
        let mut out = Zeroizing::new([0u8; KEY_BUNDLE_LEN]);
        out[0] = KEY_BUNDLE_VERSION;
        out[1..1 + KEY_SIZE].copy_from_slice(&self.agreement);
        out[1 + KEY_SIZE..].copy_from_slice(&self.signing);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let (agreement, signing) = split_bundle(bytes, "private")?;
        Ok(Self { agreement, signing })
    }

    /// Base64 form for the caller's local key store.
    pub fn to_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(to_base64(self.to_bytes().as_ref()))
    }

    pub fn from_base64(text: &str) -> CryptoResult<Self> {
        let bytes = Zeroizing::new(from_base64(text)?);
        Self::from_bytes(&bytes)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

fn split_bundle(bytes: &[u8], kind: &str) -> CryptoResult<([u8; KEY_SIZE], [u8; KEY_SIZE])> {
    if bytes.len() != KEY_BUNDLE_LEN {
        return Err(CryptoError::InvalidKeyLength {
            expected: KEY_BUNDLE_LEN,
            actual: bytes.len(),
        });
    }
    if bytes[0] != KEY_BUNDLE_VERSION {
        return Err(CryptoError::InvalidKey(format!(
            "unsupported {kind} key bundle version {}",
            bytes[0]
        )));
    }
    let mut first = [0u8; KEY_SIZE];
    let mut second = [0u8; KEY_SIZE];
    first.copy_from_slice(&bytes[1..1 + KEY_SIZE]);
    second.copy_from_slice(&bytes[1 + KEY_SIZE..]);
    Ok((first, second))
}

/// A freshly issued identity key pair.
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

impl KeyPair {
    /// Issues a new key pair from OS randomness.
    pub fn generate() -> CryptoResult<Self> {
        let agreement = Zeroizing::new(random_bytes::<KEY_SIZE>()?);
        let signing = Zeroizing::new(random_bytes::<KEY_SIZE>()?);
        let private = PrivateKey {
            agreement: *agreement,
            signing: *signing,
        };
        let public = private.public_key();
        Ok(Self { public, private })
    }
}

/// Generates a new identity key pair.
pub fn generate_keypair() -> CryptoResult<KeyPair> {
    KeyPair::generate()
}

//! Plaintext signatures.
//!
//! Ed25519 over the plaintext bytes (never the ciphertext). Callers must not
//! assume two signatures over the same plaintext are byte-identical.

use crate::keypair::{PrivateKey, PublicKey};
use ed25519_dalek::{Signature, Signer};

/// Ed25519 signature length in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// Signs `plaintext` with the sender's private key.
pub fn sign(plaintext: &[u8], private_key: &PrivateKey) -> Vec<u8> {
    private_key.signing_key().sign(plaintext).to_bytes().to_vec()
}

/// Checks `signature` over `plaintext` against the claimed sender key.
///
/// Never fails: malformed, truncated or foreign signatures and unusable keys
/// all yield `false`.
pub fn verify(plaintext: &[u8], signature: &[u8], claimed: &PublicKey) -> bool {
    let Ok(bytes) = <[u8; SIGNATURE_SIZE]>::try_from(signature) else {
        return false;
    };
    let Ok(verifying_key) = claimed.verifying_key() else {
        return false;
    };
    verifying_key
        .verify_strict(plaintext, &Signature::from_bytes(&bytes))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypair::generate_keypair;

    #[test]
    fn truncated_signature_is_false() {
        let kp = generate_keypair().unwrap();
        let sig = sign(b"hello", &kp.private);
        assert!(!verify(b"hello", &sig[..SIGNATURE_SIZE - 1], &kp.public));
        assert!(!verify(b"hello", &[], &kp.public));
    }
}

use courier_crypto::keypair::{KEY_BUNDLE_LEN, KEY_BUNDLE_VERSION};
use courier_crypto::{CryptoError, PrivateKey, PublicKey, generate_keypair};
use pretty_assertions::assert_eq;

#[test]
fn keypair_generation_produces_distinct_halves() {
    let kp = generate_keypair().unwrap();
    assert_ne!(kp.public.agreement_bytes(), kp.public.verifying_bytes());
    assert_eq!(kp.public.to_bytes()[0], KEY_BUNDLE_VERSION);
    assert_eq!(kp.public.to_bytes().len(), KEY_BUNDLE_LEN);
}

#[test]
fn two_generations_never_collide() {
    let a = generate_keypair().unwrap();
    let b = generate_keypair().unwrap();
    assert_ne!(a.public, b.public);
}

#[test]
fn public_key_text_roundtrip() {
    let kp = generate_keypair().unwrap();
    let text = kp.public.to_base64();
    assert_eq!(PublicKey::from_base64(&text).unwrap(), kp.public);
}

#[test]
fn private_key_text_roundtrip_keeps_public_half() {
    let kp = generate_keypair().unwrap();
    let text = kp.private.to_base64();
    let restored = PrivateKey::from_base64(&text).unwrap();
    assert_eq!(restored.public_key(), kp.public);
}

#[test]
fn public_key_serde_uses_base64_string() {
    let kp = generate_keypair().unwrap();
    let json = serde_json::to_string(&kp.public).unwrap();
    assert_eq!(json, format!("\"{}\"", kp.public.to_base64()));
    let back: PublicKey = serde_json::from_str(&json).unwrap();
    assert_eq!(back, kp.public);
}

#[test]
fn wrong_length_public_key_rejected() {
    let kp = generate_keypair().unwrap();
    let bytes = kp.public.to_bytes();
    let err = PublicKey::from_bytes(&bytes[..KEY_BUNDLE_LEN - 1]).unwrap_err();
    assert!(matches!(
        err,
        CryptoError::InvalidKeyLength { expected: KEY_BUNDLE_LEN, .. }
    ));
}

#[test]
fn malformed_private_key_text_rejected() {
    assert!(matches!(
        PrivateKey::from_base64("***"),
        Err(CryptoError::Base64Decode(_))
    ));
}

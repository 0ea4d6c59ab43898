use courier_relay::{RelayConfig, RelayError};
use pretty_assertions::assert_eq;

#[test]
fn defaults() {
    let config = RelayConfig::default();
    assert_eq!(config.max_message_chars, 4096);
    assert_eq!(config.decryption_failed_placeholder, "Unable to decrypt message");
    assert_eq!(config.last_message_preview, "Encrypted message");
    assert_eq!(config.parallel_batch_threshold, 8);
    assert_eq!(config.feed_buffer, 64);
    assert!(config.validate().is_ok());
}

#[test]
fn empty_toml_gives_defaults() {
    assert_eq!(RelayConfig::from_toml_str("").unwrap(), RelayConfig::default());
}

#[test]
fn partial_toml_overrides_only_given_keys() {
    let config = RelayConfig::from_toml_str(
        r#"
        max_message_chars = 280
        decryption_failed_placeholder = "[unreadable]"
        "#,
    )
    .unwrap();
    assert_eq!(config.max_message_chars, 280);
    assert_eq!(config.decryption_failed_placeholder, "[unreadable]");
    assert_eq!(config.feed_buffer, 64);
}

#[test]
fn zero_limits_are_rejected() {
    for text in ["max_message_chars = 0", "feed_buffer = 0"] {
        assert!(matches!(
            RelayConfig::from_toml_str(text),
            Err(RelayError::Config(_))
        ));
    }
}

#[test]
fn blank_placeholders_are_rejected() {
    let config = RelayConfig {
        last_message_preview: "  ".into(),
        ..RelayConfig::default()
    };
    assert!(matches!(config.validate(), Err(RelayError::Config(_))));
}

#[test]
fn malformed_toml_is_a_config_error() {
    assert!(matches!(
        RelayConfig::from_toml_str("max_message_chars = \"lots\""),
        Err(RelayError::Config(_))
    ));
}

#[test]
fn serialization_roundtrip() {
    let config = RelayConfig {
        parallel_batch_threshold: 2,
        ..RelayConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let deserialized: RelayConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized, config);
}

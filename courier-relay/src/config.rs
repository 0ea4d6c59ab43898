//! Relay client configuration.

use crate::error::{RelayError, RelayResult};
use serde::{Deserialize, Serialize};

/// Configuration for composing and reading messages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Maximum message length in characters.
    pub max_message_chars: usize,

    /// Text shown in place of a message that could not be decrypted.
    pub decryption_failed_placeholder: String,

    /// Conversation preview stored with the last message (never plaintext).
    pub last_message_preview: String,

    /// Batches smaller than this are decrypted sequentially.
    pub parallel_batch_threshold: usize,

    /// Capacity of the feed's inbound and outbound channels.
    pub feed_buffer: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_message_chars: 4096,
            decryption_failed_placeholder: "Unable to decrypt message".to_string(),
            last_message_preview: "Encrypted message".to_string(),
            parallel_batch_threshold: 8,
            feed_buffer: 64,
        }
    }
}

impl RelayConfig {
    /// Parses a TOML document; missing keys fall back to defaults.
    pub fn from_toml_str(text: &str) -> RelayResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| RelayError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RelayResult<()> {
        if self.max_message_chars == 0 {
            return Err(RelayError::Config("max_message_chars must be positive".into()));
        }
        if self.feed_buffer == 0 {
            return Err(RelayError::Config("feed_buffer must be positive".into()));
        }
        if self.decryption_failed_placeholder.trim().is_empty() {
            return Err(RelayError::Config(
                "decryption_failed_placeholder must not be empty".into(),
            ));
        }
        if self.last_message_preview.trim().is_empty() {
            return Err(RelayError::Config("last_message_preview must not be empty".into()));
        }
        Ok(())
    }
}

//! Per-message decrypt/verify pipeline.
//!
//! Every record runs through the same state machine on its own:
//!
//! ```text
//! Received → KeySelected → KeyUnwrapped → ContentDecrypted → SignatureChecked → {Verified | Tampered}
//!                 │              │                │
//!                 └─ KeyUnwrapFailed              └─ (sender rereading own message) SelfAuthored
//!                                └─ DecryptFailed
//! ```
//!
//! Key selection follows the viewer's role: the declared recipient opens the
//! recipient blob and verifies the signature; anyone else is treated as the
//! author rereading sent history, opens the sender blob and skips
//! verification. A failure on one record never affects the others, and
//! output order always matches input order.

use crate::codec;
use crate::config::RelayConfig;
use crate::directory::Directory;
use crate::types::{SignedMessage, TransportRecord};
use chrono::{DateTime, Utc};
use courier_crypto::{CryptoError, PrivateKey, PublicKey};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Which wrapped key the viewer opens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewerRole {
    Recipient,
    Sender,
}

impl ViewerRole {
    pub fn for_viewer(viewer_id: &str, recipient_id: &str) -> Self {
        if viewer_id == recipient_id {
            Self::Recipient
        } else {
            Self::Sender
        }
    }
}

/// States of the per-message state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Received,
    KeySelected,
    KeyUnwrapped,
    ContentDecrypted,
    SignatureChecked,
    Verified,
    Tampered,
    SelfAuthored,
    KeyUnwrapFailed,
    DecryptFailed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Verified
                | Self::Tampered
                | Self::SelfAuthored
                | Self::KeyUnwrapFailed
                | Self::DecryptFailed
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::KeyUnwrapFailed | Self::DecryptFailed)
    }
}

/// Terminal result of running one message through the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Decrypted and the signature matches the sender's published key.
    Verified { body: String },
    /// Decrypted but the signature does not verify. Shown, flagged.
    Tampered { body: String },
    /// The viewer's own message; signature check skipped.
    SelfAuthored { body: String },
    KeyUnwrapFailed { reason: String },
    DecryptFailed { reason: String },
}

impl MessageOutcome {
    pub fn state(&self) -> PipelineState {
        match self {
            Self::Verified { .. } => PipelineState::Verified,
            Self::Tampered { .. } => PipelineState::Tampered,
            Self::SelfAuthored { .. } => PipelineState::SelfAuthored,
            Self::KeyUnwrapFailed { .. } => PipelineState::KeyUnwrapFailed,
            Self::DecryptFailed { .. } => PipelineState::DecryptFailed,
        }
    }

    /// Decrypted text, if the message got that far.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Verified { body } | Self::Tampered { body } | Self::SelfAuthored { body } => {
                Some(body)
            }
            Self::KeyUnwrapFailed { .. } | Self::DecryptFailed { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.state().is_failure()
    }
}

/// A message ready for presentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecryptedMessage {
    pub message_id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub sent_at: DateTime<Utc>,
    pub role: ViewerRole,
    pub outcome: MessageOutcome,
}

impl DecryptedMessage {
    /// Text to render: the body, or the configured placeholder on failure.
    pub fn display_text<'a>(&'a self, config: &'a RelayConfig) -> &'a str {
        self.outcome
            .body()
            .unwrap_or(config.decryption_failed_placeholder.as_str())
    }

    pub fn is_tampered(&self) -> bool {
        matches!(self.outcome, MessageOutcome::Tampered { .. })
    }
}

/// Runs one decoded message through the state machine.
///
/// `sender_key` is the sender's published key; it is only consulted when the
/// viewer is the recipient, and its absence counts as a failed verification.
pub fn decrypt_message(
    message: &SignedMessage,
    viewer_id: &str,
    private_key: &PrivateKey,
    sender_key: Option<&PublicKey>,
) -> MessageOutcome {
    let id = message.message_id.as_str();
    debug!(message_id = id, state = ?PipelineState::Received);

    let role = ViewerRole::for_viewer(viewer_id, &message.recipient_id);
    if role == ViewerRole::Sender && viewer_id != message.sender_id {
        warn!(message_id = id, "viewer is neither sender nor recipient");
    }
    let reader_id = match role {
        ViewerRole::Recipient => message.recipient_id.as_str(),
        ViewerRole::Sender => message.sender_id.as_str(),
    };
    debug!(message_id = id, state = ?PipelineState::KeySelected, ?role);

    let plaintext = match courier_crypto::unwrap(&message.envelope, reader_id, private_key) {
        Ok(plaintext) => plaintext,
        Err(CryptoError::Decryption(reason)) => {
            warn!(message_id = id, "content did not authenticate");
            return MessageOutcome::DecryptFailed { reason };
        }
        Err(e) => {
            warn!(message_id = id, "wrapped key did not open");
            return MessageOutcome::KeyUnwrapFailed {
                reason: e.to_string(),
            };
        }
    };
    debug!(message_id = id, state = ?PipelineState::ContentDecrypted);

    let body = match std::str::from_utf8(&plaintext) {
        Ok(text) => text.to_string(),
        Err(e) => {
            warn!(message_id = id, "plaintext is not valid UTF-8");
            return MessageOutcome::DecryptFailed {
                reason: format!("plaintext is not UTF-8: {e}"),
            };
        }
    };

    match role {
        ViewerRole::Sender => MessageOutcome::SelfAuthored { body },
        ViewerRole::Recipient => {
            let verified = sender_key
                .is_some_and(|key| courier_crypto::verify(&plaintext, &message.signature, key));
            debug!(message_id = id, state = ?PipelineState::SignatureChecked, verified);
            if verified {
                MessageOutcome::Verified { body }
            } else {
                warn!(message_id = id, sender = %message.sender_id, "signature verification failed");
                MessageOutcome::Tampered { body }
            }
        }
    }
}

/// Decrypts delivered batches on behalf of one viewing principal.
pub struct DecryptionPipeline<'a> {
    viewer_id: &'a str,
    directory: &'a dyn Directory,
    config: &'a RelayConfig,
}

impl<'a> DecryptionPipeline<'a> {
    pub fn new(viewer_id: &'a str, directory: &'a dyn Directory, config: &'a RelayConfig) -> Self {
        Self {
            viewer_id,
            directory,
            config,
        }
    }

    pub fn viewer_id(&self) -> &str {
        self.viewer_id
    }

    /// Decrypts a single record.
    pub fn process(&self, record: &TransportRecord, private_key: &PrivateKey) -> DecryptedMessage {
        let sender_keys = self.resolve_sender_keys(std::slice::from_ref(record));
        self.process_one(record, private_key, &sender_keys)
    }

    /// Decrypts a full batch, preserving input order.
    ///
    /// Every record yields an outcome. A sender with no published key only
    /// affects that sender's records, which cannot verify and end up
    /// [`MessageOutcome::Tampered`].
    pub fn process_batch(
        &self,
        records: &[TransportRecord],
        private_key: &PrivateKey,
    ) -> Vec<DecryptedMessage> {
        let sender_keys = self.resolve_sender_keys(records);

        let messages: Vec<DecryptedMessage> = if records.len() < self.config.parallel_batch_threshold
        {
            records
                .iter()
                .map(|record| self.process_one(record, private_key, &sender_keys))
                .collect()
        } else {
            records
                .par_iter()
                .map(|record| self.process_one(record, private_key, &sender_keys))
                .collect()
        };

        let failed = messages.iter().filter(|m| m.outcome.is_failure()).count();
        let tampered = messages.iter().filter(|m| m.is_tampered()).count();
        debug!(
            viewer = self.viewer_id,
            total = messages.len(),
            failed,
            tampered,
            "processed batch"
        );
        messages
    }

    /// Looks up each distinct sender once. Senders whose key cannot be
    /// resolved map to `None`.
    fn resolve_sender_keys(
        &self,
        records: &[TransportRecord],
    ) -> HashMap<String, Option<PublicKey>> {
        let mut keys = HashMap::new();
        for record in records {
            if record.recipient_id != self.viewer_id || keys.contains_key(&record.sender_id) {
                continue;
            }
            let key = match self.directory.get_public_key(&record.sender_id) {
                Ok(key) => Some(key),
                Err(e) => {
                    warn!(sender = %record.sender_id, "sender key unavailable: {e}");
                    None
                }
            };
            keys.insert(record.sender_id.clone(), key);
        }
        keys
    }

    fn process_one(
        &self,
        record: &TransportRecord,
        private_key: &PrivateKey,
        sender_keys: &HashMap<String, Option<PublicKey>>,
    ) -> DecryptedMessage {
        let role = ViewerRole::for_viewer(self.viewer_id, &record.recipient_id);
        let outcome = match codec::decode(record) {
            Ok(message) => decrypt_message(
                &message,
                self.viewer_id,
                private_key,
                sender_keys.get(&message.sender_id).and_then(Option::as_ref),
            ),
            Err(e) => {
                warn!(message_id = %record.message_id, "undecodable record: {e}");
                MessageOutcome::DecryptFailed {
                    reason: e.to_string(),
                }
            }
        };

        DecryptedMessage {
            message_id: record.message_id.clone(),
            sender_id: record.sender_id.clone(),
            recipient_id: record.recipient_id.clone(),
            sent_at: record.sent_at,
            role,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_follows_declared_recipient() {
        assert_eq!(ViewerRole::for_viewer("bob", "bob"), ViewerRole::Recipient);
        assert_eq!(ViewerRole::for_viewer("alice", "bob"), ViewerRole::Sender);
    }

    #[test]
    fn only_unwrap_and_decrypt_failures_are_failures() {
        for state in [
            PipelineState::Verified,
            PipelineState::Tampered,
            PipelineState::SelfAuthored,
        ] {
            assert!(state.is_terminal());
            assert!(!state.is_failure());
        }
        assert!(PipelineState::KeyUnwrapFailed.is_failure());
        assert!(PipelineState::DecryptFailed.is_failure());
        assert!(!PipelineState::KeySelected.is_terminal());
    }
}

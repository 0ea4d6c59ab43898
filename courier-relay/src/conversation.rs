//! Two-party conversation bookkeeping.

use crate::config::RelayConfig;
use crate::error::{RelayError, RelayResult};
use crate::types::{LastMessage, TransportRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// A conversation between exactly two identities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Hex SHA-256 of the sorted participant pair.
    pub id: String,
    /// Participants in sorted order.
    pub participants: [String; 2],
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_message: Option<LastMessage>,
}

impl Conversation {
    pub fn between(a: &str, b: &str) -> Self {
        let now = Utc::now();
        let participants = sorted_pair(a, b);
        Self {
            id: conversation_id(a, b),
            participants,
            created_at: now,
            updated_at: now,
            last_message: None,
        }
    }

    pub fn includes(&self, identity: &str) -> bool {
        self.participants.iter().any(|p| p == identity)
    }

    /// The participant that is not `viewer`, or `None` if `viewer` is not
    /// part of this conversation.
    pub fn counterpart(&self, viewer: &str) -> Option<&str> {
        match &self.participants {
            [a, b] if a == viewer => Some(b),
            [a, b] if b == viewer => Some(a),
            _ => None,
        }
    }

    /// Updates the summary after a send. The preview is the configured
    /// placeholder; the message body is never stored here.
    ///
    /// Fails with [`RelayError::InvalidMessage`] if the record is not
    /// between this conversation's participants.
    pub fn record_outgoing(
        &mut self,
        record: &TransportRecord,
        config: &RelayConfig,
    ) -> RelayResult<()> {
        let between_participants = self.includes(&record.sender_id)
            && self.counterpart(&record.sender_id) == Some(record.recipient_id.as_str());
        if !between_participants {
            return Err(RelayError::InvalidMessage(format!(
                "message {} does not belong to conversation {}",
                record.message_id, self.id
            )));
        }
        self.last_message = Some(LastMessage {
            message_id: record.message_id.clone(),
            sender_id: record.sender_id.clone(),
            preview: config.last_message_preview.clone(),
            sent_at: record.sent_at,
        });
        if record.sent_at > self.updated_at {
            self.updated_at = record.sent_at;
        }
        Ok(())
    }
}

/// The local principal's conversations, keyed by id.
#[derive(Debug, Default)]
pub struct ConversationIndex {
    conversations: HashMap<String, Conversation>,
}

impl ConversationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the conversation between `a` and `b`, creating it on first use.
    pub fn find_or_create(&mut self, a: &str, b: &str) -> &mut Conversation {
        self.conversations
            .entry(conversation_id(a, b))
            .or_insert_with(|| Conversation::between(a, b))
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.get(id)
    }

    /// Conversations `identity` takes part in, most recently updated first.
    pub fn list_for(&self, identity: &str) -> Vec<&Conversation> {
        let mut list: Vec<_> = self
            .conversations
            .values()
            .filter(|c| c.includes(identity))
            .collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        list
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

/// Deterministic id for the conversation between `a` and `b`, independent
/// of argument order.
pub fn conversation_id(a: &str, b: &str) -> String {
    let [first, second] = sorted_pair(a, b);
    let mut hasher = Sha256::new();
    hasher.update(first.as_bytes());
    hasher.update([0u8]);
    hasher.update(second.as_bytes());
    hex::encode(hasher.finalize())
}

fn sorted_pair(a: &str, b: &str) -> [String; 2] {
    if a <= b {
        [a.to_string(), b.to_string()]
    } else {
        [b.to_string(), a.to_string()]
    }
}

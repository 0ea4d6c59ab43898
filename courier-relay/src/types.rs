//! Shared types for messages crossing the relay.

use chrono::{DateTime, Utc};
use courier_crypto::Envelope;
use serde::{Deserialize, Serialize};

/// Flat record stored by the relay and delivered by the channel.
///
/// Every binary field is standard base64. The relay can read the ids and the
/// timestamp; everything else is opaque to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportRecord {
    /// Envelope format tag, e.g. `"courier-v1"`.
    pub scheme: String,
    pub message_id: String,
    pub ciphertext: String,
    pub nonce: String,
    pub sender_wrapped_key: String,
    pub recipient_wrapped_key: String,
    pub signature: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub sent_at: DateTime<Utc>,
}

impl TransportRecord {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// A decoded record: the envelope plus its plaintext signature and routing
/// metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedMessage {
    pub message_id: String,
    pub envelope: Envelope,
    pub signature: Vec<u8>,
    pub sender_id: String,
    pub recipient_id: String,
    pub sent_at: DateTime<Utc>,
}

/// Summary kept on a conversation for list views.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMessage {
    pub message_id: String,
    pub sender_id: String,
    /// Fixed preview text; the relay never holds plaintext.
    pub preview: String,
    pub sent_at: DateTime<Utc>,
}

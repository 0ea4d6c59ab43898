//! Send path: validate, wrap for both parties, sign, encode.

use crate::codec;
use crate::config::RelayConfig;
use crate::directory::Directory;
use crate::error::{RelayError, RelayResult};
use crate::key_store::{LocalKeyStore, require_private_key};
use crate::types::{SignedMessage, TransportRecord};
use chrono::Utc;
use courier_crypto::{Reader, sign, wrap_for_recipients};
use tracing::debug;
use uuid::Uuid;

/// A message the local principal wants to send.
#[derive(Clone, Copy, Debug)]
pub struct ComposeRequest<'a> {
    pub sender_id: &'a str,
    pub recipient_id: &'a str,
    pub text: &'a str,
}

impl<'a> ComposeRequest<'a> {
    pub fn new(sender_id: &'a str, recipient_id: &'a str, text: &'a str) -> Self {
        Self {
            sender_id,
            recipient_id,
            text,
        }
    }
}

/// Checks the text is non-blank and within the configured length.
pub fn validate_text(text: &str, config: &RelayConfig) -> RelayResult<()> {
    if text.trim().is_empty() {
        return Err(RelayError::InvalidMessage("message is empty".into()));
    }
    let chars = text.chars().count();
    if chars > config.max_message_chars {
        return Err(RelayError::InvalidMessage(format!(
            "message is {chars} characters, limit is {}",
            config.max_message_chars
        )));
    }
    Ok(())
}

/// Builds the transport record for `request`.
///
/// Every failure aborts only this send and carries its own error variant:
/// invalid text, a missing directory key for either party, or no local
/// private key.
pub fn compose_message(
    request: &ComposeRequest<'_>,
    directory: &dyn Directory,
    key_store: &dyn LocalKeyStore,
    config: &RelayConfig,
) -> RelayResult<TransportRecord> {
    validate_text(request.text, config)?;

    let recipient_key = directory.get_public_key(request.recipient_id)?;
    let sender_key = directory.get_public_key(request.sender_id)?;
    let private_key = require_private_key(key_store)?;

    let plaintext = request.text.as_bytes();
    let envelope = wrap_for_recipients(
        plaintext,
        &[
            Reader::new(request.sender_id, &sender_key),
            Reader::new(request.recipient_id, &recipient_key),
        ],
    )?;
    let signature = sign(plaintext, &private_key);
    drop(private_key);

    let message = SignedMessage {
        message_id: Uuid::now_v7().to_string(),
        envelope,
        signature,
        sender_id: request.sender_id.to_string(),
        recipient_id: request.recipient_id.to_string(),
        sent_at: Utc::now(),
    };
    let record = codec::encode(&message)?;

    debug!(
        message_id = %record.message_id,
        sender = request.sender_id,
        recipient = request.recipient_id,
        "composed message"
    );
    Ok(record)
}

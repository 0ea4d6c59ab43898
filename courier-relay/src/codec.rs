//! Transport record codec.
//!
//! Maps a [`SignedMessage`] to the flat [`TransportRecord`] the relay stores
//! and back. No I/O; the only failure modes are malformed fields and scheme
//! tags this build does not know. Decoding never guesses at a format.

use crate::error::CodecError;
use crate::types::{SignedMessage, TransportRecord};
use courier_crypto::encoding::{from_base64, from_base64_array, to_base64};
use courier_crypto::{Envelope, EnvelopeScheme, NONCE_SIZE, ReaderKey, WrappedKey};

/// Encodes a signed message into its transport record.
///
/// Fails if the envelope has no wrapped key for the sender or the recipient.
pub fn encode(message: &SignedMessage) -> Result<TransportRecord, CodecError> {
    let envelope = &message.envelope;
    let sender_wrapped = envelope
        .wrapped_key_for(&message.sender_id)
        .ok_or_else(|| CodecError::MissingWrappedKey(message.sender_id.clone()))?;
    let recipient_wrapped = envelope
        .wrapped_key_for(&message.recipient_id)
        .ok_or_else(|| CodecError::MissingWrappedKey(message.recipient_id.clone()))?;

    Ok(TransportRecord {
        scheme: envelope.scheme.to_string(),
        message_id: message.message_id.clone(),
        ciphertext: to_base64(&envelope.ciphertext),
        nonce: to_base64(&envelope.nonce),
        sender_wrapped_key: sender_wrapped.to_base64(),
        recipient_wrapped_key: recipient_wrapped.to_base64(),
        signature: to_base64(&message.signature),
        sender_id: message.sender_id.clone(),
        recipient_id: message.recipient_id.clone(),
        sent_at: message.sent_at,
    })
}

/// Decodes a transport record.
///
/// The envelope's wrapped keys come back in `[sender, recipient]` order.
pub fn decode(record: &TransportRecord) -> Result<SignedMessage, CodecError> {
    let scheme: EnvelopeScheme = record
        .scheme
        .parse()
        .map_err(|_| CodecError::UnsupportedScheme(record.scheme.clone()))?;

    let ciphertext = from_base64(&record.ciphertext).map_err(malformed("ciphertext"))?;
    let nonce = from_base64_array::<NONCE_SIZE>(&record.nonce).map_err(malformed("nonce"))?;
    let sender_wrapped = WrappedKey::from_base64(&record.sender_wrapped_key)
        .map_err(malformed("senderWrappedKey"))?;
    let recipient_wrapped = WrappedKey::from_base64(&record.recipient_wrapped_key)
        .map_err(malformed("recipientWrappedKey"))?;
    let signature = from_base64(&record.signature).map_err(malformed("signature"))?;

    Ok(SignedMessage {
        message_id: record.message_id.clone(),
        envelope: Envelope {
            scheme,
            ciphertext,
            nonce,
            wrapped_keys: vec![
                ReaderKey {
                    reader_id: record.sender_id.clone(),
                    wrapped: sender_wrapped,
                },
                ReaderKey {
                    reader_id: record.recipient_id.clone(),
                    wrapped: recipient_wrapped,
                },
            ],
        },
        signature,
        sender_id: record.sender_id.clone(),
        recipient_id: record.recipient_id.clone(),
        sent_at: record.sent_at,
    })
}

fn malformed(field: &'static str) -> impl Fn(courier_crypto::CryptoError) -> CodecError {
    move |e| CodecError::MalformedField {
        field,
        reason: e.to_string(),
    }
}

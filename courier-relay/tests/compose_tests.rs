mod support;

use courier_relay::{
    ComposeRequest, Conversation, InMemoryKeyStore, LocalKeyStore, RelayConfig, RelayError, codec,
    compose_message,
};
use pretty_assertions::assert_eq;
use support::World;
use uuid::Uuid;

#[test]
fn composed_record_carries_both_wrapped_keys() {
    let world = World::new();
    let alice = world.register("alice");
    let bob = world.register("bob");
    let record = world.send(&alice, &bob, "hello");

    assert_eq!(record.scheme, "courier-v1");
    assert_eq!(record.sender_id, "alice");
    assert_eq!(record.recipient_id, "bob");
    let message = codec::decode(&record).unwrap();
    assert_eq!(message.envelope.wrapped_keys.len(), 2);
    assert_eq!(Uuid::parse_str(&record.message_id).unwrap().get_version_num(), 7);
}

#[test]
fn identical_text_produces_fresh_envelopes() {
    let world = World::new();
    let alice = world.register("alice");
    let bob = world.register("bob");
    let first = world.send(&alice, &bob, "same");
    let second = world.send(&alice, &bob, "same");

    assert_ne!(first.message_id, second.message_id);
    assert_ne!(first.nonce, second.nonce);
    assert_ne!(first.ciphertext, second.ciphertext);
    assert_ne!(first.sender_wrapped_key, second.sender_wrapped_key);
    assert_ne!(first.recipient_wrapped_key, second.recipient_wrapped_key);
}

#[test]
fn record_holds_no_plaintext() {
    let world = World::new();
    let alice = world.register("alice");
    let bob = world.register("bob");
    let record = world.send(&alice, &bob, "a very recognisable sentence");
    assert!(!record.to_json().unwrap().contains("recognisable"));
}

#[test]
fn unknown_recipient_fails_with_directory_lookup() {
    let world = World::new();
    let alice = world.register("alice");
    let result = compose_message(
        &ComposeRequest::new("alice", "nobody", "hi"),
        world.directory.as_ref(),
        alice.key_store.as_ref(),
        &world.config,
    );
    assert!(matches!(result, Err(RelayError::DirectoryLookup(id)) if id == "nobody"));
}

#[test]
fn missing_local_key_fails_without_regenerating() {
    let world = World::new();
    world.register("alice");
    world.register("bob");
    let published = world.directory.len();
    let empty = InMemoryKeyStore::new();

    let result = compose_message(
        &ComposeRequest::new("alice", "bob", "hi"),
        world.directory.as_ref(),
        &empty,
        &world.config,
    );
    assert!(matches!(result, Err(RelayError::MissingPrivateKey)));
    assert!(empty.get().unwrap().is_none());
    assert_eq!(world.directory.len(), published);
}

#[test]
fn blank_and_oversized_text_are_invalid() {
    let world = World::new();
    let alice = world.register("alice");
    world.register("bob");
    let config = RelayConfig {
        max_message_chars: 10,
        ..RelayConfig::default()
    };

    for text in ["", "   ", "this is longer than ten"] {
        let result = compose_message(
            &ComposeRequest::new("alice", "bob", text),
            world.directory.as_ref(),
            alice.key_store.as_ref(),
            &config,
        );
        assert!(
            matches!(result, Err(RelayError::InvalidMessage(_))),
            "{text:?} should be rejected"
        );
    }
}

#[test]
fn conversation_preview_never_holds_plaintext() {
    let world = World::new();
    let alice = world.register("alice");
    let bob = world.register("bob");
    let record = world.send(&alice, &bob, "secret plans");

    let mut conversation = Conversation::between("alice", "bob");
    conversation.record_outgoing(&record, &world.config).unwrap();

    let last = conversation.last_message.as_ref().unwrap();
    assert_eq!(last.preview, "Encrypted message");
    assert_eq!(last.message_id, record.message_id);
    assert_eq!(last.sender_id, "alice");
    assert!(conversation.updated_at >= conversation.created_at);
    assert!(!serde_json::to_string(&conversation).unwrap().contains("secret"));
}

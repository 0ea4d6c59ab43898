mod support;

use courier_relay::conversation::conversation_id;
use courier_relay::{Conversation, ConversationIndex, RelayError};
use pretty_assertions::assert_eq;
use support::World;

#[test]
fn outgoing_record_from_another_pair_is_rejected() {
    let world = World::new();
    let alice = world.register("alice");
    let bob = world.register("bob");
    let carol = world.register("carol");
    let record = world.send(&alice, &carol, "wrong thread");

    let mut conversation = Conversation::between("alice", "bob");
    let result = conversation.record_outgoing(&record, &world.config);
    assert!(matches!(result, Err(RelayError::InvalidMessage(_))));
    assert!(conversation.last_message.is_none());

    let reply = world.send(&bob, &alice, "right thread");
    conversation.record_outgoing(&reply, &world.config).unwrap();
    assert_eq!(
        conversation.last_message.as_ref().map(|m| m.sender_id.as_str()),
        Some("bob")
    );
}

#[test]
fn includes_only_participants() {
    let conversation = Conversation::between("alice", "bob");
    assert!(conversation.includes("alice"));
    assert!(conversation.includes("bob"));
    assert!(!conversation.includes("carol"));
}

#[test]
fn find_or_create_reuses_the_pair() {
    let mut index = ConversationIndex::new();
    assert!(index.is_empty());

    let id = index.find_or_create("alice", "bob").id.clone();
    let again = index.find_or_create("bob", "alice").id.clone();
    assert_eq!(id, again);
    assert_eq!(id, conversation_id("alice", "bob"));
    assert_eq!(index.len(), 1);
    assert!(index.get(&id).is_some());
}

#[test]
fn listing_is_most_recent_first() {
    let world = World::new();
    let alice = world.register("alice");
    let bob = world.register("bob");
    let carol = world.register("carol");
    let mut index = ConversationIndex::new();

    index.find_or_create("alice", "bob");
    index.find_or_create("alice", "carol");
    index.find_or_create("bob", "carol");

    let to_bob = world.send(&alice, &bob, "first");
    index
        .find_or_create("alice", "bob")
        .record_outgoing(&to_bob, &world.config)
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let to_carol = world.send(&alice, &carol, "second");
    index
        .find_or_create("alice", "carol")
        .record_outgoing(&to_carol, &world.config)
        .unwrap();

    let listed: Vec<_> = index
        .list_for("alice")
        .into_iter()
        .map(|c| c.counterpart("alice").unwrap_or_default().to_string())
        .collect();
    assert_eq!(listed, vec!["carol".to_string(), "bob".to_string()]);
}

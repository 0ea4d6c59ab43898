mod support;

use courier_relay::{CodecError, TransportRecord, codec};
use pretty_assertions::assert_eq;
use support::World;

#[test]
fn decode_then_encode_restores_the_record() {
    let world = World::new();
    let alice = world.register("alice");
    let bob = world.register("bob");
    let record = world.send(&alice, &bob, "hello");

    let message = codec::decode(&record).unwrap();
    assert_eq!(message.sender_id, "alice");
    assert_eq!(message.recipient_id, "bob");
    assert_eq!(message.envelope.reader_ids().collect::<Vec<_>>(), vec!["alice", "bob"]);
    assert_eq!(codec::encode(&message).unwrap(), record);
}

#[test]
fn json_uses_camel_case_field_names() {
    let world = World::new();
    let alice = world.register("alice");
    let bob = world.register("bob");
    let record = world.send(&alice, &bob, "hello");

    let value: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
    for field in [
        "scheme",
        "messageId",
        "ciphertext",
        "nonce",
        "senderWrappedKey",
        "recipientWrappedKey",
        "signature",
        "senderId",
        "recipientId",
        "sentAt",
    ] {
        assert!(value.get(field).is_some(), "missing field {field}");
    }
    assert_eq!(value["scheme"], "courier-v1");
    assert_eq!(TransportRecord::from_json(&record.to_json().unwrap()).unwrap(), record);
}

#[test]
fn unknown_scheme_is_rejected() {
    let world = World::new();
    let alice = world.register("alice");
    let bob = world.register("bob");
    let mut record = world.send(&alice, &bob, "hello");
    record.scheme = "legacy-rsa".into();

    assert!(matches!(
        codec::decode(&record),
        Err(CodecError::UnsupportedScheme(s)) if s == "legacy-rsa"
    ));
}

#[test]
fn malformed_fields_are_named() {
    let world = World::new();
    let alice = world.register("alice");
    let bob = world.register("bob");
    let record = world.send(&alice, &bob, "hello");

    let cases: [(&str, fn(&mut TransportRecord)); 4] = [
        ("ciphertext", |r| r.ciphertext = "%%%".into()),
        ("senderWrappedKey", |r| r.sender_wrapped_key = "AAAA".into()),
        ("recipientWrappedKey", |r| r.recipient_wrapped_key = "not base64!".into()),
        ("signature", |r| r.signature = "@@".into()),
    ];
    for (expected, corrupt) in cases {
        let mut broken = record.clone();
        corrupt(&mut broken);
        match codec::decode(&broken) {
            Err(CodecError::MalformedField { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected malformed {expected}, got {other:?}"),
        }
    }
}

#[test]
fn surrounding_whitespace_in_fields_is_tolerated() {
    let world = World::new();
    let alice = world.register("alice");
    let bob = world.register("bob");
    let mut record = world.send(&alice, &bob, "hello");
    record.signature = format!(" {}\n", record.signature);

    assert!(codec::decode(&record).is_ok());
}

//! End-to-end behavior of the user aggregate: the change/replay scenarios,
//! fold idempotence, order sensitivity, and strict vs. lenient raw replay.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use serde_json::json;
use sourced_aggregate::{
    EventError, User, UserRepository, ValidationError, ValidationRules, fold,
};
use sourced_types::{
    EventType, RawEvent, UnknownEventPolicy, UserEvent, UserField, UserId, UserProfile,
};

fn alice() -> User {
    User::create(
        UserId::from_u128(1),
        UserProfile::new("Alice", "alice@example.com"),
    )
}

// =============================================================================
// Change scenarios
// =============================================================================

#[test]
fn scenario_valid_email_change() {
    let mut user = alice();
    user.change(UserField::Email, "alice.smith@example.com")
        .expect("valid email should be accepted");

    let records = user.log().records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].event.event_type(), EventType::EmailChanged);
    assert_eq!(records[0].event.event_type().to_string(), "EmailChanged");
    assert_eq!(records[0].event.payload(), "alice.smith@example.com");
    assert_eq!(user.state().email, "alice.smith@example.com");
    assert_eq!(user.state().name, "Alice");
}

#[test]
fn scenario_empty_email_rejected() {
    let mut user = alice();
    let err = user
        .change(UserField::Email, "")
        .expect_err("empty email must be rejected");

    assert!(matches!(err, ValidationError::Empty { field: UserField::Email }));
    assert_eq!(user.log().len(), 0);
    assert_eq!(user.state().email, "alice@example.com");
}

#[test]
fn scenario_replay_matches_direct_mutation() {
    let mut original = alice();
    original
        .change(UserField::Email, "alice.smith@example.com")
        .unwrap();
    let captured: Vec<UserEvent> = original.log().events().cloned().collect();

    let mut fresh = alice();
    let applied = fresh.replay(captured);

    assert_eq!(applied, 1);
    assert_eq!(fresh.state(), original.state());
    assert_eq!(fresh.version(), original.version());
    assert!(fresh.verify());
}

// =============================================================================
// Fold properties
// =============================================================================

#[test]
fn replaying_twice_from_same_origin_is_identical() {
    let initial = UserProfile::new("Alice", "alice@example.com");
    let log = vec![
        UserEvent::NameChanged("Alicia".to_owned()),
        UserEvent::EmailChanged("a1@example.com".to_owned()),
        UserEvent::EmailChanged("a2@example.com".to_owned()),
        UserEvent::NameChanged("Ali".to_owned()),
    ];

    let once = fold(initial.clone(), &log);
    let twice = fold(initial.clone(), &log);
    assert_eq!(once, twice);

    let a = User::rebuild(UserId::from_u128(1), initial.clone(), log.clone());
    let b = User::rebuild(UserId::from_u128(1), initial, log);
    assert_eq!(a.state(), &once);
    assert_eq!(b.state(), &once);
}

#[test]
fn non_commuting_events_depend_on_order() {
    let initial = UserProfile::new("Alice", "alice@example.com");
    let first = UserEvent::EmailChanged("first@example.com".to_owned());
    let second = UserEvent::EmailChanged("second@example.com".to_owned());

    let forward = fold(initial.clone(), [&first, &second]);
    let reversed = fold(initial, [&second, &first]);

    assert_ne!(forward, reversed);
    assert_eq!(forward.email, "second@example.com");
    assert_eq!(reversed.email, "first@example.com");
}

#[test]
fn every_accepted_change_appends_exactly_one_event() {
    let mut user = alice();
    let rules = ValidationRules::default();
    let inputs = [
        (UserField::Name, "Alicia", true),
        (UserField::Email, "nope", false),
        (UserField::Email, "alicia@example.org", true),
        (UserField::Name, "", false),
        (UserField::Name, "A", false),
    ];

    for (field, value, accepted) in inputs {
        let before = user.state().clone();
        let version = user.version();
        let result = user.change_with(field, value, &rules);

        assert_eq!(result.is_ok(), accepted, "{field} = {value:?}");
        if accepted {
            assert_eq!(user.version(), version + 1);
            assert_eq!(user.state().field(field), value);
            let other = match field {
                UserField::Name => UserField::Email,
                UserField::Email => UserField::Name,
            };
            assert_eq!(user.state().field(other), before.field(other));
        } else {
            assert_eq!(user.version(), version);
            assert_eq!(user.state(), &before);
        }
    }
    assert!(user.verify());
}

// =============================================================================
// Raw history
// =============================================================================

#[test]
fn exported_history_is_json_serializable() {
    let mut user = alice();
    user.change_email("alice.smith@example.com").unwrap();
    let json = serde_json::to_value(user.export()).unwrap();
    assert_eq!(
        json,
        json!([{ "type": "EmailChanged", "payload": "alice.smith@example.com" }])
    );
}

#[test]
fn strict_replay_is_all_or_nothing() {
    let mut user = alice();
    let raw = vec![
        RawEvent::new("EmailChanged", json!("x@example.com")),
        RawEvent::new("Teleported", json!({"to": "mars"})),
        RawEvent::new("NameChanged", json!("Xena")),
    ];

    let err = user
        .replay_raw(&raw, UnknownEventPolicy::Reject)
        .expect_err("unknown type must fail under Reject");
    assert!(matches!(err, EventError::UnknownEventType { ref event_type } if event_type == "Teleported"));
    assert_eq!(user.version(), 0);
    assert_eq!(user.state(), user.initial());
}

#[test]
fn lenient_replay_applies_known_events() {
    let mut user = alice();
    let raw = vec![
        RawEvent::new("EmailChanged", json!("x@example.com")),
        RawEvent::new("Teleported", json!({"to": "mars"})),
        RawEvent::new("NameChanged", json!("Xena")),
    ];

    let skipped = user.replay_raw(&raw, UnknownEventPolicy::Skip).unwrap();
    assert_eq!(skipped, 1);
    assert_eq!(user.version(), 2);
    assert_eq!(user.state().email, "x@example.com");
    assert_eq!(user.state().name, "Xena");
}

#[tokio::test]
async fn repository_passes_history_between_owners() {
    let mut primary = UserRepository::new();
    let handle = primary.insert(alice()).unwrap();
    handle
        .change(
            UserField::Email,
            "alice.smith@example.com",
            &ValidationRules::default(),
        )
        .await
        .unwrap();

    let history = primary.history(UserId::from_u128(1)).await.unwrap();

    let mut replica = UserRepository::new();
    let restored = replica
        .restore(
            UserId::from_u128(1),
            UserProfile::new("Alice", "alice@example.com"),
            &history,
            UnknownEventPolicy::Reject,
        )
        .unwrap();

    assert_eq!(restored.snapshot().await, handle.snapshot().await);
}

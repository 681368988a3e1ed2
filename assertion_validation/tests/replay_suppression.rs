// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use assertion_validation::message::MessageContext;
use assertion_validation::policy::{MessageReplayRule, PolicyVerdict, SecurityPolicyRule};
use assertion_validation::replay::{InMemoryReplayStorage, ReplayCache};
use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

#[test]
fn second_sighting_inside_the_window_is_a_replay() {
    let cache = ReplayCache::new(
        Arc::new(InMemoryReplayStorage::new()),
        Duration::seconds(900),
    );

    assert!(cache.check_replay("abc123", now()));
    assert!(!cache.check_replay("abc123", now()));
}

#[test]
fn sighting_is_forgotten_after_the_ttl_elapses() {
    let cache = ReplayCache::new(
        Arc::new(InMemoryReplayStorage::new()),
        Duration::seconds(900),
    );

    assert!(cache.check_replay("abc123", now()));
    assert!(!cache.check_replay("abc123", now() + Duration::seconds(899)));

    // Simulated clock advance past the TTL; no sleeping.
    assert!(cache.check_replay("abc123", now() + Duration::seconds(901)));
}

#[test]
fn distinct_ids_do_not_affect_each_other() {
    let cache = ReplayCache::new(
        Arc::new(InMemoryReplayStorage::new()),
        Duration::seconds(900),
    );

    assert!(cache.check_replay("abc123", now()));
    assert!(cache.check_replay("def456", now()));
    assert!(!cache.check_replay("abc123", now()));
    assert!(!cache.check_replay("def456", now()));
}

#[test]
fn concurrent_sightings_of_one_id_admit_exactly_one_caller() {
    let cache = Arc::new(ReplayCache::new(
        Arc::new(InMemoryReplayStorage::new()),
        Duration::seconds(900),
    ));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        handles.push(std::thread::spawn(move || cache.check_replay("abc123", now())));
    }

    let admitted = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|admitted| *admitted)
        .count();
    assert_eq!(admitted, 1);
}

#[test]
fn purge_drops_only_expired_entries() {
    let storage = Arc::new(InMemoryReplayStorage::new());
    let cache = ReplayCache::new(storage, Duration::seconds(900));

    assert!(cache.check_replay("old", now()));
    assert!(cache.check_replay("new", now() + Duration::seconds(600)));

    cache.purge_expired(now() + Duration::seconds(1_000));

    // "old" expired at +900 and was purged; "new" lives until +1500.
    assert!(cache.check_replay("old", now() + Duration::seconds(1_000)));
    assert!(!cache.check_replay("new", now() + Duration::seconds(1_000)));
}

#[test]
fn replay_rule_rejects_the_second_presentation() {
    let rule = MessageReplayRule::new(
        Duration::seconds(300),
        Duration::seconds(600),
        Arc::new(InMemoryReplayStorage::new()),
    );

    let message = MessageContext::new()
        .with_message_id("abc123")
        .with_issue_instant(now());

    assert!(rule.evaluate(&message, now()).is_accept());
    let PolicyVerdict::Reject(reason) = rule.evaluate(&message, now()) else {
        panic!("expected rejection");
    };
    assert!(reason.contains("abc123"));
}

#[test]
fn replay_rule_skips_messages_without_an_identifier() {
    let rule = MessageReplayRule::new(
        Duration::seconds(300),
        Duration::seconds(600),
        Arc::new(InMemoryReplayStorage::new()),
    );

    let message = MessageContext::new().with_issue_instant(now());
    assert!(rule.evaluate(&message, now()).is_accept());
    assert!(rule.evaluate(&message, now()).is_accept());
}

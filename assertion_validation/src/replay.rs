// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Replay suppression.
//!
//! The replay cache is the only state in this pipeline whose lifetime
//! exceeds one request. Its check-and-insert must be a single atomic step:
//! two concurrent presentations of the same id must not both be told "not
//! a replay".

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// A sighting record: message id → expiration instant.
///
/// Entries are created on first sighting and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayCacheEntry {
    /// Instant the sighting ages out of tracking.
    pub expires: DateTime<Utc>,
}

/// Backing store for the replay cache.
pub trait ReplayStorage: Send + Sync {
    /// The live entry for `key`, if one exists.
    fn get(&self, key: &str) -> Option<ReplayCacheEntry>;

    /// Atomic check-and-insert: stores `entry` and returns `true` when no
    /// live entry exists for `key`. An incumbent entry that has expired at
    /// `now` counts as absent and is replaced.
    fn put_if_absent(&self, key: &str, entry: ReplayCacheEntry, now: DateTime<Utc>) -> bool;

    /// Drops every entry that has expired at `now`.
    fn purge_expired(&self, now: DateTime<Utc>);
}

/// In-process storage guarded by one mutex.
#[derive(Debug, Default)]
pub struct InMemoryReplayStorage {
    entries: Mutex<HashMap<String, ReplayCacheEntry>>,
}

impl InMemoryReplayStorage {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplayStorage for InMemoryReplayStorage {
    fn get(&self, key: &str) -> Option<ReplayCacheEntry> {
        self.entries.lock().get(key).copied()
    }

    fn put_if_absent(&self, key: &str, entry: ReplayCacheEntry, now: DateTime<Utc>) -> bool {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(incumbent) if incumbent.expires >= now => false,
            _ => {
                entries.insert(key.to_string(), entry);
                true
            }
        }
    }

    fn purge_expired(&self, now: DateTime<Utc>) {
        self.entries.lock().retain(|_, entry| entry.expires >= now);
    }
}

/// Tracks previously seen message identifiers for a fixed window.
///
/// The TTL applied at insertion is fixed at construction; a message ages
/// out of replay tracking roughly when freshness checking would reject it
/// anyway.
pub struct ReplayCache {
    storage: Arc<dyn ReplayStorage>,
    ttl: Duration,
}

impl ReplayCache {
    /// Cache over the given storage with a fixed TTL.
    pub fn new(storage: Arc<dyn ReplayStorage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    /// Records a sighting of `id`.
    ///
    /// Returns `true` when the id was not previously seen inside the TTL
    /// window (the sighting is now recorded), `false` when this is a
    /// replay. Distinct ids never affect each other.
    pub fn check_replay(&self, id: &str, now: DateTime<Utc>) -> bool {
        let entry = ReplayCacheEntry {
            expires: now + self.ttl,
        };
        let first_sighting = self.storage.put_if_absent(id, entry, now);
        if !first_sighting {
            warn!(message_id = id, "replayed message id detected");
        }
        first_sighting
    }

    /// The TTL applied to new sightings.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drops expired sightings from the backing store.
    pub fn purge_expired(&self, now: DateTime<Utc>) {
        self.storage.purge_expired(now);
    }
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Test-only utilities for composing validation scenarios.
//!
//! This crate exists to keep the production `assertion_validation` surface
//! focused while still supporting concise test composition in this repo.

use assertion_validation::assertion::{
    Assertion, AudienceRestriction, Conditions, ConfirmationMethod, SubjectConfirmation,
};
use assertion_validation_trust::clock::Clock;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;

/// A clock that only moves when a test tells it to.
///
/// Replay and expiry tests advance logical time with [`ManualClock::advance`]
/// instead of sleeping.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Clock frozen at an arbitrary fixed instant.
    pub fn fixed() -> Self {
        Self::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Jumps the clock to an absolute instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock() = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// An assertion with conditions bounding it to `[not_before, not_on_or_after)`.
pub fn assertion_with_window(
    issuer: &str,
    not_before: DateTime<Utc>,
    not_on_or_after: DateTime<Utc>,
    audiences: &[&str],
) -> Assertion {
    Assertion {
        id: "test-assertion".to_string(),
        issuer: issuer.to_string(),
        conditions: Some(Conditions {
            not_before: Some(not_before),
            not_on_or_after: Some(not_on_or_after),
            audience_restrictions: if audiences.is_empty() {
                Vec::new()
            } else {
                vec![AudienceRestriction {
                    audiences: audiences.iter().map(|a| (*a).to_string()).collect(),
                }]
            },
        }),
        ..Assertion::default()
    }
}

/// A bearer subject confirmation with no confirmation data.
pub fn bearer_confirmation() -> SubjectConfirmation {
    SubjectConfirmation {
        method: ConfirmationMethod::Bearer,
        data: None,
    }
}

/// Minimal DER `SubjectPublicKeyInfo` wrapper for a raw Ed25519 public key.
pub fn ed25519_spki(raw_public_key: &[u8]) -> Vec<u8> {
    let mut out = vec![
        0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
    ];
    out.extend_from_slice(raw_public_key);
    out
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Injected time source.
//!
//! Validators never read ambient time; they ask a [`Clock`]. Tests drive a
//! manual clock forward instead of sleeping.

use chrono::{DateTime, Utc};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

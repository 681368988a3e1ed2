// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Message-level security policy rules.
//!
//! Rules run in sequence against one instant taken from the injected
//! clock; the first rejection aborts the chain. A rule whose input field
//! is absent from the message skips rather than rejects.

use crate::message::MessageContext;
use crate::replay::{ReplayCache, ReplayStorage};
use assertion_validation_trust::clock::Clock;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of evaluating a policy rule (or the whole policy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyVerdict {
    /// The message may proceed to assertion-level validation.
    Accept,
    /// The message is rejected; the reason is final for this message.
    Reject(String),
}

impl PolicyVerdict {
    /// True when the verdict is [`PolicyVerdict::Accept`].
    pub fn is_accept(&self) -> bool {
        matches!(self, PolicyVerdict::Accept)
    }
}

/// One message-level gate.
pub trait SecurityPolicyRule: Send + Sync {
    /// Stable rule name for diagnostics.
    fn name(&self) -> &'static str;

    /// Evaluate the rule against a message at instant `now`.
    fn evaluate(&self, message: &MessageContext, now: DateTime<Utc>) -> PolicyVerdict;
}

/// An ordered chain of policy rules sharing one clock.
pub struct SecurityPolicy {
    rules: Vec<Arc<dyn SecurityPolicyRule>>,
    clock: Arc<dyn Clock>,
}

impl SecurityPolicy {
    /// An empty policy over the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            rules: Vec::new(),
            clock,
        }
    }

    /// Appends a rule to the chain.
    pub fn with_rule(mut self, rule: Arc<dyn SecurityPolicyRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Evaluates every rule in order; the first rejection wins.
    pub fn evaluate(&self, message: &MessageContext) -> PolicyVerdict {
        let now = self.clock.now();
        for rule in &self.rules {
            if let PolicyVerdict::Reject(reason) = rule.evaluate(message, now) {
                warn!(rule = rule.name(), %reason, "message rejected by security policy");
                return PolicyVerdict::Reject(reason);
            }
        }
        PolicyVerdict::Accept
    }
}

/// Rejects messages whose issue instant falls outside the freshness
/// window.
///
/// Both bounds apply the same clock skew with opposite sign: an instant
/// may lie up to `clock_skew` in the future, and up to
/// `expires + clock_skew` in the past.
pub struct IssueInstantRule {
    clock_skew: Duration,
    expires: Duration,
}

impl IssueInstantRule {
    /// Rule with the given skew tolerance and freshness window.
    pub fn new(clock_skew: Duration, expires: Duration) -> Self {
        Self { clock_skew, expires }
    }
}

impl SecurityPolicyRule for IssueInstantRule {
    fn name(&self) -> &'static str {
        "issue_instant"
    }

    fn evaluate(&self, message: &MessageContext, now: DateTime<Utc>) -> PolicyVerdict {
        let Some(issue_instant) = message.issue_instant else {
            debug!("message carries no issue instant; freshness rule skipped");
            return PolicyVerdict::Accept;
        };

        if issue_instant > now + self.clock_skew {
            return PolicyVerdict::Reject(format!(
                "message issue instant {issue_instant} lies in the future beyond the skew tolerance"
            ));
        }
        if issue_instant < now - (self.expires + self.clock_skew) {
            return PolicyVerdict::Reject(format!(
                "message issue instant {issue_instant} has aged out of the freshness window"
            ));
        }
        PolicyVerdict::Accept
    }
}

/// Rejects messages whose id was already seen inside the replay window.
///
/// Run this together with [`IssueInstantRule`]: the cache TTL is derived
/// from the same `expires` plus skew, so an id ages out of replay tracking
/// about when freshness checking would reject the message anyway.
pub struct MessageReplayRule {
    cache: Arc<ReplayCache>,
}

impl MessageReplayRule {
    /// Rule over a new cache whose TTL is `expires + clock_skew`.
    pub fn new(
        clock_skew: Duration,
        expires: Duration,
        storage: Arc<dyn ReplayStorage>,
    ) -> Self {
        Self {
            cache: Arc::new(ReplayCache::new(storage, expires + clock_skew)),
        }
    }

    /// Rule over an existing (possibly shared) cache.
    pub fn with_cache(cache: Arc<ReplayCache>) -> Self {
        Self { cache }
    }
}

impl SecurityPolicyRule for MessageReplayRule {
    fn name(&self) -> &'static str {
        "message_replay"
    }

    fn evaluate(&self, message: &MessageContext, now: DateTime<Utc>) -> PolicyVerdict {
        let Some(message_id) = &message.message_id else {
            debug!("message carries no identifier; replay rule skipped");
            return PolicyVerdict::Accept;
        };

        if self.cache.check_replay(message_id, now) {
            PolicyVerdict::Accept
        } else {
            PolicyVerdict::Reject(format!(
                "message id {message_id} was already presented inside the replay window"
            ))
        }
    }
}

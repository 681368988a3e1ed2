// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use chrono::{DateTime, Utc};

/// Message-level view consumed by security policy rules.
///
/// Rules that depend on a field the message does not carry skip rather
/// than reject; a transport frame without a protocol message id simply is
/// not subject to replay tracking.
#[derive(Debug, Clone, Default)]
pub struct MessageContext {
    /// Protocol message identifier, when the message carries one.
    pub message_id: Option<String>,
    /// Instant the message was issued, when declared.
    pub issue_instant: Option<DateTime<Utc>>,
    /// Entity id of the message issuer, when declared.
    pub issuer: Option<String>,
}

impl MessageContext {
    /// An empty message context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message identifier.
    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    /// Sets the issue instant.
    pub fn with_issue_instant(mut self, instant: DateTime<Utc>) -> Self {
        self.issue_instant = Some(instant);
        self
    }

    /// Sets the issuer entity id.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Outcome of trust evaluation for a presented token or signature.
///
/// `reasons` is a human-readable list intended for diagnostics and audit
/// logs; callers branching on the outcome should use `is_trusted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustDecision {
    /// Whether the presented material is trusted.
    pub is_trusted: bool,
    /// Diagnostic reasons (denials or trust reasons).
    pub reasons: Vec<String>,
}

impl TrustDecision {
    /// Trusted with no additional reasons.
    pub fn trusted() -> Self {
        Self {
            is_trusted: true,
            reasons: Vec::new(),
        }
    }

    /// Trusted with a single diagnostic reason.
    pub fn trusted_reason(reason: impl Into<String>) -> Self {
        Self {
            is_trusted: true,
            reasons: vec![reason.into()],
        }
    }

    /// Denied with explicit reasons.
    pub fn denied(reasons: Vec<String>) -> Self {
        Self {
            is_trusted: false,
            reasons,
        }
    }

    /// Denied with a single diagnostic reason.
    pub fn denied_reason(reason: impl Into<String>) -> Self {
        Self::denied(vec![reason.into()])
    }
}

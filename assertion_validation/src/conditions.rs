// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Assertion conditions checking.

use crate::assertion::Conditions;
use crate::context::{keys, ValidationContext};
use crate::outcome::ValidationOutcome;
use chrono::{DateTime, Duration, Utc};

/// Checks an assertion's validity window and audience restrictions.
///
/// The skew widens the window symmetrically: `NotBefore` is compared
/// against `now + skew` while `NotOnOrAfter` is compared against
/// `now - skew`, so each check mirrors the other. The `NotOnOrAfter`
/// boundary is inclusive of skewed now; only an instant strictly before
/// `now - skew` fails.
#[derive(Debug, Clone, Copy)]
pub struct ConditionsValidator {
    clock_skew: Duration,
}

impl ConditionsValidator {
    /// Validator with the given skew tolerance.
    pub fn new(clock_skew: Duration) -> Self {
        Self { clock_skew }
    }

    /// Evaluates `conditions` at instant `now`.
    pub fn validate(
        &self,
        conditions: &Conditions,
        context: &mut ValidationContext,
        now: DateTime<Utc>,
    ) -> ValidationOutcome {
        if let Some(not_before) = conditions.not_before {
            if now + self.clock_skew < not_before {
                context.fail(format!(
                    "assertion is not yet valid: NotBefore {not_before} is after the skewed \
                     validation instant"
                ));
                return ValidationOutcome::Invalid;
            }
        }

        if let Some(not_on_or_after) = conditions.not_on_or_after {
            if not_on_or_after < now - self.clock_skew {
                context.fail(format!(
                    "assertion has aged out: NotOnOrAfter {not_on_or_after} is before the skewed \
                     validation instant"
                ));
                return ValidationOutcome::Invalid;
            }
        }

        if conditions.audience_restrictions.is_empty() {
            return ValidationOutcome::Valid;
        }

        let Some(valid_audiences) = context.static_string_set(keys::COND_VALID_AUDIENCES).cloned()
        else {
            context.fail(
                "audience restrictions present but no valid audiences are configured",
            );
            return ValidationOutcome::Indeterminate;
        };

        for restriction in &conditions.audience_restrictions {
            let satisfied = restriction
                .audiences
                .iter()
                .any(|audience| valid_audiences.contains(audience));
            if !satisfied {
                context.fail(format!(
                    "audience restriction not satisfied: none of {:?} is an acceptable audience",
                    restriction.audiences
                ));
                return ValidationOutcome::Invalid;
            }
        }

        ValidationOutcome::Valid
    }
}

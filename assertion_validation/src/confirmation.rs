// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Subject-confirmation checking.
//!
//! Confirmation data is evaluated as a sequence of steps that
//! short-circuit on the first non-valid result: time window, recipient,
//! address, then the confirmation-method-specific proof.

use crate::address::{HostAddressResolver, LiteralAddressResolver};
use crate::assertion::{ConfirmationData, ConfirmationMethod, KeyInfo, SubjectConfirmation};
use crate::context::{keys, ValidationContext};
use crate::outcome::ValidationOutcome;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::debug;

/// Checks one subject confirmation against the validation context.
pub struct SubjectConfirmationValidator {
    clock_skew: Duration,
    address_resolver: Arc<dyn HostAddressResolver>,
}

impl SubjectConfirmationValidator {
    /// Validator with the given skew tolerance and the literal-only
    /// address resolver.
    pub fn new(clock_skew: Duration) -> Self {
        Self {
            clock_skew,
            address_resolver: Arc::new(LiteralAddressResolver),
        }
    }

    /// Replaces the address resolver.
    pub fn with_address_resolver(mut self, resolver: Arc<dyn HostAddressResolver>) -> Self {
        self.address_resolver = resolver;
        self
    }

    /// Evaluates `confirmation` at instant `now`.
    pub fn validate(
        &self,
        confirmation: &SubjectConfirmation,
        context: &mut ValidationContext,
        now: DateTime<Utc>,
    ) -> ValidationOutcome {
        if let Some(data) = &confirmation.data {
            let outcome = self.validate_confirmation_data(data, context, now);
            if !outcome.is_valid() {
                return outcome;
            }
        }

        match &confirmation.method {
            ConfirmationMethod::Bearer => ValidationOutcome::Valid,
            ConfirmationMethod::HolderOfKey => self.validate_holder_of_key(
                confirmation.data.as_ref().and_then(|d| d.key_info.as_ref()),
                context,
            ),
            ConfirmationMethod::Other(uri) => {
                context.fail(format!(
                    "no validator is available for confirmation method {uri}"
                ));
                ValidationOutcome::Indeterminate
            }
        }
    }

    fn validate_confirmation_data(
        &self,
        data: &ConfirmationData,
        context: &mut ValidationContext,
        now: DateTime<Utc>,
    ) -> ValidationOutcome {
        if let Some(not_before) = data.not_before {
            if now + self.clock_skew < not_before {
                context.fail(format!(
                    "confirmation is not yet valid: NotBefore {not_before} is after the skewed \
                     validation instant"
                ));
                return ValidationOutcome::Invalid;
            }
        }

        if let Some(not_on_or_after) = data.not_on_or_after {
            if not_on_or_after < now - self.clock_skew {
                context.fail(format!(
                    "confirmation has aged out: NotOnOrAfter {not_on_or_after} is before the \
                     skewed validation instant"
                ));
                return ValidationOutcome::Invalid;
            }
        }

        if let Some(recipient) = &data.recipient {
            let Some(valid_recipients) =
                context.static_string_set(keys::SC_VALID_RECIPIENTS).cloned()
            else {
                context.fail(
                    "confirmation names a recipient but no valid recipients are configured",
                );
                return ValidationOutcome::Indeterminate;
            };
            if !valid_recipients.contains(recipient) {
                context.fail(format!(
                    "confirmation recipient {recipient} is not an acceptable recipient"
                ));
                return ValidationOutcome::Invalid;
            }
        }

        if let Some(address) = &data.address {
            let Some(valid_addresses) =
                context.static_address_set(keys::SC_VALID_ADDRESSES).cloned()
            else {
                context.fail(
                    "confirmation names an address but no valid addresses are configured",
                );
                return ValidationOutcome::Indeterminate;
            };
            match self.address_resolver.resolve(address) {
                Ok(resolved) => {
                    if resolved.is_disjoint(&valid_addresses) {
                        context.fail(format!(
                            "confirmation address {address} resolved to no acceptable host \
                             address"
                        ));
                        return ValidationOutcome::Invalid;
                    }
                }
                Err(e) => {
                    debug!(%address, error = %e, "confirmation address could not be resolved");
                    context.fail(format!(
                        "confirmation address {address} could not be resolved: {e}"
                    ));
                    return ValidationOutcome::Indeterminate;
                }
            }
        }

        ValidationOutcome::Valid
    }

    /// Holder-of-key proof: the presenter's certificate or key, supplied
    /// through the validation context, must match key material embedded in
    /// the confirmation data.
    fn validate_holder_of_key(
        &self,
        key_info: Option<&KeyInfo>,
        context: &mut ValidationContext,
    ) -> ValidationOutcome {
        let Some(key_info) = key_info else {
            context.fail("holder-of-key confirmation data carries no key material");
            return ValidationOutcome::Invalid;
        };

        let presenter_cert = context
            .static_certificate(keys::SC_HOK_PRESENTER_CERT)
            .map(<[u8]>::to_vec);
        let presenter_key = context.static_public_key(keys::SC_HOK_PRESENTER_KEY).cloned();

        if presenter_cert.is_none() && presenter_key.is_none() {
            context.fail(
                "no presenter certificate or key is available for holder-of-key confirmation",
            );
            return ValidationOutcome::Indeterminate;
        }

        if let Some(cert) = presenter_cert {
            if key_info.certificates.iter().any(|candidate| *candidate == cert) {
                return ValidationOutcome::Valid;
            }
        }

        if let Some(key) = presenter_key {
            if key_info
                .public_key
                .as_ref()
                .is_some_and(|embedded| embedded.spki_der == key.spki_der)
            {
                return ValidationOutcome::Valid;
            }
        }

        context.fail("presenter key material does not match the holder-of-key confirmation data");
        ValidationOutcome::Invalid
    }
}

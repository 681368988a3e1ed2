// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Assertion validator: the per-assertion orchestration stage.

use crate::address::HostAddressResolver;
use crate::assertion::{Assertion, Statement};
use crate::conditions::ConditionsValidator;
use crate::confirmation::SubjectConfirmationValidator;
use crate::context::{keys, ValidationContext};
use crate::outcome::ValidationOutcome;
use assertion_validation_trust::clock::Clock;
use assertion_validation_trust::criteria::Criterion;
use assertion_validation_trust::credential::UsageType;
use assertion_validation_trust::engine::{SignatureToken, TrustEngine};
use assertion_validation_trust::error::TrustError;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::debug;

/// Validates one kind of statement carried by an assertion.
///
/// Statement semantics are outside the core pipeline; implementations are
/// contributed by the application.
pub trait StatementValidator: Send + Sync {
    /// Stable validator name for diagnostics.
    fn name(&self) -> &'static str;

    /// Evaluate one statement in the context of its assertion.
    fn validate(
        &self,
        statement: &Statement,
        assertion: &Assertion,
        context: &mut ValidationContext,
    ) -> ValidationOutcome;
}

/// Orchestrates signature trust, conditions, subject confirmation and
/// statement validation into one verdict.
///
/// The validator is stateless across calls and safe to share between
/// concurrent validation requests.
pub struct AssertionValidator {
    trust_engine: Arc<dyn TrustEngine>,
    clock: Arc<dyn Clock>,
    conditions: ConditionsValidator,
    confirmation: SubjectConfirmationValidator,
    statement_validators: Vec<Arc<dyn StatementValidator>>,
}

impl AssertionValidator {
    /// Validator over the given trust engine and clock with the given skew
    /// tolerance.
    pub fn new(trust_engine: Arc<dyn TrustEngine>, clock: Arc<dyn Clock>, clock_skew: Duration) -> Self {
        Self {
            trust_engine,
            clock,
            conditions: ConditionsValidator::new(clock_skew),
            confirmation: SubjectConfirmationValidator::new(clock_skew),
            statement_validators: Vec::new(),
        }
    }

    /// Replaces the subject-confirmation address resolver.
    pub fn with_address_resolver(mut self, resolver: Arc<dyn HostAddressResolver>) -> Self {
        self.confirmation = self.confirmation.with_address_resolver(resolver);
        self
    }

    /// Registers a statement validator.
    pub fn with_statement_validator(mut self, validator: Arc<dyn StatementValidator>) -> Self {
        self.statement_validators.push(validator);
        self
    }

    /// Validates an assertion against the context.
    ///
    /// The overall outcome is valid only when signature trust (when a
    /// signature is required or present), conditions, at least one subject
    /// confirmation (when any are present) and every statement validator
    /// agree. Invalid short-circuits; `Err` is reserved for
    /// configuration-class failures of the trust collaborators.
    pub fn validate(
        &self,
        assertion: &Assertion,
        context: &mut ValidationContext,
    ) -> Result<ValidationOutcome, TrustError> {
        let now = self.clock.now();

        let outcome = self.validate_signature_trust(assertion, context)?;
        if !outcome.is_valid() {
            return Ok(outcome);
        }

        if let Some(conditions) = &assertion.conditions {
            let outcome = self.conditions.validate(conditions, context, now);
            if !outcome.is_valid() {
                return Ok(outcome);
            }
        }

        let outcome = self.validate_subject_confirmations(assertion, context, now);
        if !outcome.is_valid() {
            return Ok(outcome);
        }

        for validator in &self.statement_validators {
            for statement in &assertion.statements {
                let outcome = validator.validate(statement, assertion, context);
                if !outcome.is_valid() {
                    debug!(
                        validator = validator.name(),
                        kind = statement.kind.as_str(),
                        "statement validation did not pass"
                    );
                    return Ok(outcome);
                }
            }
        }

        Ok(ValidationOutcome::Valid)
    }

    fn validate_signature_trust(
        &self,
        assertion: &Assertion,
        context: &mut ValidationContext,
    ) -> Result<ValidationOutcome, TrustError> {
        let required = context.static_bool(keys::SIGNATURE_REQUIRED).unwrap_or(false);

        let Some(signature) = &assertion.signature else {
            if required {
                context
                    .fail("assertion is unsigned but the validation context requires a signature");
                return Ok(ValidationOutcome::Invalid);
            }
            return Ok(ValidationOutcome::Valid);
        };

        // Selection criteria: caller-supplied criteria narrowed to the
        // assertion's declared issuer and signing keys.
        let mut criteria = context
            .static_criteria(keys::SIGNATURE_VALIDATION_CRITERIA_SET)
            .cloned()
            .unwrap_or_default();
        criteria.insert(Criterion::EntityId(assertion.issuer.clone()));
        criteria.insert(Criterion::Usage(UsageType::Signing));

        let empty_chain: [Vec<u8>; 0] = [];
        let token = SignatureToken {
            signed_bytes: &signature.signed_bytes,
            signature_bytes: &signature.signature_bytes,
            algorithm_uri: &signature.algorithm_uri,
            embedded_public_key: signature.key_info.as_ref().and_then(|k| k.public_key.as_ref()),
            embedded_certificate_chain: signature
                .key_info
                .as_ref()
                .map(|k| k.certificates.as_slice())
                .unwrap_or(&empty_chain),
        };

        match self.trust_engine.validate_signature(&token, &criteria) {
            Ok(decision) if decision.is_trusted => Ok(ValidationOutcome::Valid),
            Ok(decision) => {
                context.fail(format!(
                    "assertion signature is not trusted: {}",
                    decision.reasons.join("; ")
                ));
                Ok(ValidationOutcome::Invalid)
            }
            Err(TrustError::Resolution(message)) => {
                // The collaborator could not supply candidates; that is
                // missing supporting data, not a policy violation.
                debug!(error = %message, "credential resolution failed during signature trust");
                context.fail(format!(
                    "signature trust could not be established: {message}"
                ));
                Ok(ValidationOutcome::Indeterminate)
            }
            Err(e) => Err(e),
        }
    }

    fn validate_subject_confirmations(
        &self,
        assertion: &Assertion,
        context: &mut ValidationContext,
        now: DateTime<Utc>,
    ) -> ValidationOutcome {
        if assertion.subject_confirmations.is_empty() {
            return ValidationOutcome::Valid;
        }

        let mut saw_indeterminate = false;
        for confirmation in &assertion.subject_confirmations {
            match self.confirmation.validate(confirmation, context, now) {
                ValidationOutcome::Valid => return ValidationOutcome::Valid,
                ValidationOutcome::Indeterminate => saw_indeterminate = true,
                ValidationOutcome::Invalid => {}
            }
        }

        if saw_indeterminate {
            ValidationOutcome::Indeterminate
        } else {
            ValidationOutcome::Invalid
        }
    }
}

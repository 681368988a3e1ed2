// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use assertion_validation::assertion::{Assertion, Signature, Statement};
use assertion_validation::context::{keys, ContextValue, ValidationContext};
use assertion_validation::outcome::ValidationOutcome;
use assertion_validation::validator::{AssertionValidator, StatementValidator};
use assertion_validation_test_utils::{
    assertion_with_window, bearer_confirmation, ed25519_spki, ManualClock,
};
use assertion_validation_trust::credential::{Credential, PublicKeyInfo, UsageType};
use assertion_validation_trust::criteria::CriteriaSet;
use assertion_validation_trust::engine::ExplicitKeyTrustEngine;
use assertion_validation_trust::error::TrustError;
use assertion_validation_trust::resolver::{CredentialResolver, StaticCredentialResolver};
use assertion_validation_trust::verify::algorithm;
use chrono::{Duration, TimeZone, Utc};
use ring::rand::SystemRandom;
use ring::signature::{Ed25519KeyPair, KeyPair};
use std::collections::BTreeSet;
use std::sync::Arc;

const ISSUER: &str = "https://idp.example.org";
const AUDIENCE: &str = "https://sp.example.org";

fn generate_key_pair() -> Ed25519KeyPair {
    let rng = SystemRandom::new();
    let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng).unwrap();
    Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).unwrap()
}

fn issuer_credential(key_pair: &Ed25519KeyPair) -> Credential {
    Credential::for_entity(ISSUER)
        .with_usage(UsageType::Signing)
        .with_public_key(PublicKeyInfo::new(
            "Ed25519",
            ed25519_spki(key_pair.public_key().as_ref()),
        ))
}

fn scenario_assertion() -> Assertion {
    let mut assertion = assertion_with_window(
        ISSUER,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 10, 0).unwrap(),
        &[AUDIENCE],
    );
    assertion.subject_confirmations.push(bearer_confirmation());
    assertion
}

fn signed_scenario_assertion(key_pair: &Ed25519KeyPair) -> Assertion {
    let mut assertion = scenario_assertion();
    let signed_bytes = b"canonicalized-assertion-bytes".to_vec();
    let signature_bytes = key_pair.sign(&signed_bytes).as_ref().to_vec();
    assertion.signature = Some(Signature {
        signed_bytes,
        signature_bytes,
        algorithm_uri: algorithm::ED25519.to_string(),
        key_info: None,
    });
    assertion
}

fn scenario_context() -> ValidationContext {
    ValidationContext::new().with_static(
        keys::COND_VALID_AUDIENCES,
        ContextValue::StringSet(BTreeSet::from([AUDIENCE.to_string()])),
    )
}

fn validator_at_minute(
    resolver: Arc<dyn CredentialResolver>,
    minute: u32,
) -> AssertionValidator {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap(),
    ));
    let engine = Arc::new(ExplicitKeyTrustEngine::new(resolver));
    AssertionValidator::new(engine, clock, Duration::zero())
}

#[test]
fn signed_assertion_inside_its_window_is_valid() {
    let key_pair = generate_key_pair();
    let resolver = Arc::new(StaticCredentialResolver::new(vec![issuer_credential(
        &key_pair,
    )]));
    let validator = validator_at_minute(resolver, 5);

    let mut context = scenario_context();
    let outcome = validator
        .validate(&signed_scenario_assertion(&key_pair), &mut context)
        .unwrap();
    assert_eq!(outcome, ValidationOutcome::Valid);
    assert!(context.failure_message().is_none());
}

#[test]
fn assertion_past_its_window_is_invalid_with_a_named_condition() {
    let key_pair = generate_key_pair();
    let resolver = Arc::new(StaticCredentialResolver::new(vec![issuer_credential(
        &key_pair,
    )]));
    let validator = validator_at_minute(resolver, 11);

    let mut context = scenario_context();
    let outcome = validator
        .validate(&signed_scenario_assertion(&key_pair), &mut context)
        .unwrap();
    assert_eq!(outcome, ValidationOutcome::Invalid);
    assert!(context.failure_message().unwrap().contains("NotOnOrAfter"));
}

#[test]
fn signature_by_an_unresolved_key_is_invalid() {
    let issuer_key = generate_key_pair();
    let attacker_key = generate_key_pair();
    let resolver = Arc::new(StaticCredentialResolver::new(vec![issuer_credential(
        &issuer_key,
    )]));
    let validator = validator_at_minute(resolver, 5);

    let mut context = scenario_context();
    let outcome = validator
        .validate(&signed_scenario_assertion(&attacker_key), &mut context)
        .unwrap();
    assert_eq!(outcome, ValidationOutcome::Invalid);
    assert!(context.failure_message().unwrap().contains("not trusted"));
}

#[test]
fn unsigned_assertion_is_invalid_when_a_signature_is_required() {
    let key_pair = generate_key_pair();
    let resolver = Arc::new(StaticCredentialResolver::new(vec![issuer_credential(
        &key_pair,
    )]));
    let validator = validator_at_minute(resolver, 5);

    let mut context =
        scenario_context().with_static(keys::SIGNATURE_REQUIRED, ContextValue::Bool(true));
    let outcome = validator
        .validate(&scenario_assertion(), &mut context)
        .unwrap();
    assert_eq!(outcome, ValidationOutcome::Invalid);
    assert!(context.failure_message().unwrap().contains("unsigned"));
}

#[test]
fn unsigned_assertion_passes_when_no_signature_is_required() {
    let resolver = Arc::new(StaticCredentialResolver::new(Vec::new()));
    let validator = validator_at_minute(resolver, 5);

    let mut context = scenario_context();
    let outcome = validator
        .validate(&scenario_assertion(), &mut context)
        .unwrap();
    assert_eq!(outcome, ValidationOutcome::Valid);
}

struct FailingResolver;

impl CredentialResolver for FailingResolver {
    fn resolve(&self, _criteria: &CriteriaSet) -> Result<Vec<Credential>, TrustError> {
        Err(TrustError::Resolution("metadata backend unavailable".to_string()))
    }
}

#[test]
fn resolver_failure_is_indeterminate_not_invalid() {
    let key_pair = generate_key_pair();
    let validator = validator_at_minute(Arc::new(FailingResolver), 5);

    let mut context = scenario_context();
    let outcome = validator
        .validate(&signed_scenario_assertion(&key_pair), &mut context)
        .unwrap();
    assert_eq!(outcome, ValidationOutcome::Indeterminate);
    assert!(context
        .failure_message()
        .unwrap()
        .contains("metadata backend unavailable"));
}

struct RejectingStatementValidator;

impl StatementValidator for RejectingStatementValidator {
    fn name(&self) -> &'static str {
        "rejecting_statement_validator"
    }

    fn validate(
        &self,
        statement: &Statement,
        _assertion: &Assertion,
        context: &mut ValidationContext,
    ) -> ValidationOutcome {
        context.fail(format!("statement of kind {} was rejected", statement.kind));
        ValidationOutcome::Invalid
    }
}

#[test]
fn statement_validators_run_after_the_core_checks() {
    let key_pair = generate_key_pair();
    let resolver = Arc::new(StaticCredentialResolver::new(vec![issuer_credential(
        &key_pair,
    )]));
    let validator = validator_at_minute(resolver, 5)
        .with_statement_validator(Arc::new(RejectingStatementValidator));

    let mut assertion = signed_scenario_assertion(&key_pair);
    assertion.statements.push(Statement {
        kind: "attribute".to_string(),
        content: "role=admin".to_string(),
    });

    let mut context = scenario_context();
    let outcome = validator.validate(&assertion, &mut context).unwrap();
    assert_eq!(outcome, ValidationOutcome::Invalid);
    assert!(context.failure_message().unwrap().contains("attribute"));
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Minimal end-to-end smoke scenario: policy rules gate the message, then
//! the assertion validator checks signature trust, conditions and subject
//! confirmation.

use assertion_validation::assertion::{Assertion, Signature};
use assertion_validation::context::{keys, ContextValue, ValidationContext};
use assertion_validation::message::MessageContext;
use assertion_validation::policy::{IssueInstantRule, MessageReplayRule, SecurityPolicy};
use assertion_validation::replay::InMemoryReplayStorage;
use assertion_validation::validator::AssertionValidator;
use assertion_validation::SystemClock;
use assertion_validation_test_utils::{assertion_with_window, bearer_confirmation, ed25519_spki};
use assertion_validation_trust::credential::{Credential, PublicKeyInfo, UsageType};
use assertion_validation_trust::engine::ExplicitKeyTrustEngine;
use assertion_validation_trust::resolver::StaticCredentialResolver;
use assertion_validation_trust::verify::algorithm;
use chrono::{Duration, Utc};
use ring::rand::SystemRandom;
use ring::signature::{Ed25519KeyPair, KeyPair};
use std::collections::BTreeSet;
use std::sync::Arc;

fn main() {
    let clock = Arc::new(SystemClock);

    // Message-level gates: freshness + replay suppression.
    let policy = SecurityPolicy::new(clock.clone())
        .with_rule(Arc::new(IssueInstantRule::new(
            Duration::seconds(300),
            Duration::seconds(600),
        )))
        .with_rule(Arc::new(MessageReplayRule::new(
            Duration::seconds(300),
            Duration::seconds(600),
            Arc::new(InMemoryReplayStorage::new()),
        )));

    let message = MessageContext::new()
        .with_message_id("msg-42")
        .with_issue_instant(Utc::now())
        .with_issuer("https://idp.example.org");
    println!("message policy verdict: {:?}", policy.evaluate(&message));

    // Assertion-level validation with an explicit-key trust engine.
    let rng = SystemRandom::new();
    let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng).unwrap();
    let key_pair = Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).unwrap();

    let resolver = StaticCredentialResolver::new(vec![Credential::for_entity(
        "https://idp.example.org",
    )
    .with_usage(UsageType::Signing)
    .with_public_key(PublicKeyInfo::new(
        "Ed25519",
        ed25519_spki(key_pair.public_key().as_ref()),
    ))]);
    let engine = Arc::new(ExplicitKeyTrustEngine::new(Arc::new(resolver)));
    let validator = AssertionValidator::new(engine, clock, Duration::seconds(300));

    let mut assertion = assertion_with_window(
        "https://idp.example.org",
        Utc::now() - Duration::minutes(1),
        Utc::now() + Duration::minutes(9),
        &["https://sp.example.org"],
    );
    assertion.subject_confirmations.push(bearer_confirmation());

    let signed_bytes = b"canonicalized-assertion-bytes".to_vec();
    let signature_bytes = key_pair.sign(&signed_bytes).as_ref().to_vec();
    assertion.signature = Some(Signature {
        signed_bytes,
        signature_bytes,
        algorithm_uri: algorithm::ED25519.to_string(),
        key_info: None,
    });

    let mut context = ValidationContext::new()
        .with_static(keys::SIGNATURE_REQUIRED, ContextValue::Bool(true))
        .with_static(
            keys::COND_VALID_AUDIENCES,
            ContextValue::StringSet(BTreeSet::from(["https://sp.example.org".to_string()])),
        );

    match validator.validate(&assertion, &mut context) {
        Ok(outcome) => println!("assertion outcome: {outcome:?}"),
        Err(e) => println!("validation aborted: {e}"),
    }
    if let Some(message) = context.failure_message() {
        println!("failure: {message}");
    }
}

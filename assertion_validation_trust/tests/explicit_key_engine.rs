// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use assertion_validation_trust::credential::{Credential, PublicKeyInfo, UsageType};
use assertion_validation_trust::criteria::{CriteriaSet, Criterion};
use assertion_validation_trust::engine::{ExplicitKeyTrustEngine, SignatureToken, TrustEngine};
use assertion_validation_trust::resolver::StaticCredentialResolver;
use assertion_validation_trust::verify::algorithm;
use ring::rand::SystemRandom;
use ring::signature::{Ed25519KeyPair, KeyPair};
use std::sync::Arc;

/// Minimal DER SubjectPublicKeyInfo wrapper for a raw Ed25519 public key.
fn ed25519_spki(raw: &[u8]) -> Vec<u8> {
    let mut out = vec![
        0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
    ];
    out.extend_from_slice(raw);
    out
}

fn ed25519_credential(entity_id: &str, key_pair: &Ed25519KeyPair) -> Credential {
    Credential::for_entity(entity_id)
        .with_usage(UsageType::Signing)
        .with_public_key(PublicKeyInfo::new(
            "Ed25519",
            ed25519_spki(key_pair.public_key().as_ref()),
        ))
}

fn generate_key_pair() -> Ed25519KeyPair {
    let rng = SystemRandom::new();
    let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng).unwrap();
    Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).unwrap()
}

#[test]
fn signature_is_trusted_when_any_candidate_key_verifies() {
    let key_one = generate_key_pair();
    let key_two = generate_key_pair();

    let resolver = StaticCredentialResolver::new(vec![
        ed25519_credential("https://idp-one.example.org", &key_one),
        ed25519_credential("https://idp-two.example.org", &key_two),
    ]);
    let engine = ExplicitKeyTrustEngine::new(Arc::new(resolver));

    let data = b"assertion bytes to cover";
    let signature_bytes = key_two.sign(data);

    let token = SignatureToken {
        signed_bytes: data,
        signature_bytes: signature_bytes.as_ref(),
        algorithm_uri: algorithm::ED25519,
        embedded_public_key: None,
        embedded_certificate_chain: &[],
    };

    let decision = engine.validate_signature(&token, &CriteriaSet::new()).unwrap();
    assert!(decision.is_trusted);
    assert!(decision
        .reasons
        .iter()
        .any(|r| r.contains("https://idp-two.example.org")));
}

#[test]
fn signature_is_denied_when_no_candidate_key_verifies() {
    let key_one = generate_key_pair();
    let key_two = generate_key_pair();
    let unresolved = generate_key_pair();

    let resolver = StaticCredentialResolver::new(vec![
        ed25519_credential("https://idp-one.example.org", &key_one),
        ed25519_credential("https://idp-two.example.org", &key_two),
    ]);
    let engine = ExplicitKeyTrustEngine::new(Arc::new(resolver));

    let data = b"assertion bytes to cover";
    let signature_bytes = unresolved.sign(data);

    let token = SignatureToken {
        signed_bytes: data,
        signature_bytes: signature_bytes.as_ref(),
        algorithm_uri: algorithm::ED25519,
        embedded_public_key: None,
        embedded_certificate_chain: &[],
    };

    let decision = engine.validate_signature(&token, &CriteriaSet::new()).unwrap();
    assert!(!decision.is_trusted);
}

#[test]
fn unsupported_algorithm_is_denied_not_an_error() {
    let key = generate_key_pair();
    let resolver = StaticCredentialResolver::new(vec![ed25519_credential(
        "https://idp.example.org",
        &key,
    )]);
    let engine = ExplicitKeyTrustEngine::new(Arc::new(resolver));

    let data = b"bytes";
    let signature_bytes = key.sign(data);
    let token = SignatureToken {
        signed_bytes: data,
        signature_bytes: signature_bytes.as_ref(),
        algorithm_uri: "urn:example:not-a-real-algorithm",
        embedded_public_key: None,
        embedded_certificate_chain: &[],
    };

    let decision = engine.validate_signature(&token, &CriteriaSet::new()).unwrap();
    assert!(!decision.is_trusted);
    assert!(decision.reasons.iter().any(|r| r.contains("not supported")));
}

#[test]
fn criteria_narrow_the_candidate_set_before_verification() {
    let key = generate_key_pair();

    let resolver = StaticCredentialResolver::new(vec![
        ed25519_credential("https://idp.example.org", &key),
    ]);
    let engine = ExplicitKeyTrustEngine::new(Arc::new(resolver));

    let data = b"bytes";
    let signature_bytes = key.sign(data);
    let token = SignatureToken {
        signed_bytes: data,
        signature_bytes: signature_bytes.as_ref(),
        algorithm_uri: algorithm::ED25519,
        embedded_public_key: None,
        embedded_certificate_chain: &[],
    };

    // Criteria naming a different entity drop the only credential whose
    // key would verify.
    let criteria =
        CriteriaSet::new().with(Criterion::EntityId("https://other.example.org".to_string()));
    let decision = engine.validate_signature(&token, &criteria).unwrap();
    assert!(!decision.is_trusted);

    let criteria =
        CriteriaSet::new().with(Criterion::EntityId("https://idp.example.org".to_string()));
    let decision = engine.validate_signature(&token, &criteria).unwrap();
    assert!(decision.is_trusted);
}

#[test]
fn presented_key_material_is_trusted_on_first_match() {
    let key_one = generate_key_pair();
    let key_two = generate_key_pair();

    let resolver = StaticCredentialResolver::new(vec![
        ed25519_credential("https://idp-one.example.org", &key_one),
        ed25519_credential("https://idp-two.example.org", &key_two),
    ]);
    let engine = ExplicitKeyTrustEngine::new(Arc::new(resolver));

    let presented = Credential::default().with_public_key(PublicKeyInfo::new(
        "Ed25519",
        ed25519_spki(key_two.public_key().as_ref()),
    ));
    let decision = engine
        .validate_credential(&presented, &CriteriaSet::new())
        .unwrap();
    assert!(decision.is_trusted);

    let unknown = generate_key_pair();
    let presented = Credential::default().with_public_key(PublicKeyInfo::new(
        "Ed25519",
        ed25519_spki(unknown.public_key().as_ref()),
    ));
    let decision = engine
        .validate_credential(&presented, &CriteriaSet::new())
        .unwrap();
    assert!(!decision.is_trusted);
}

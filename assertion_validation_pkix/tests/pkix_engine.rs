// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use assertion_validation_pkix::engine::{PkixTrustEngine, PkixTrustOptions};
use assertion_validation_pkix::info::{PkixValidationInfo, StaticPkixValidationInfoResolver};
use assertion_validation_trust::clock::SystemClock;
use assertion_validation_trust::credential::Credential;
use assertion_validation_trust::criteria::{CriteriaSet, Criterion};
use assertion_validation_trust::engine::{SignatureToken, TrustEngine};
use assertion_validation_trust::verify::algorithm;
use rcgen::{BasicConstraints, CertificateParams, DnType, IsCa, KeyPair};
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, ECDSA_P256_SHA256_FIXED_SIGNING};
use std::collections::BTreeSet;
use std::sync::Arc;

struct Scenario {
    ca_der: Vec<u8>,
    ee_der: Vec<u8>,
    ee_key: KeyPair,
}

fn scenario(ee_name: &str) -> Scenario {
    let ca_key = KeyPair::generate().unwrap();
    let mut ca_params = CertificateParams::new(Vec::<String>::new()).unwrap();
    ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    ca_params
        .distinguished_name
        .push(DnType::CommonName, "Test Root CA");
    let ca_cert = ca_params.self_signed(&ca_key).unwrap();

    let ee_key = KeyPair::generate().unwrap();
    let mut ee_params = CertificateParams::new(vec![ee_name.to_string()]).unwrap();
    ee_params.distinguished_name.push(DnType::CommonName, ee_name);
    let ee_cert = ee_params.signed_by(&ee_key, &ca_cert, &ca_key).unwrap();

    Scenario {
        ca_der: ca_cert.der().to_vec(),
        ee_der: ee_cert.der().to_vec(),
        ee_key,
    }
}

fn engine_for(scenario: &Scenario, trusted_names: BTreeSet<String>) -> PkixTrustEngine {
    let resolver = StaticPkixValidationInfoResolver::new(vec![PkixValidationInfo::new(vec![
        scenario.ca_der.clone(),
    ])])
    .with_trusted_names(trusted_names);
    PkixTrustEngine::new(Arc::new(resolver), Arc::new(SystemClock))
}

fn names(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

#[test]
fn anchored_chain_with_matching_trusted_name_is_trusted() {
    let scenario = scenario("sp.example.org");
    let engine = engine_for(&scenario, names(&["sp.example.org"]));

    let token = Credential::default().with_certificate_chain(vec![scenario.ee_der.clone()]);
    let decision = engine
        .validate_credential(&token, &CriteriaSet::new())
        .unwrap();
    assert!(decision.is_trusted, "reasons: {:?}", decision.reasons);
}

#[test]
fn anchored_chain_with_mismatched_trusted_name_is_denied() {
    let scenario = scenario("sp.example.org");
    let engine = engine_for(&scenario, names(&["other.example.org"]));

    let token = Credential::default().with_certificate_chain(vec![scenario.ee_der.clone()]);
    let decision = engine
        .validate_credential(&token, &CriteriaSet::new())
        .unwrap();
    assert!(!decision.is_trusted);
}

#[test]
fn dynamic_trusted_names_criterion_is_unioned_with_configuration() {
    let scenario = scenario("sp.example.org");
    let engine = engine_for(&scenario, names(&["other.example.org"]));

    let criteria =
        CriteriaSet::new().with(Criterion::TrustedNames(names(&["sp.example.org"])));
    let token = Credential::default().with_certificate_chain(vec![scenario.ee_der.clone()]);
    let decision = engine.validate_credential(&token, &criteria).unwrap();
    assert!(decision.is_trusted, "reasons: {:?}", decision.reasons);
}

#[test]
fn name_checking_can_be_disabled() {
    let scenario = scenario("sp.example.org");
    let engine = engine_for(&scenario, names(&["other.example.org"])).with_options(
        PkixTrustOptions {
            enforce_trusted_names: false,
        },
    );

    let token = Credential::default().with_certificate_chain(vec![scenario.ee_der.clone()]);
    let decision = engine
        .validate_credential(&token, &CriteriaSet::new())
        .unwrap();
    assert!(decision.is_trusted);
}

#[test]
fn untrusted_issuer_is_denied() {
    let presented = scenario("sp.example.org");
    let anchor_only = scenario("sp.example.org");

    // Engine anchored on a different CA than the one that issued the
    // presented certificate.
    let engine = engine_for(&anchor_only, names(&["sp.example.org"]));
    let token = Credential::default().with_certificate_chain(vec![presented.ee_der.clone()]);
    let decision = engine
        .validate_credential(&token, &CriteriaSet::new())
        .unwrap();
    assert!(!decision.is_trusted);
}

#[test]
fn signature_with_anchored_chain_is_trusted() {
    let scenario = scenario("sp.example.org");
    let engine = engine_for(&scenario, names(&["sp.example.org"]));

    let rng = SystemRandom::new();
    let signing_key = EcdsaKeyPair::from_pkcs8(
        &ECDSA_P256_SHA256_FIXED_SIGNING,
        &scenario.ee_key.serialize_der(),
        &rng,
    )
    .unwrap();

    let data = b"assertion bytes to cover";
    let signature_bytes = signing_key.sign(&rng, data).unwrap();

    let chain = vec![scenario.ee_der.clone()];
    let token = SignatureToken {
        signed_bytes: data,
        signature_bytes: signature_bytes.as_ref(),
        algorithm_uri: algorithm::ECDSA_SHA256,
        embedded_public_key: None,
        embedded_certificate_chain: &chain,
    };

    let decision = engine.validate_signature(&token, &CriteriaSet::new()).unwrap();
    assert!(decision.is_trusted, "reasons: {:?}", decision.reasons);
}

#[test]
fn signature_that_does_not_verify_under_the_embedded_key_is_denied() {
    let scenario = scenario("sp.example.org");
    let other = scenario_with_other_key();
    let engine = engine_for(&scenario, names(&["sp.example.org"]));

    let rng = SystemRandom::new();
    let signing_key = EcdsaKeyPair::from_pkcs8(
        &ECDSA_P256_SHA256_FIXED_SIGNING,
        &other.serialize_der(),
        &rng,
    )
    .unwrap();

    let data = b"assertion bytes to cover";
    let signature_bytes = signing_key.sign(&rng, data).unwrap();

    let chain = vec![scenario.ee_der.clone()];
    let token = SignatureToken {
        signed_bytes: data,
        signature_bytes: signature_bytes.as_ref(),
        algorithm_uri: algorithm::ECDSA_SHA256,
        embedded_public_key: None,
        embedded_certificate_chain: &chain,
    };

    let decision = engine.validate_signature(&token, &CriteriaSet::new()).unwrap();
    assert!(!decision.is_trusted);
}

fn scenario_with_other_key() -> KeyPair {
    KeyPair::generate().unwrap()
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! PKIX trust engine.

use crate::info::PkixValidationInfoResolver;
use crate::names;
use crate::path::{thumbprint_sha1_hex, PathEvaluation, PkixPathValidator};
use assertion_validation_trust::clock::Clock;
use assertion_validation_trust::credential::Credential;
use assertion_validation_trust::criteria::CriteriaSet;
use assertion_validation_trust::decision::TrustDecision;
use assertion_validation_trust::engine::{SignatureToken, TrustEngine};
use assertion_validation_trust::error::TrustError;
use assertion_validation_trust::verify::{RingSignatureVerifier, SignatureVerifier, VerifyOutcome};
use std::sync::Arc;
use tracing::{debug, warn};
use x509_parser::prelude::*;

/// Controls for PKIX trust evaluation.
#[derive(Debug, Clone, Copy)]
pub struct PkixTrustOptions {
    /// When false, trusted-name checking is skipped entirely.
    pub enforce_trusted_names: bool,
}

impl Default for PkixTrustOptions {
    fn default() -> Self {
        Self {
            enforce_trusted_names: true,
        }
    }
}

/// Trust engine that validates a presented certificate chain against
/// resolved trust anchors.
///
/// Validation information entries are tried in order; the first entry that
/// closes a path wins. With name checking enabled, the end-entity's names
/// must additionally intersect the trusted-name set (static configuration
/// unioned with any trusted-names criterion).
pub struct PkixTrustEngine {
    resolver: Arc<dyn PkixValidationInfoResolver>,
    clock: Arc<dyn Clock>,
    options: PkixTrustOptions,
    path_validator: PkixPathValidator,
    verifier: Arc<dyn SignatureVerifier>,
}

impl PkixTrustEngine {
    /// Engine over the given resolver and clock with default options and
    /// the `ring`-backed verifier.
    pub fn new(resolver: Arc<dyn PkixValidationInfoResolver>, clock: Arc<dyn Clock>) -> Self {
        Self {
            resolver,
            clock,
            options: PkixTrustOptions::default(),
            path_validator: PkixPathValidator,
            verifier: Arc::new(RingSignatureVerifier),
        }
    }

    /// Replaces the evaluation options.
    pub fn with_options(mut self, options: PkixTrustOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the signature verifier.
    pub fn with_verifier(mut self, verifier: Arc<dyn SignatureVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Path-validates `leaf` + `intermediates` against every resolved
    /// information entry, then applies the trusted-name check.
    fn evaluate_chain(
        &self,
        leaf: &[u8],
        intermediates: &[Vec<u8>],
        criteria: &CriteriaSet,
    ) -> Result<TrustDecision, TrustError> {
        let infos = self.resolver.resolve(criteria)?;
        if infos.is_empty() {
            return Ok(TrustDecision::denied_reason(
                "no PKIX validation information resolved for the request",
            ));
        }

        let now = self.clock.now();
        let mut reasons = Vec::new();

        for (index, info) in infos.iter().enumerate() {
            match self.path_validator.validate(leaf, intermediates, info, now) {
                Ok(PathEvaluation::Anchored { chain_len }) => {
                    debug!(
                        entry = index,
                        chain_len,
                        thumbprint = %thumbprint_sha1_hex(leaf),
                        "certificate path closed against a trust anchor"
                    );
                    return self.check_trusted_names(leaf, criteria);
                }
                Ok(PathEvaluation::Unanchored {
                    reasons: mut attempt_reasons,
                }) => {
                    reasons.append(&mut attempt_reasons);
                }
                Err(e) => {
                    // Malformed presented or configured material; try the
                    // remaining entries but record the failure.
                    debug!(entry = index, error = %e, "path validation attempt failed");
                    reasons.push(e.to_string());
                }
            }
        }

        Ok(TrustDecision::denied(reasons))
    }

    fn check_trusted_names(
        &self,
        leaf: &[u8],
        criteria: &CriteriaSet,
    ) -> Result<TrustDecision, TrustError> {
        if !self.options.enforce_trusted_names {
            return Ok(TrustDecision::trusted_reason(
                "certificate path anchored; name checking disabled",
            ));
        }

        let mut trusted = self.resolver.resolve_trusted_names(criteria)?;
        if let Some(dynamic) = criteria.trusted_names() {
            trusted.extend(dynamic.iter().cloned());
        }

        // Nothing configured to enforce: the anchored path alone decides.
        if trusted.is_empty() {
            return Ok(TrustDecision::trusted_reason(
                "certificate path anchored; no trusted names configured",
            ));
        }

        let presented = names::candidate_names(leaf)
            .map_err(|e| TrustError::Verification(e.to_string()))?;
        if names::matches_trusted_names(&presented, &trusted) {
            Ok(TrustDecision::trusted_reason(
                "certificate path anchored and end-entity name is trusted",
            ))
        } else {
            Ok(TrustDecision::denied_reason(format!(
                "end-entity names {presented:?} do not intersect the trusted name set",
            )))
        }
    }
}

impl TrustEngine for PkixTrustEngine {
    fn validate_credential(
        &self,
        token: &Credential,
        criteria: &CriteriaSet,
    ) -> Result<TrustDecision, TrustError> {
        let Some(leaf) = token.leaf_certificate() else {
            return Ok(TrustDecision::denied_reason(
                "presented credential carries no certificate to path-validate",
            ));
        };
        self.evaluate_chain(leaf, &token.certificate_chain[1..], criteria)
    }

    fn validate_signature(
        &self,
        signature: &SignatureToken<'_>,
        criteria: &CriteriaSet,
    ) -> Result<TrustDecision, TrustError> {
        let chain = signature.embedded_certificate_chain;
        let Some(leaf) = chain.first() else {
            return Ok(TrustDecision::denied_reason(
                "signature carries no certificate chain to path-validate",
            ));
        };

        let (_, cert) = X509Certificate::from_der(leaf).map_err(|e| {
            TrustError::Verification(format!("embedded certificate parse failed: {e}"))
        })?;
        let spki_der = cert.tbs_certificate.subject_pki.raw.to_vec();

        match self.verifier.verify(
            signature.algorithm_uri,
            &spki_der,
            signature.signed_bytes,
            signature.signature_bytes,
        )? {
            VerifyOutcome::Valid => {}
            VerifyOutcome::Invalid => {
                return Ok(TrustDecision::denied_reason(
                    "signature does not verify under the embedded certificate key",
                ));
            }
            VerifyOutcome::UnsupportedAlgorithm => {
                warn!(
                    algorithm = signature.algorithm_uri,
                    "declared signature algorithm is not supported"
                );
                return Ok(TrustDecision::denied_reason(format!(
                    "declared signature algorithm {} is not supported",
                    signature.algorithm_uri
                )));
            }
        }

        self.evaluate_chain(leaf, &chain[1..], criteria)
    }
}

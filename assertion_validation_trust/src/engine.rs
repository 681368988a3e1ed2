// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Trust engines.
//!
//! An engine resolves candidate credentials through the injected resolver
//! and decides trust of a presented token or signature. Engines are
//! stateless and safely shared across concurrent validation requests.

use crate::credential::Credential;
use crate::criteria::CriteriaSet;
use crate::decision::TrustDecision;
use crate::error::TrustError;
use crate::registry::CredentialCriteriaRegistry;
use crate::resolver::CredentialResolver;
use crate::verify::{RingSignatureVerifier, SignatureVerifier, VerifyOutcome};
use std::sync::Arc;
use tracing::{debug, warn};

/// A presented signature to be checked for trust.
#[derive(Debug, Clone, Copy)]
pub struct SignatureToken<'a> {
    /// The bytes the signature covers.
    pub signed_bytes: &'a [u8],
    /// The raw signature value.
    pub signature_bytes: &'a [u8],
    /// Declared signature algorithm URI.
    pub algorithm_uri: &'a str,
    /// Public key carried alongside the signature (e.g. from KeyInfo).
    pub embedded_public_key: Option<&'a crate::credential::PublicKeyInfo>,
    /// DER certificate chain carried alongside the signature, leaf first.
    pub embedded_certificate_chain: &'a [Vec<u8>],
}

/// Decides whether presented key material or a signature is trustworthy.
pub trait TrustEngine: Send + Sync {
    /// Decide trust of a presented credential (raw key or certificate).
    fn validate_credential(
        &self,
        token: &Credential,
        criteria: &CriteriaSet,
    ) -> Result<TrustDecision, TrustError>;

    /// Decide trust of a presented signature.
    fn validate_signature(
        &self,
        signature: &SignatureToken<'_>,
        criteria: &CriteriaSet,
    ) -> Result<TrustDecision, TrustError>;
}

/// Trust engine that trusts exactly the key material its resolver returns.
///
/// Trust is granted on the first matching candidate; absence of any match
/// is a denial, never an indeterminate outcome. This engine never defers
/// to PKIX semantics.
pub struct ExplicitKeyTrustEngine {
    resolver: Arc<dyn CredentialResolver>,
    registry: CredentialCriteriaRegistry,
    verifier: Arc<dyn SignatureVerifier>,
}

impl ExplicitKeyTrustEngine {
    /// Engine over the given resolver with the built-in evaluator table
    /// and the `ring`-backed verifier.
    pub fn new(resolver: Arc<dyn CredentialResolver>) -> Self {
        Self {
            resolver,
            registry: CredentialCriteriaRegistry::with_builtin_evaluators(),
            verifier: Arc::new(RingSignatureVerifier),
        }
    }

    /// Replaces the evaluator registry used to narrow candidates.
    pub fn with_registry(mut self, registry: CredentialCriteriaRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replaces the signature verifier.
    pub fn with_verifier(mut self, verifier: Arc<dyn SignatureVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Resolved candidates, dropping ones the registry scores as
    /// mismatching the criteria.
    fn candidates(&self, criteria: &CriteriaSet) -> Result<Vec<Credential>, TrustError> {
        let resolved = self.resolver.resolve(criteria)?;
        Ok(resolved
            .into_iter()
            .filter(|candidate| self.registry.matches_all(criteria, candidate) != Some(false))
            .collect())
    }

    /// Key-material equality between a presented token and a candidate:
    /// SPKI equality when both carry a public key, otherwise leaf
    /// certificate equality.
    fn key_material_matches(token: &Credential, candidate: &Credential) -> bool {
        if let (Some(presented), Some(resolved)) = (&token.public_key, &candidate.public_key) {
            if presented.spki_der == resolved.spki_der {
                return true;
            }
        }
        match (token.leaf_certificate(), candidate.leaf_certificate()) {
            (Some(presented), Some(resolved)) => presented == resolved,
            _ => false,
        }
    }
}

impl TrustEngine for ExplicitKeyTrustEngine {
    fn validate_credential(
        &self,
        token: &Credential,
        criteria: &CriteriaSet,
    ) -> Result<TrustDecision, TrustError> {
        for candidate in self.candidates(criteria)? {
            if Self::key_material_matches(token, &candidate) {
                debug!(
                    entity = candidate.entity_id.as_deref().unwrap_or("<unknown>"),
                    "presented key material matched a resolved credential"
                );
                return Ok(TrustDecision::trusted_reason(format!(
                    "presented key material matches the credential resolved for {}",
                    candidate.entity_id.as_deref().unwrap_or("<unknown>")
                )));
            }
        }
        Ok(TrustDecision::denied_reason(
            "no resolved credential matched the presented key material",
        ))
    }

    fn validate_signature(
        &self,
        signature: &SignatureToken<'_>,
        criteria: &CriteriaSet,
    ) -> Result<TrustDecision, TrustError> {
        let candidates = self.candidates(criteria)?;
        if candidates.is_empty() {
            return Ok(TrustDecision::denied_reason(
                "no candidate credentials resolved for signature verification",
            ));
        }

        for candidate in &candidates {
            let Some(key) = &candidate.public_key else {
                continue;
            };
            match self.verifier.verify(
                signature.algorithm_uri,
                &key.spki_der,
                signature.signed_bytes,
                signature.signature_bytes,
            )? {
                VerifyOutcome::Valid => {
                    debug!(
                        entity = candidate.entity_id.as_deref().unwrap_or("<unknown>"),
                        algorithm = signature.algorithm_uri,
                        "signature verified with a resolved credential"
                    );
                    return Ok(TrustDecision::trusted_reason(format!(
                        "signature verified with the credential resolved for {}",
                        candidate.entity_id.as_deref().unwrap_or("<unknown>")
                    )));
                }
                VerifyOutcome::Invalid => continue,
                VerifyOutcome::UnsupportedAlgorithm => {
                    // The algorithm is the same for every candidate; no
                    // point trying the rest.
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
        }

        Ok(TrustDecision::denied_reason(
            "signature did not verify under any resolved credential",
        ))
    }
}

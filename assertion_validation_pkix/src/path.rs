// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Certificate path construction and validation.
//!
//! Paths are built from a presented end-entity certificate toward a trust
//! anchor by issuer/subject chaining, verifying each link signature.
//! Failures are collected as reasons so the engine can report why no path
//! closed; only malformed presented or configured material is an error.

use crate::info::PkixValidationInfo;
use chrono::{DateTime, Utc};
use sha1::{Digest as _, Sha1};
use thiserror::Error;
use x509_parser::prelude::*;

/// Failures parsing the material involved in path validation.
#[derive(Debug, Error)]
pub enum PkixError {
    /// The presented end-entity certificate could not be parsed.
    #[error("end-entity certificate parse failed: {0}")]
    EndEntityParse(String),

    /// A configured trust anchor could not be parsed.
    #[error("trust anchor parse failed: {0}")]
    AnchorParse(String),

    /// A configured CRL could not be parsed.
    #[error("crl parse failed: {0}")]
    CrlParse(String),
}

/// Result of one path-validation attempt against one information entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathEvaluation {
    /// A chain closed against a trust anchor.
    Anchored {
        /// Number of certificates in the chain, end-entity included.
        chain_len: usize,
    },
    /// No chain could be built; reasons explain each dead end.
    Unanchored {
        /// Diagnostic reasons collected while attempting the path.
        reasons: Vec<String>,
    },
}

/// SHA-1 thumbprint of a DER certificate, upper-case hex.
///
/// Used only for diagnostics and log correlation.
pub fn thumbprint_sha1_hex(der: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(der);
    hex::encode_upper(hasher.finalize())
}

/// Builds and validates certificate paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct PkixPathValidator;

impl PkixPathValidator {
    /// Attempts to build a path from `end_entity` to one of the anchors in
    /// `info`, using `intermediates` as link candidates, at instant `at`.
    ///
    /// Every chain element must be inside its validity window and absent
    /// from any applicable CRL; each link signature is verified against
    /// the issuer's key. `info.max_path_depth` bounds the number of
    /// intermediates considered.
    pub fn validate<'a>(
        &self,
        end_entity: &'a [u8],
        intermediates: &'a [Vec<u8>],
        info: &PkixValidationInfo,
        at: DateTime<Utc>,
    ) -> Result<PathEvaluation, PkixError> {
        let mut anchors = Vec::with_capacity(info.trust_anchors.len());
        for der in &info.trust_anchors {
            let (_, anchor) = X509Certificate::from_der(der)
                .map_err(|e| PkixError::AnchorParse(e.to_string()))?;
            anchors.push(anchor);
        }

        let mut crls = Vec::with_capacity(info.crls.len());
        for der in &info.crls {
            let (_, crl) = CertificateRevocationList::from_der(der)
                .map_err(|e| PkixError::CrlParse(e.to_string()))?;
            crls.push(crl);
        }

        // A presented certificate that *is* an anchor is trusted directly.
        if info.trust_anchors.iter().any(|a| a.as_slice() == end_entity) {
            return Ok(PathEvaluation::Anchored { chain_len: 1 });
        }

        let mut reasons = Vec::new();
        let mut current: &'a [u8] = end_entity;
        let mut seen: Vec<&'a [u8]> = vec![end_entity];

        loop {
            let chain_len = seen.len();
            let cert = match X509Certificate::from_der(current) {
                Ok((_, cert)) => cert,
                Err(e) if chain_len == 1 => {
                    return Err(PkixError::EndEntityParse(e.to_string()));
                }
                Err(e) => {
                    reasons.push(format!("chain element {} parse failed: {e}", chain_len - 1));
                    return Ok(PathEvaluation::Unanchored { reasons });
                }
            };

            if cert.validity().not_before.timestamp() > at.timestamp() {
                reasons.push(format!(
                    "certificate {} is not yet valid at the validation instant",
                    cert.subject()
                ));
                return Ok(PathEvaluation::Unanchored { reasons });
            }
            if cert.validity().not_after.timestamp() < at.timestamp() {
                reasons.push(format!(
                    "certificate {} has expired at the validation instant",
                    cert.subject()
                ));
                return Ok(PathEvaluation::Unanchored { reasons });
            }

            for crl in &crls {
                if crl.issuer().as_raw() != cert.issuer().as_raw() {
                    continue;
                }
                if crl
                    .iter_revoked_certificates()
                    .any(|revoked| revoked.raw_serial() == cert.raw_serial())
                {
                    reasons.push(format!(
                        "certificate {} (serial {}) is listed in a supplied CRL",
                        cert.subject(),
                        hex::encode_upper(cert.raw_serial())
                    ));
                    return Ok(PathEvaluation::Unanchored { reasons });
                }
            }

            for anchor in &anchors {
                if anchor.subject().as_raw() != cert.issuer().as_raw() {
                    continue;
                }
                if cert.verify_signature(Some(anchor.public_key())).is_ok() {
                    return Ok(PathEvaluation::Anchored {
                        chain_len: seen.len(),
                    });
                }
                reasons.push(format!(
                    "signature of {} did not verify under candidate anchor {}",
                    cert.subject(),
                    anchor.subject()
                ));
            }

            if cert.subject().as_raw() == cert.issuer().as_raw() {
                reasons.push(format!(
                    "path terminates at self-signed certificate {} which is not a trust anchor",
                    cert.subject()
                ));
                return Ok(PathEvaluation::Unanchored { reasons });
            }

            if seen.len() > info.max_path_depth as usize {
                reasons.push(format!(
                    "maximum path depth of {} intermediates exceeded",
                    info.max_path_depth
                ));
                return Ok(PathEvaluation::Unanchored { reasons });
            }

            let mut next: Option<&'a [u8]> = None;
            for candidate in intermediates {
                if seen.iter().any(|s| *s == candidate.as_slice()) {
                    continue;
                }
                let Ok((_, candidate_cert)) = X509Certificate::from_der(candidate) else {
                    reasons.push(format!(
                        "skipping unparseable intermediate ({})",
                        thumbprint_sha1_hex(candidate)
                    ));
                    continue;
                };
                if candidate_cert.subject().as_raw() == cert.issuer().as_raw()
                    && cert.verify_signature(Some(candidate_cert.public_key())).is_ok()
                {
                    next = Some(candidate.as_slice());
                    break;
                }
            }

            match next {
                Some(der) => {
                    seen.push(der);
                    current = der;
                }
                None => {
                    reasons.push(format!("no issuer found for {}", cert.subject()));
                    return Ok(PathEvaluation::Unanchored { reasons });
                }
            }
        }
    }
}

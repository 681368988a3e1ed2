// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Signature verification seam.
//!
//! Trust engines decide *which* key and algorithm are authorized; the
//! verify math itself is delegated here. The built-in implementation maps
//! XML-DSig algorithm URIs onto `ring` verification algorithms.

use crate::error::TrustError;
use ring::signature::{self, UnparsedPublicKey, VerificationAlgorithm};
use x509_parser::prelude::FromDer;
use x509_parser::x509::SubjectPublicKeyInfo;

/// Signature algorithm URIs understood by the built-in verifier.
pub mod algorithm {
    pub const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
    pub const RSA_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384";
    pub const RSA_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512";
    pub const ECDSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256";
    pub const ECDSA_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha384";
    pub const ED25519: &str = "http://www.w3.org/2021/04/xmldsig-more#eddsa-ed25519";
}

/// Outcome of one verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Signature verifies under the supplied key.
    Valid,
    /// Signature does not verify under the supplied key.
    Invalid,
    /// The declared algorithm URI is not supported by this verifier.
    UnsupportedAlgorithm,
}

/// Verifies a signature over raw bytes with a supplied public key.
pub trait SignatureVerifier: Send + Sync {
    /// Verify `signature` over `data` using the DER `SubjectPublicKeyInfo`
    /// and the declared algorithm URI.
    ///
    /// An unsupported algorithm is an outcome, not an error; `Err` is
    /// reserved for malformed key material.
    fn verify(
        &self,
        algorithm_uri: &str,
        spki_der: &[u8],
        data: &[u8],
        signature: &[u8],
    ) -> Result<VerifyOutcome, TrustError>;
}

/// `ring`-backed verifier for the XML-DSig algorithm URIs in [`algorithm`].
///
/// ECDSA signatures are expected in the raw `r || s` form XML-DSig uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct RingSignatureVerifier;

impl SignatureVerifier for RingSignatureVerifier {
    fn verify(
        &self,
        algorithm_uri: &str,
        spki_der: &[u8],
        data: &[u8],
        signature: &[u8],
    ) -> Result<VerifyOutcome, TrustError> {
        let alg: &'static dyn VerificationAlgorithm = match algorithm_uri {
            algorithm::RSA_SHA256 => &signature::RSA_PKCS1_2048_8192_SHA256,
            algorithm::RSA_SHA384 => &signature::RSA_PKCS1_2048_8192_SHA384,
            algorithm::RSA_SHA512 => &signature::RSA_PKCS1_2048_8192_SHA512,
            algorithm::ECDSA_SHA256 => &signature::ECDSA_P256_SHA256_FIXED,
            algorithm::ECDSA_SHA384 => &signature::ECDSA_P384_SHA384_FIXED,
            algorithm::ED25519 => &signature::ED25519,
            _ => return Ok(VerifyOutcome::UnsupportedAlgorithm),
        };

        let key_bits = extract_subject_public_key(spki_der)?;
        let key = UnparsedPublicKey::new(alg, key_bits);
        Ok(match key.verify(data, signature) {
            Ok(()) => VerifyOutcome::Valid,
            Err(_) => VerifyOutcome::Invalid,
        })
    }
}

/// Extracts the raw subject-public-key bits from a DER SPKI.
///
/// `ring` consumes the bit-string contents (PKCS#1 for RSA, uncompressed
/// point for EC, raw key for Ed25519), not the outer SPKI structure.
fn extract_subject_public_key(spki_der: &[u8]) -> Result<Vec<u8>, TrustError> {
    let (_, spki) = SubjectPublicKeyInfo::from_der(spki_der)
        .map_err(|e| TrustError::Verification(format!("spki parse failed: {e}")))?;
    Ok(spki.subject_public_key.data.as_ref().to_vec())
}

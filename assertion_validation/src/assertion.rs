// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Accessor model for parsed assertions.
//!
//! The wire parsing and serialization layer is an external collaborator;
//! it hands the pipeline these plain structs. Nothing here knows about the
//! encoding that carried the assertion.

use assertion_validation_trust::credential::PublicKeyInfo;
use chrono::{DateTime, Utc};

/// Standard confirmation-method URI for bearer confirmation.
pub const CONFIRMATION_METHOD_BEARER: &str = "urn:oasis:names:tc:SAML:2.0:cm:bearer";
/// Standard confirmation-method URI for holder-of-key confirmation.
pub const CONFIRMATION_METHOD_HOLDER_OF_KEY: &str = "urn:oasis:names:tc:SAML:2.0:cm:holder-of-key";

/// A signed, time-bounded statement about a subject.
#[derive(Debug, Clone, Default)]
pub struct Assertion {
    /// Unique assertion identifier.
    pub id: String,
    /// Entity id of the declared issuer.
    pub issuer: String,
    /// Instant the assertion was issued.
    pub issue_instant: Option<DateTime<Utc>>,
    /// Enveloped signature, when the assertion is signed.
    pub signature: Option<Signature>,
    /// Validity conditions, when present.
    pub conditions: Option<Conditions>,
    /// Subject confirmations binding the assertion to its presenter.
    pub subject_confirmations: Vec<SubjectConfirmation>,
    /// Statements carried by the assertion.
    pub statements: Vec<Statement>,
}

/// A signature over the assertion, as produced by the parsing layer.
#[derive(Debug, Clone)]
pub struct Signature {
    /// The canonicalized bytes the signature covers.
    pub signed_bytes: Vec<u8>,
    /// Raw signature value.
    pub signature_bytes: Vec<u8>,
    /// Declared signature algorithm URI.
    pub algorithm_uri: String,
    /// Key material embedded alongside the signature.
    pub key_info: Option<KeyInfo>,
}

/// Key material embedded in a signature or confirmation data.
#[derive(Debug, Clone, Default)]
pub struct KeyInfo {
    /// DER certificates, leaf first.
    pub certificates: Vec<Vec<u8>>,
    /// Bare public key, when present.
    pub public_key: Option<PublicKeyInfo>,
}

/// Conditions bounding an assertion's validity.
#[derive(Debug, Clone, Default)]
pub struct Conditions {
    /// Instant before which the assertion must not be accepted.
    pub not_before: Option<DateTime<Utc>>,
    /// Instant at or after which the assertion has aged out.
    pub not_on_or_after: Option<DateTime<Utc>>,
    /// Audience restrictions; each must be satisfied.
    pub audience_restrictions: Vec<AudienceRestriction>,
}

/// One audience restriction: a set of acceptable relying parties.
#[derive(Debug, Clone, Default)]
pub struct AudienceRestriction {
    /// Audience URIs listed by the restriction.
    pub audiences: Vec<String>,
}

/// How an assertion is bound to its presenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationMethod {
    /// Possession of the assertion is the proof.
    Bearer,
    /// The presenter must prove possession of a key named by the
    /// confirmation data.
    HolderOfKey,
    /// A method this pipeline has no validator for.
    Other(String),
}

impl ConfirmationMethod {
    /// Parses a confirmation-method URI.
    pub fn from_uri(uri: &str) -> Self {
        match uri {
            CONFIRMATION_METHOD_BEARER => ConfirmationMethod::Bearer,
            CONFIRMATION_METHOD_HOLDER_OF_KEY => ConfirmationMethod::HolderOfKey,
            other => ConfirmationMethod::Other(other.to_string()),
        }
    }

    /// The method URI.
    pub fn as_uri(&self) -> &str {
        match self {
            ConfirmationMethod::Bearer => CONFIRMATION_METHOD_BEARER,
            ConfirmationMethod::HolderOfKey => CONFIRMATION_METHOD_HOLDER_OF_KEY,
            ConfirmationMethod::Other(uri) => uri,
        }
    }
}

/// A subject confirmation carried by an assertion.
#[derive(Debug, Clone)]
pub struct SubjectConfirmation {
    /// Confirmation method.
    pub method: ConfirmationMethod,
    /// Constraints on the confirmation, when present.
    pub data: Option<ConfirmationData>,
}

/// Constraints attached to a subject confirmation.
#[derive(Debug, Clone, Default)]
pub struct ConfirmationData {
    /// Instant before which the confirmation must not be accepted.
    pub not_before: Option<DateTime<Utc>>,
    /// Instant at or after which the confirmation has aged out.
    pub not_on_or_after: Option<DateTime<Utc>>,
    /// Endpoint the assertion was meant to be delivered to.
    pub recipient: Option<String>,
    /// Network address the presenter claims to use.
    pub address: Option<String>,
    /// Key material the presenter must hold (holder-of-key).
    pub key_info: Option<KeyInfo>,
}

/// An opaque statement carried by an assertion.
///
/// Statement-specific validation is pluggable; the pipeline only threads
/// statements through registered validators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Statement kind discriminator.
    pub kind: String,
    /// Raw statement content, interpreted by statement validators.
    pub content: String,
}

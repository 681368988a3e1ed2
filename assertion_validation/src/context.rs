// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Per-validation context.
//!
//! A [`ValidationContext`] is created per validation attempt and discarded
//! afterwards. Its static parameters are set once before validation; the
//! dynamic parameters are written by validators as they discover data. The
//! single failure message is overwritten by whichever check last failed.

use assertion_validation_trust::credential::PublicKeyInfo;
use assertion_validation_trust::criteria::CriteriaSet;
use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

/// Static parameter keys consumed by the built-in validators.
///
/// String-keyed for portability across deployments that assemble contexts
/// from external configuration.
pub mod keys {
    /// `bool` — whether an unsigned assertion is automatically invalid.
    pub const SIGNATURE_REQUIRED: &str = "SIGNATURE_REQUIRED";
    /// [`super::ContextValue::Criteria`] — criteria used to select the
    /// signing credential.
    pub const SIGNATURE_VALIDATION_CRITERIA_SET: &str = "SIGNATURE_VALIDATION_CRITERIA_SET";
    /// [`super::ContextValue::Certificate`] — attester certificate for
    /// holder-of-key confirmation.
    pub const SC_HOK_PRESENTER_CERT: &str = "SC_HOK_PRESENTER_CERT";
    /// [`super::ContextValue::PublicKey`] — attester key for holder-of-key
    /// confirmation.
    pub const SC_HOK_PRESENTER_KEY: &str = "SC_HOK_PRESENTER_KEY";
    /// [`super::ContextValue::StringSet`] — acceptable confirmation
    /// recipients.
    pub const SC_VALID_RECIPIENTS: &str = "SC_VALID_RECIPIENTS";
    /// [`super::ContextValue::AddressSet`] — acceptable presenter
    /// addresses.
    pub const SC_VALID_ADDRESSES: &str = "SC_VALID_ADDRESSES";
    /// [`super::ContextValue::StringSet`] — acceptable audiences.
    pub const COND_VALID_AUDIENCES: &str = "COND_VALID_AUDIENCES";
}

/// A typed static parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextValue {
    Bool(bool),
    StringSet(BTreeSet<String>),
    AddressSet(BTreeSet<IpAddr>),
    Criteria(CriteriaSet),
    /// A DER certificate.
    Certificate(Vec<u8>),
    PublicKey(PublicKeyInfo),
}

/// Parameters and scratch state for one validation attempt.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    static_params: BTreeMap<&'static str, ContextValue>,
    dynamic_params: BTreeMap<String, String>,
    failure_message: Option<String>,
}

impl ValidationContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style static parameter insertion.
    pub fn with_static(mut self, key: &'static str, value: ContextValue) -> Self {
        self.set_static(key, value);
        self
    }

    /// Sets a static parameter, replacing any previous value for the key.
    pub fn set_static(&mut self, key: &'static str, value: ContextValue) {
        self.static_params.insert(key, value);
    }

    /// A static boolean parameter, if present and boolean-typed.
    pub fn static_bool(&self, key: &str) -> Option<bool> {
        match self.static_params.get(key) {
            Some(ContextValue::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    /// A static string-set parameter, if present and so typed.
    pub fn static_string_set(&self, key: &str) -> Option<&BTreeSet<String>> {
        match self.static_params.get(key) {
            Some(ContextValue::StringSet(value)) => Some(value),
            _ => None,
        }
    }

    /// A static address-set parameter, if present and so typed.
    pub fn static_address_set(&self, key: &str) -> Option<&BTreeSet<IpAddr>> {
        match self.static_params.get(key) {
            Some(ContextValue::AddressSet(value)) => Some(value),
            _ => None,
        }
    }

    /// A static criteria-set parameter, if present and so typed.
    pub fn static_criteria(&self, key: &str) -> Option<&CriteriaSet> {
        match self.static_params.get(key) {
            Some(ContextValue::Criteria(value)) => Some(value),
            _ => None,
        }
    }

    /// A static certificate parameter, if present and so typed.
    pub fn static_certificate(&self, key: &str) -> Option<&[u8]> {
        match self.static_params.get(key) {
            Some(ContextValue::Certificate(value)) => Some(value.as_slice()),
            _ => None,
        }
    }

    /// A static public-key parameter, if present and so typed.
    pub fn static_public_key(&self, key: &str) -> Option<&PublicKeyInfo> {
        match self.static_params.get(key) {
            Some(ContextValue::PublicKey(value)) => Some(value),
            _ => None,
        }
    }

    /// Records data discovered during validation.
    pub fn set_dynamic(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.dynamic_params.insert(key.into(), value.into());
    }

    /// A dynamic parameter written by an earlier validator.
    pub fn dynamic(&self, key: &str) -> Option<&str> {
        self.dynamic_params.get(key).map(String::as_str)
    }

    /// Records a failure message, overwriting any previous one.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.failure_message = Some(message.into());
    }

    /// The message of the check that last failed, if any.
    pub fn failure_message(&self) -> Option<&str> {
        self.failure_message.as_deref()
    }
}

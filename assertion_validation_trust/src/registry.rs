// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Credential-criteria evaluator registry.
//!
//! Each evaluator is a tri-state predicate over a credential:
//! - `None` — the credential lacks the attribute the criterion examines
//!   (no opinion), e.g. no public key to compare;
//! - `Some(false)` — the attribute is present but mismatches;
//! - `Some(true)` — the attribute matches.
//!
//! The built-in table is registered explicitly at construction; there is no
//! dynamic loading and no global registry instance.

use crate::credential::Credential;
use crate::criteria::{CriteriaSet, Criterion, CriterionKind};
use std::collections::BTreeMap;

/// A tri-state predicate matching one criterion against a credential.
pub type CriteriaEvaluator = fn(&Criterion, &Credential) -> Option<bool>;

/// Maps criterion kinds to their evaluators.
#[derive(Debug, Clone)]
pub struct CredentialCriteriaRegistry {
    evaluators: BTreeMap<CriterionKind, CriteriaEvaluator>,
}

impl Default for CredentialCriteriaRegistry {
    fn default() -> Self {
        Self::with_builtin_evaluators()
    }
}

impl CredentialCriteriaRegistry {
    /// A registry with no evaluators registered.
    pub fn empty() -> Self {
        Self {
            evaluators: BTreeMap::new(),
        }
    }

    /// A registry carrying the built-in evaluator table.
    ///
    /// `TrustedNames` intentionally has no evaluator here: it parametrizes
    /// PKIX name checking rather than credential matching.
    pub fn with_builtin_evaluators() -> Self {
        let mut registry = Self::empty();
        registry.register(CriterionKind::EntityId, evaluate_entity_id);
        registry.register(CriterionKind::Usage, evaluate_usage);
        registry.register(CriterionKind::KeyAlgorithm, evaluate_key_algorithm);
        registry.register(CriterionKind::KeyLength, evaluate_key_length);
        registry.register(CriterionKind::PublicKey, evaluate_public_key);
        registry
    }

    /// Registers (or replaces) the evaluator for a criterion kind.
    pub fn register(&mut self, kind: CriterionKind, evaluator: CriteriaEvaluator) {
        self.evaluators.insert(kind, evaluator);
    }

    /// Evaluates one criterion against a credential.
    ///
    /// Returns `None` when no evaluator is registered for the criterion's
    /// kind, or when the registered evaluator has no opinion.
    pub fn evaluate(&self, criterion: &Criterion, credential: &Credential) -> Option<bool> {
        let evaluator = self.evaluators.get(&criterion.kind())?;
        evaluator(criterion, credential)
    }

    /// Evaluates every criterion in the set against a credential.
    ///
    /// Returns `Some(false)` as soon as any evaluator reports a mismatch,
    /// `Some(true)` when at least one criterion matched and none
    /// mismatched, and `None` when every present criterion had no opinion.
    /// Callers decide whether `None` should be treated conservatively.
    pub fn matches_all(&self, criteria: &CriteriaSet, credential: &Credential) -> Option<bool> {
        let mut any_match = false;
        for criterion in criteria.iter() {
            match self.evaluate(criterion, credential) {
                Some(false) => return Some(false),
                Some(true) => any_match = true,
                None => {}
            }
        }
        if any_match {
            Some(true)
        } else {
            None
        }
    }
}

fn evaluate_entity_id(criterion: &Criterion, credential: &Credential) -> Option<bool> {
    let Criterion::EntityId(expected) = criterion else {
        return None;
    };
    credential.entity_id.as_deref().map(|id| id == expected)
}

fn evaluate_usage(criterion: &Criterion, credential: &Credential) -> Option<bool> {
    let Criterion::Usage(requested) = criterion else {
        return None;
    };
    Some(credential.usage.is_compatible_with(*requested))
}

fn evaluate_key_algorithm(criterion: &Criterion, credential: &Credential) -> Option<bool> {
    let Criterion::KeyAlgorithm(expected) = criterion else {
        return None;
    };
    credential
        .public_key
        .as_ref()
        .map(|key| key.algorithm == *expected)
}

fn evaluate_key_length(criterion: &Criterion, credential: &Credential) -> Option<bool> {
    let Criterion::KeyLength(expected) = criterion else {
        return None;
    };
    credential
        .public_key
        .as_ref()
        .and_then(|key| key.key_length_bits)
        .map(|bits| bits == *expected)
}

fn evaluate_public_key(criterion: &Criterion, credential: &Credential) -> Option<bool> {
    let Criterion::PublicKey(expected) = criterion else {
        return None;
    };
    credential
        .public_key
        .as_ref()
        .map(|key| key.spki_der == *expected)
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Typed selection criteria for candidate credentials.
//!
//! A [`CriteriaSet`] holds at most one [`Criterion`] per kind and combines
//! the present criteria with logical AND. Sets are used both to select
//! candidate credentials from a resolver and to parametrize trust engines
//! (e.g. trusted names for PKIX name checking).

use crate::credential::UsageType;
use std::collections::{BTreeMap, BTreeSet};

/// Discriminant over the finite set of criterion types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CriterionKind {
    EntityId,
    Usage,
    KeyAlgorithm,
    KeyLength,
    PublicKey,
    TrustedNames,
}

/// A typed query predicate over candidate credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Entity the credential must be attributed to.
    EntityId(String),
    /// Usage the credential must be compatible with.
    Usage(UsageType),
    /// Key algorithm name the credential's key must carry.
    KeyAlgorithm(String),
    /// Key length in bits the credential's key must carry.
    KeyLength(u32),
    /// DER `SubjectPublicKeyInfo` the credential's key must equal.
    PublicKey(Vec<u8>),
    /// Names an end-entity certificate must present (PKIX name checking).
    TrustedNames(BTreeSet<String>),
}

impl Criterion {
    /// The kind this criterion belongs to.
    pub fn kind(&self) -> CriterionKind {
        match self {
            Criterion::EntityId(_) => CriterionKind::EntityId,
            Criterion::Usage(_) => CriterionKind::Usage,
            Criterion::KeyAlgorithm(_) => CriterionKind::KeyAlgorithm,
            Criterion::KeyLength(_) => CriterionKind::KeyLength,
            Criterion::PublicKey(_) => CriterionKind::PublicKey,
            Criterion::TrustedNames(_) => CriterionKind::TrustedNames,
        }
    }
}

/// An AND-combination of criteria, keyed by criterion kind.
///
/// Inserting a criterion replaces any previous criterion of the same kind;
/// iteration order is stable but irrelevant to evaluation semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriteriaSet {
    entries: BTreeMap<CriterionKind, Criterion>,
}

impl CriteriaSet {
    /// An empty criteria set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with(mut self, criterion: Criterion) -> Self {
        self.insert(criterion);
        self
    }

    /// Inserts a criterion, returning the criterion of the same kind it
    /// replaced, if any.
    pub fn insert(&mut self, criterion: Criterion) -> Option<Criterion> {
        self.entries.insert(criterion.kind(), criterion)
    }

    /// The criterion of the given kind, if present.
    pub fn get(&self, kind: CriterionKind) -> Option<&Criterion> {
        self.entries.get(&kind)
    }

    /// The entity-id criterion value, if present.
    pub fn entity_id(&self) -> Option<&str> {
        match self.get(CriterionKind::EntityId) {
            Some(Criterion::EntityId(id)) => Some(id.as_str()),
            _ => None,
        }
    }

    /// The usage criterion value, if present.
    pub fn usage(&self) -> Option<UsageType> {
        match self.get(CriterionKind::Usage) {
            Some(Criterion::Usage(usage)) => Some(*usage),
            _ => None,
        }
    }

    /// The trusted-names criterion value, if present.
    pub fn trusted_names(&self) -> Option<&BTreeSet<String>> {
        match self.get(CriterionKind::TrustedNames) {
            Some(Criterion::TrustedNames(names)) => Some(names),
            _ => None,
        }
    }

    /// Iterates over the present criteria.
    pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
        self.entries.values()
    }

    /// Number of criteria present.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no criteria are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

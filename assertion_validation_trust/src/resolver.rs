// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Credential resolution seam.
//!
//! Resolvers are synchronous collaborators invoked in-line; if an
//! implementation is backed by network calls, that latency is the
//! collaborator's concern, not this crate's.

use crate::credential::Credential;
use crate::criteria::CriteriaSet;
use crate::error::TrustError;
use crate::registry::CredentialCriteriaRegistry;

/// Resolves candidate credentials matching a criteria set.
pub trait CredentialResolver: Send + Sync {
    /// Candidate credentials for the given criteria, in resolver-defined
    /// order. An empty result is a valid answer, not an error.
    fn resolve(&self, criteria: &CriteriaSet) -> Result<Vec<Credential>, TrustError>;
}

/// Resolver over a fixed credential collection.
///
/// Candidates are filtered through an evaluator registry: credentials a
/// registered evaluator scores as mismatching are dropped, while
/// no-opinion credentials are kept for the caller to judge.
pub struct StaticCredentialResolver {
    credentials: Vec<Credential>,
    registry: CredentialCriteriaRegistry,
}

impl StaticCredentialResolver {
    /// Resolver over the given credentials with the built-in evaluators.
    pub fn new(credentials: Vec<Credential>) -> Self {
        Self {
            credentials,
            registry: CredentialCriteriaRegistry::with_builtin_evaluators(),
        }
    }

    /// Replaces the evaluator registry used for filtering.
    pub fn with_registry(mut self, registry: CredentialCriteriaRegistry) -> Self {
        self.registry = registry;
        self
    }
}

impl CredentialResolver for StaticCredentialResolver {
    fn resolve(&self, criteria: &CriteriaSet) -> Result<Vec<Credential>, TrustError> {
        Ok(self
            .credentials
            .iter()
            .filter(|credential| self.registry.matches_all(criteria, credential) != Some(false))
            .cloned()
            .collect())
    }
}

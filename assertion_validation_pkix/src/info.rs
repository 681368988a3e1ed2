// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! PKIX validation information and its resolution seam.

use assertion_validation_trust::criteria::CriteriaSet;
use assertion_validation_trust::error::TrustError;
use std::collections::BTreeSet;

/// Default bound on the number of intermediate certificates in a path.
pub const DEFAULT_MAX_PATH_DEPTH: u32 = 5;

/// Anchors and revocation data for one path-validation attempt.
///
/// Supplied per validation call by a resolver; the engine does not cache
/// it. Anchor certificates are treated as roots and are not themselves
/// validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkixValidationInfo {
    /// DER trust-anchor certificates.
    pub trust_anchors: Vec<Vec<u8>>,
    /// DER certificate revocation lists, possibly empty.
    pub crls: Vec<Vec<u8>>,
    /// Maximum number of intermediate certificates allowed in a path.
    pub max_path_depth: u32,
}

impl PkixValidationInfo {
    /// Validation information over the given anchors with the default
    /// path depth and no CRLs.
    pub fn new(trust_anchors: Vec<Vec<u8>>) -> Self {
        Self {
            trust_anchors,
            crls: Vec::new(),
            max_path_depth: DEFAULT_MAX_PATH_DEPTH,
        }
    }

    /// Attaches revocation lists.
    pub fn with_crls(mut self, crls: Vec<Vec<u8>>) -> Self {
        self.crls = crls;
        self
    }

    /// Overrides the maximum path depth.
    pub fn with_max_path_depth(mut self, depth: u32) -> Self {
        self.max_path_depth = depth;
        self
    }
}

/// Resolves PKIX validation information and trusted names for a request.
pub trait PkixValidationInfoResolver: Send + Sync {
    /// Validation information entries, tried in order by the engine.
    fn resolve(&self, criteria: &CriteriaSet) -> Result<Vec<PkixValidationInfo>, TrustError>;

    /// Statically configured trusted names for the request.
    ///
    /// The engine unions these with any trusted-names criterion present in
    /// the criteria set.
    fn resolve_trusted_names(&self, criteria: &CriteriaSet) -> Result<BTreeSet<String>, TrustError>;
}

/// Resolver over fixed validation information and trusted names.
#[derive(Debug, Clone, Default)]
pub struct StaticPkixValidationInfoResolver {
    infos: Vec<PkixValidationInfo>,
    trusted_names: BTreeSet<String>,
}

impl StaticPkixValidationInfoResolver {
    /// Resolver returning the given entries for every request.
    pub fn new(infos: Vec<PkixValidationInfo>) -> Self {
        Self {
            infos,
            trusted_names: BTreeSet::new(),
        }
    }

    /// Sets the statically configured trusted names.
    pub fn with_trusted_names(mut self, names: BTreeSet<String>) -> Self {
        self.trusted_names = names;
        self
    }
}

impl PkixValidationInfoResolver for StaticPkixValidationInfoResolver {
    fn resolve(&self, _criteria: &CriteriaSet) -> Result<Vec<PkixValidationInfo>, TrustError> {
        Ok(self.infos.clone())
    }

    fn resolve_trusted_names(
        &self,
        _criteria: &CriteriaSet,
    ) -> Result<BTreeSet<String>, TrustError> {
        Ok(self.trusted_names.clone())
    }
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// Infrastructure failures during trust evaluation.
///
/// Policy outcomes (untrusted material, mismatched criteria) are reported
/// through [`crate::decision::TrustDecision`], never through this type.
#[derive(Debug, Error)]
pub enum TrustError {
    /// The injected resolver collaborator failed.
    #[error("credential resolution failed: {0}")]
    Resolution(String),

    /// Verification infrastructure failed (e.g. malformed configured key
    /// material). Distinct from a signature that simply does not verify.
    #[error("signature verification failed: {0}")]
    Verification(String),
}

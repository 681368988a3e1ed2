// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! PKIX certificate-path trust evaluation.
//!
//! Where the explicit-key engine trusts exactly the keys its resolver
//! returns, the [`engine::PkixTrustEngine`] builds a certificate path from
//! a presented end-entity certificate to a configured trust anchor,
//! honoring a maximum path depth and any supplied CRLs, and optionally
//! requires the end-entity's names to intersect a trusted-name set.
//!
//! Revocation data is consumed, never fetched; resolvers supply
//! [`info::PkixValidationInfo`] per validation call.

pub mod engine;
pub mod info;
pub mod names;
pub mod path;

pub use engine::{PkixTrustEngine, PkixTrustOptions};
pub use info::{PkixValidationInfo, PkixValidationInfoResolver, StaticPkixValidationInfoResolver};
pub use path::{PathEvaluation, PkixError, PkixPathValidator};

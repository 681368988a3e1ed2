// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Trust evaluation engine for federated-identity assertions.
//!
//! This crate models "trust" as an explicit decision over presented key
//! material: a [`engine::TrustEngine`] resolves candidate [`credential`]s
//! through an injected [`resolver`], narrows them with a typed
//! [`criteria`] set, and decides whether a token or signature may be
//! trusted.
//!
//! Cryptographic signature-verify math is delegated to a
//! [`verify::SignatureVerifier`]; the engine only decides *which* key and
//! algorithm are authorized.

pub mod clock;
pub mod credential;
pub mod criteria;
pub mod decision;
pub mod engine;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod verify;

pub use clock::{Clock, SystemClock};
pub use credential::{Credential, PublicKeyInfo, UsageType};
pub use criteria::{CriteriaSet, Criterion, CriterionKind};
pub use decision::TrustDecision;
pub use engine::{ExplicitKeyTrustEngine, SignatureToken, TrustEngine};
pub use error::TrustError;
pub use registry::CredentialCriteriaRegistry;
pub use resolver::{CredentialResolver, StaticCredentialResolver};
pub use verify::{RingSignatureVerifier, SignatureVerifier, VerifyOutcome};

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Credentials: key material attributed to an entity.
//!
//! Credentials are supplied per validation call by a
//! [`crate::resolver::CredentialResolver`] and are only borrowed by trust
//! engines and validators; the core never caches them.

/// Intended use of a credential's key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UsageType {
    /// Key is used to produce signatures.
    Signing,
    /// Key is used for encryption.
    Encryption,
    /// No usage was declared.
    Unspecified,
}

impl Default for UsageType {
    fn default() -> Self {
        Self::Unspecified
    }
}

impl UsageType {
    /// Whether a credential carrying this usage may satisfy a request for
    /// `requested`. `Unspecified` on either side matches anything.
    pub fn is_compatible_with(self, requested: UsageType) -> bool {
        self == UsageType::Unspecified || requested == UsageType::Unspecified || self == requested
    }
}

/// Public key material in `SubjectPublicKeyInfo` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyInfo {
    /// Key algorithm name (e.g. "RSA", "EC", "Ed25519").
    pub algorithm: String,
    /// Modulus/curve size in bits, when known.
    pub key_length_bits: Option<u32>,
    /// DER-encoded `SubjectPublicKeyInfo`.
    pub spki_der: Vec<u8>,
}

impl PublicKeyInfo {
    /// Key info with a known algorithm and SPKI, no declared length.
    pub fn new(algorithm: impl Into<String>, spki_der: Vec<u8>) -> Self {
        Self {
            algorithm: algorithm.into(),
            key_length_bits: None,
            spki_der,
        }
    }

    /// Sets the declared key length in bits.
    pub fn with_key_length_bits(mut self, bits: u32) -> Self {
        self.key_length_bits = Some(bits);
        self
    }
}

/// Key material attributed to an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    /// Entity the key material belongs to, when known.
    pub entity_id: Option<String>,
    /// Declared usage of the key material.
    pub usage: UsageType,
    /// Public key, when available.
    pub public_key: Option<PublicKeyInfo>,
    /// DER certificate chain, leaf first. Empty when no certificates are
    /// attached.
    pub certificate_chain: Vec<Vec<u8>>,
    /// Symmetric key material, when available.
    pub secret_key: Option<Vec<u8>>,
}

impl Credential {
    /// Credential attributed to `entity_id` with no key material yet.
    pub fn for_entity(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: Some(entity_id.into()),
            ..Self::default()
        }
    }

    /// Sets the declared usage.
    pub fn with_usage(mut self, usage: UsageType) -> Self {
        self.usage = usage;
        self
    }

    /// Attaches a public key.
    pub fn with_public_key(mut self, key: PublicKeyInfo) -> Self {
        self.public_key = Some(key);
        self
    }

    /// Attaches a DER certificate chain, leaf first.
    pub fn with_certificate_chain(mut self, chain: Vec<Vec<u8>>) -> Self {
        self.certificate_chain = chain;
        self
    }

    /// Attaches symmetric key material.
    pub fn with_secret_key(mut self, key: Vec<u8>) -> Self {
        self.secret_key = Some(key);
        self
    }

    /// The leaf (end-entity) certificate of the chain, when present.
    pub fn leaf_certificate(&self) -> Option<&[u8]> {
        self.certificate_chain.first().map(Vec::as_slice)
    }
}

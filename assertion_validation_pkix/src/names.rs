// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Trusted-name extraction and matching.
//!
//! The names presented by an end-entity certificate are its full subject
//! DN, its common-name values, and its subject-alternative-names. A
//! certificate satisfies a trusted-name set when the two intersect.

use crate::path::PkixError;
use std::collections::BTreeSet;
use std::net::IpAddr;
use x509_parser::prelude::*;

/// Names presented by an end-entity certificate.
pub fn candidate_names(cert_der: &[u8]) -> Result<BTreeSet<String>, PkixError> {
    let (_, cert) =
        X509Certificate::from_der(cert_der).map_err(|e| PkixError::EndEntityParse(e.to_string()))?;

    let mut names = BTreeSet::new();
    names.insert(cert.subject().to_string());

    for attribute in cert.subject().iter_common_name() {
        if let Ok(value) = attribute.as_str() {
            names.insert(value.to_string());
        }
    }

    if let Ok(Some(san)) = cert.subject_alternative_name() {
        for general_name in &san.value.general_names {
            match general_name {
                GeneralName::DNSName(name) => {
                    names.insert((*name).to_string());
                }
                GeneralName::RFC822Name(name) => {
                    names.insert((*name).to_string());
                }
                GeneralName::URI(name) => {
                    names.insert((*name).to_string());
                }
                GeneralName::IPAddress(bytes) => {
                    if let Some(address) = ip_from_bytes(bytes) {
                        names.insert(address.to_string());
                    }
                }
                _ => {}
            }
        }
    }

    Ok(names)
}

/// True when the presented names intersect the trusted set.
pub fn matches_trusted_names(presented: &BTreeSet<String>, trusted: &BTreeSet<String>) -> bool {
    !presented.is_disjoint(trusted)
}

fn ip_from_bytes(bytes: &[u8]) -> Option<IpAddr> {
    match bytes.len() {
        4 => {
            let octets: [u8; 4] = bytes.try_into().ok()?;
            Some(IpAddr::from(octets))
        }
        16 => {
            let octets: [u8; 16] = bytes.try_into().ok()?;
            Some(IpAddr::from(octets))
        }
        _ => None,
    }
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Host address resolution seam.
//!
//! Confirmation-address checking needs to turn a claimed address into host
//! addresses. Resolution is a collaborator concern: the pipeline itself
//! never performs network I/O, and a resolution failure is an
//! indeterminate outcome for the caller, not a policy violation.

use std::collections::BTreeSet;
use std::net::{IpAddr, ToSocketAddrs};
use thiserror::Error;

/// Failure to resolve a claimed address.
#[derive(Debug, Error)]
pub enum AddressResolutionError {
    /// The claimed address is not an address literal and the resolver does
    /// not perform lookups.
    #[error("not an address literal: {0}")]
    NotALiteral(String),

    /// A host lookup failed.
    #[error("host lookup failed for {host}: {message}")]
    Lookup {
        /// Host the lookup was attempted for.
        host: String,
        /// Underlying failure description.
        message: String,
    },
}

/// Resolves a claimed address to the set of host addresses it names.
pub trait HostAddressResolver: Send + Sync {
    /// The host addresses for `host`.
    fn resolve(&self, host: &str) -> Result<BTreeSet<IpAddr>, AddressResolutionError>;
}

/// Resolver accepting only IP literals.
///
/// The safe default: no lookups, no blocking.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralAddressResolver;

impl HostAddressResolver for LiteralAddressResolver {
    fn resolve(&self, host: &str) -> Result<BTreeSet<IpAddr>, AddressResolutionError> {
        host.parse::<IpAddr>()
            .map(|address| BTreeSet::from([address]))
            .map_err(|_| AddressResolutionError::NotALiteral(host.to_string()))
    }
}

/// Resolver performing a blocking system lookup.
///
/// The lookup latency is this collaborator's concern; inject it only where
/// blocking is acceptable.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDnsResolver;

impl HostAddressResolver for SystemDnsResolver {
    fn resolve(&self, host: &str) -> Result<BTreeSet<IpAddr>, AddressResolutionError> {
        if let Ok(address) = host.parse::<IpAddr>() {
            return Ok(BTreeSet::from([address]));
        }
        let addresses = (host, 0)
            .to_socket_addrs()
            .map_err(|e| AddressResolutionError::Lookup {
                host: host.to_string(),
                message: e.to_string(),
            })?
            .map(|socket| socket.ip())
            .collect::<BTreeSet<_>>();
        if addresses.is_empty() {
            return Err(AddressResolutionError::Lookup {
                host: host.to_string(),
                message: "lookup returned no addresses".to_string(),
            });
        }
        Ok(addresses)
    }
}

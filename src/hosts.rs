//! Local host introspection.
//!
//! Localhost server certificates embed the machine's DNS name and its
//! non-loopback IPv4 addresses as subject alternative names. This module
//! gathers that data so the template builder itself stays free of I/O.

use crate::error::Result;
use std::net::{IpAddr, Ipv4Addr};

/// The host data embedded in a localhost server certificate.
#[derive(Debug, Clone)]
pub struct LocalHost {
    /// DNS name for the host: the configured override, or the machine's
    /// hostname.
    pub dns_name: String,
    /// Every non-loopback IPv4 address bound to a local interface.
    pub addresses: Vec<Ipv4Addr>,
}

/// Resolve the local host's DNS name and interface addresses.
///
/// `override_name`, when set and non-empty, replaces the machine hostname
/// (see [`crate::config::LOCALHOST_DNS_ENV`]).
pub fn resolve_local_host(override_name: Option<&str>) -> Result<LocalHost> {
    let dns_name = match override_name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => hostname::get()?.to_string_lossy().into_owned(),
    };

    let mut addresses = Vec::new();
    for interface in if_addrs::get_if_addrs()? {
        if interface.is_loopback() {
            continue;
        }
        if let IpAddr::V4(addr) = interface.ip() {
            addresses.push(addr);
        }
    }

    Ok(LocalHost {
        dns_name,
        addresses,
    })
}

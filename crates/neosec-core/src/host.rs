// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`Host`]: a discovered machine and the ports found on it.

use crate::port::{Port, Protocol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A host discovered during a scan, with its probed ports keyed by
/// `(number, protocol)` so duplicates from repeated probes collapse instead
/// of accumulating.
///
/// Ports are owned exclusively here; a [`Port`] carries no back-reference to
/// its [`Host`], so callers that need host context carry it explicitly
/// alongside the port (e.g. in a [`crate::Vulnerability::affected`] field).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    /// IP address (or resolved address) of the host.
    pub address: String,
    /// Reverse-resolved hostname, if any.
    pub hostname: Option<String>,
    /// Detected OS fingerprint, if any.
    pub os_fingerprint: Option<String>,
    ports: BTreeMap<(u16, Protocol), Port>,
}

impl Host {
    /// Construct a host with no ports yet.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            hostname: None,
            os_fingerprint: None,
            ports: BTreeMap::new(),
        }
    }

    /// Insert or replace a port by its `(number, protocol)` key.
    ///
    /// Returns the prior entry, if one existed for that key.
    pub fn upsert_port(&mut self, port: Port) -> Option<Port> {
        self.ports.insert(port.key(), port)
    }

    /// Iterate over the host's ports in `(number, protocol)` order.
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.values()
    }

    /// Number of distinct ports recorded for this host.
    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    /// Look up a port by its identity.
    pub fn port(&self, number: u16, protocol: Protocol) -> Option<&Port> {
        self.ports.get(&(number, protocol))
    }

    /// Merge another host's fields and ports into `self`.
    ///
    /// Used when the same host is rediscovered by a later task in the
    /// workflow; the incoming host's non-empty fields win, and its ports
    /// overwrite ours by key.
    pub fn merge(&mut self, other: Host) {
        if self.hostname.is_none() {
            self.hostname = other.hostname;
        }
        if self.os_fingerprint.is_none() {
            self.os_fingerprint = other.os_fingerprint;
        }
        for (key, port) in other.ports {
            self.ports.insert(key, port);
        }
    }
}

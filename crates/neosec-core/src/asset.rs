// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`Asset`]: the per-task discovery bundle, and its merge into a run-level
//! aggregate.

use crate::host::Host;
use crate::subdomain::Subdomain;
use crate::webapp::WebApp;
use serde::{Deserialize, Serialize};

/// A bundle of zero or more [`Host`]s, [`WebApp`]s, and [`Subdomain`]s
/// discovered by one task.
///
/// An adapter's `parse_output` returns one `Asset` per invocation; the
/// scheduler folds it into the run's aggregate via [`Asset::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Discovered hosts, keyed by address for merge purposes.
    pub hosts: Vec<Host>,
    /// Discovered web applications.
    pub webapps: Vec<WebApp>,
    /// Discovered subdomains.
    pub subdomains: Vec<Subdomain>,
}

impl Asset {
    /// An empty asset bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if this bundle carries no discoveries at all.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.webapps.is_empty() && self.subdomains.is_empty()
    }

    /// Merge `other` into `self`.
    ///
    /// Hosts with a matching `address` are merged field-by-field via
    /// [`Host::merge`]; everything else is appended. This is the single
    /// mutation point the scheduler's aggregation buffer calls, so it stays
    /// a pure, deterministic function of its two inputs.
    pub fn merge(&mut self, other: Asset) {
        for incoming in other.hosts {
            if let Some(existing) = self
                .hosts
                .iter_mut()
                .find(|h| h.address == incoming.address)
            {
                existing.merge(incoming);
            } else {
                self.hosts.push(incoming);
            }
        }
        self.webapps.extend(other.webapps);
        self.subdomains.extend(other.subdomains);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{Port, PortState, Protocol};

    #[test]
    fn merge_combines_hosts_with_same_address() {
        let mut a = Asset::new();
        let mut h1 = Host::new("10.0.0.1");
        h1.upsert_port(Port::new(22, Protocol::Tcp, PortState::Open));
        a.hosts.push(h1);

        let mut b = Asset::new();
        let mut h2 = Host::new("10.0.0.1");
        h2.upsert_port(Port::new(80, Protocol::Tcp, PortState::Open));
        b.hosts.push(h2);

        a.merge(b);
        assert_eq!(a.hosts.len(), 1);
        assert_eq!(a.hosts[0].port_count(), 2);
    }

    #[test]
    fn merge_appends_distinct_hosts() {
        let mut a = Asset::new();
        a.hosts.push(Host::new("10.0.0.1"));
        let mut b = Asset::new();
        b.hosts.push(Host::new("10.0.0.2"));
        a.merge(b);
        assert_eq!(a.hosts.len(), 2);
    }

    #[test]
    fn merge_appends_webapps_and_subdomains() {
        let mut a = Asset::new();
        let mut b = Asset::new();
        b.webapps.push(WebApp::new("https://a.example"));
        b.subdomains.push(Subdomain::new("www.example.com"));
        a.merge(b);
        assert_eq!(a.webapps.len(), 1);
        assert_eq!(a.subdomains.len(), 1);
    }

    #[test]
    fn empty_asset_is_empty() {
        assert!(Asset::new().is_empty());
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`Vulnerability`]: the second normalized output entity family, independent
//! of which tool produced it.

use crate::cvss::Cvss;
use crate::severity::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Broad class of finding a [`Vulnerability`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VulnerabilityCategory {
    /// Network/service-level misconfiguration or weakness.
    Network,
    /// Web application weakness (injection, auth, etc).
    WebApplication,
    /// Outdated or vulnerable software version.
    OutdatedSoftware,
    /// Weak or default credentials.
    Credentials,
    /// TLS/SSL configuration weakness.
    Tls,
    /// Anything not covered by the above.
    Other,
}

/// The asset a [`Vulnerability`] was observed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Affected {
    /// A host address, with the port the finding relates to (if any).
    Host {
        /// Host address.
        address: String,
        /// Port number, if the finding is port-specific.
        port: Option<u16>,
    },
    /// A web application URL.
    Url {
        /// URL the finding relates to.
        url: String,
    },
}

/// A normalized vulnerability finding, independent of which tool produced
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    /// Stable identifier (adapter-assigned; stable across re-runs of the same
    /// input so downstream diffing works).
    pub id: String,
    /// Short human-readable name.
    pub name: String,
    /// Longer description of the finding.
    pub description: String,
    /// Normalized severity.
    pub severity: Severity,
    /// Optional CVSS rating.
    pub cvss: Option<Cvss>,
    /// Associated CVE identifiers, if any.
    pub cve: Vec<String>,
    /// Broad category.
    pub category: VulnerabilityCategory,
    /// The host or URL this finding was observed on.
    pub affected: Affected,
    /// Raw tool output supporting the finding, kept for forensics.
    pub evidence: String,
    /// Wall-clock time the finding was produced.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affected_host_serde_roundtrip() {
        let a = Affected::Host {
            address: "10.0.0.1".into(),
            port: Some(443),
        };
        let json = serde_json::to_string(&a).unwrap();
        let back: Affected = serde_json::from_str(&json).unwrap();
        assert_eq!(a, back);
    }

    #[test]
    fn vulnerability_serde_roundtrip() {
        let v = Vulnerability {
            id: "NEOSEC-0001".into(),
            name: "Outdated OpenSSH".into(),
            description: "OpenSSH 7.2 has known CVEs".into(),
            severity: Severity::High,
            cvss: None,
            cve: vec!["CVE-2016-0777".into()],
            category: VulnerabilityCategory::OutdatedSoftware,
            affected: Affected::Host {
                address: "10.0.0.1".into(),
                port: Some(22),
            },
            evidence: "SSH-2.0-OpenSSH_7.2".into(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&v).unwrap();
        let back: Vulnerability = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}

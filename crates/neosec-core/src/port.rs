// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`Port`] and its enums, owned exclusively inside a [`crate::Host`].

use serde::{Deserialize, Serialize};

/// Transport-layer protocol a port was probed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Transmission Control Protocol.
    Tcp,
    /// User Datagram Protocol.
    Udp,
}

/// Observed state of a probed port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    /// A service is listening and accepting connections.
    Open,
    /// The port actively refused the connection.
    Closed,
    /// No response was observed (likely firewalled).
    Filtered,
}

/// A single probed port on a [`crate::Host`].
///
/// Ports within a host are unique by `(number, protocol)`; see
/// [`crate::Host::upsert_port`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Port number, 1-65535.
    pub number: u16,
    /// Transport protocol.
    pub protocol: Protocol,
    /// Observed state.
    pub state: PortState,
    /// Detected service name (e.g. `"ssh"`), if any.
    pub service: Option<String>,
    /// Detected product/version string (e.g. `"OpenSSH 9.6"`), if any.
    pub product_version: Option<String>,
}

impl Port {
    /// Construct a port with only the required fields populated.
    pub fn new(number: u16, protocol: Protocol, state: PortState) -> Self {
        Self {
            number,
            protocol,
            state,
            service: None,
            product_version: None,
        }
    }

    /// The `(number, protocol)` identity used for host-level uniqueness.
    pub fn key(&self) -> (u16, Protocol) {
        (self.number, self.protocol)
    }

    /// Builder-style setter for the detected service name.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Builder-style setter for the detected product/version string.
    #[must_use]
    pub fn with_product_version(mut self, product_version: impl Into<String>) -> Self {
        self.product_version = Some(product_version.into());
        self
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`Subdomain`]: a discovered DNS name and its resolved addresses.

use serde::{Deserialize, Serialize};

/// A subdomain discovered by a recon task, together with whatever addresses
/// it resolved to at discovery time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subdomain {
    /// Fully-qualified domain name.
    pub name: String,
    /// Addresses the name resolved to.
    pub addresses: Vec<String>,
}

impl Subdomain {
    /// Construct a subdomain with no resolved addresses yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            addresses: Vec::new(),
        }
    }
}

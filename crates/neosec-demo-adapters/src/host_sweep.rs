// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`HostSweepAdapter`]: a `recon`-category adapter that probes a target and
//! reports which hosts are up.

use neosec_core::{
    reject_shell_metacharacters, Adapter, Asset, FormatHint, Host, OptionValue, ParsedResult,
    Target, ToolCategory, ToolDescriptor,
};
use neosec_error::{ErrorCode, NeoSecError};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// One line of this adapter's output format:
///
/// ```text
/// Host: 10.0.0.1 (scanme.example.com) Status: Up
/// Host: 10.0.0.2 () Status: Down
/// ```
static LINE_PATTERN: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^Host: (?P<addr>\S+) \((?P<hostname>[^)]*)\) Status: (?P<status>Up|Down)$")
        .expect("HostSweepAdapter::LINE_PATTERN is a valid static regex")
});

/// Probes a target with a configurable probe binary (default `/bin/echo`,
/// in production a real `fping`/`nmap -sn`-style binary) and reports which
/// hosts responded.
///
/// Registered under the tool name `"hostsweep"`.
pub struct HostSweepAdapter {
    probe_binary: String,
}

impl Default for HostSweepAdapter {
    fn default() -> Self {
        Self {
            probe_binary: "/bin/echo".to_string(),
        }
    }
}

impl HostSweepAdapter {
    /// Construct an adapter that invokes `probe_binary` instead of the
    /// default `/bin/echo` stand-in.
    pub fn with_probe_binary(probe_binary: impl Into<String>) -> Self {
        Self {
            probe_binary: probe_binary.into(),
        }
    }
}

impl Adapter for HostSweepAdapter {
    fn register(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "hostsweep".to_string(),
            category: ToolCategory::Recon,
            required_binaries: vec![self.probe_binary.clone()],
            default_timeout: None,
        }
    }

    fn build_command(
        &self,
        target: &Target,
        options: &BTreeMap<String, OptionValue>,
    ) -> Result<Vec<String>, NeoSecError> {
        let mut argv = vec![self.probe_binary.clone()];
        for (key, value) in options {
            match key.as_str() {
                "extra_arg" => {
                    let v = value.as_str().ok_or_else(|| {
                        NeoSecError::new(ErrorCode::InvalidInput, "hostsweep: `extra_arg` must be a string")
                    })?;
                    reject_shell_metacharacters(v)?;
                    argv.push(v.to_string());
                }
                other => {
                    return Err(NeoSecError::new(
                        ErrorCode::InvalidInput,
                        format!("hostsweep: unknown option `{other}`"),
                    ));
                }
            }
        }
        argv.push(target.as_str().to_string());
        Ok(argv)
    }

    fn parse_output(
        &self,
        stdout: &[u8],
        _stderr: &[u8],
        _format_hint: FormatHint<'_>,
    ) -> Result<ParsedResult, NeoSecError> {
        let text = String::from_utf8_lossy(stdout);
        let mut assets = Asset::new();
        for line in text.lines() {
            let Some(caps) = LINE_PATTERN.captures(line.trim()) else {
                continue;
            };
            if &caps["status"] != "Up" {
                continue;
            }
            let mut host = Host::new(&caps["addr"]);
            let hostname = caps["hostname"].trim();
            if !hostname.is_empty() {
                host.hostname = Some(hostname.to_string());
            }
            assets.hosts.push(host);
        }
        Ok(ParsedResult {
            assets,
            vulnerabilities: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Target {
        Target::parse("10.0.0.0/24").unwrap()
    }

    #[test]
    fn build_command_places_probe_binary_first_and_target_last() {
        let adapter = HostSweepAdapter::default();
        let argv = adapter.build_command(&target(), &BTreeMap::new()).unwrap();
        assert_eq!(argv[0], "/bin/echo");
        assert_eq!(argv.last().unwrap(), "10.0.0.0/24");
    }

    #[test]
    fn build_command_rejects_unknown_option() {
        let adapter = HostSweepAdapter::default();
        let mut opts = BTreeMap::new();
        opts.insert("bogus".to_string(), OptionValue::Bool(true));
        let err = adapter.build_command(&target(), &opts).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn build_command_rejects_metacharacters_in_extra_arg() {
        let adapter = HostSweepAdapter::default();
        let mut opts = BTreeMap::new();
        opts.insert(
            "extra_arg".to_string(),
            OptionValue::Str("$(whoami)".to_string()),
        );
        let err = adapter.build_command(&target(), &opts).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn parse_output_keeps_only_up_hosts() {
        let adapter = HostSweepAdapter::default();
        let stdout = b"Host: 10.0.0.1 (scanme.example.com) Status: Up\nHost: 10.0.0.2 () Status: Down\n";
        let parsed = adapter.parse_output(stdout, b"", None).unwrap();
        assert_eq!(parsed.assets.hosts.len(), 1);
        assert_eq!(parsed.assets.hosts[0].address, "10.0.0.1");
        assert_eq!(parsed.assets.hosts[0].hostname.as_deref(), Some("scanme.example.com"));
    }

    #[test]
    fn parse_output_ignores_unparseable_lines() {
        let adapter = HostSweepAdapter::default();
        let parsed = adapter.parse_output(b"garbage\n\n", b"", None).unwrap();
        assert!(parsed.assets.is_empty());
    }

    #[test]
    fn registered_tool_name_is_hostsweep() {
        assert_eq!(HostSweepAdapter::default().name(), "hostsweep");
    }
}

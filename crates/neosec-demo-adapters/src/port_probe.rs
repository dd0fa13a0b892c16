// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`PortProbeAdapter`]: a `scanner`-category adapter parsing a simplified
//! `nmap` greppable (`-oG`) line format.

use neosec_core::{
    reject_shell_metacharacters, Adapter, Asset, FormatHint, Host, OptionValue, ParsedResult,
    Port, PortState, Protocol, Target, ToolCategory, ToolDescriptor,
};
use neosec_error::{ErrorCode, NeoSecError};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// One line of this adapter's output format, modeled on `nmap -oG`:
///
/// ```text
/// Host: 10.0.0.1 ()	Ports: 22/open/tcp//ssh//OpenSSH 9.6/, 80/closed/tcp//http///
/// ```
static HOST_LINE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^Host: (?P<addr>\S+) \([^)]*\)\s+Ports: (?P<ports>.+)$")
        .expect("PortProbeAdapter::HOST_LINE is a valid static regex")
});

/// Probes a target's ports with a configurable probe binary (default
/// `/bin/echo`, in production a real `nmap`-style binary) and reports open,
/// closed, and filtered ports per host.
///
/// Registered under the tool name `"portprobe"`.
pub struct PortProbeAdapter {
    probe_binary: String,
}

impl Default for PortProbeAdapter {
    fn default() -> Self {
        Self {
            probe_binary: "/bin/echo".to_string(),
        }
    }
}

impl PortProbeAdapter {
    /// Construct an adapter that invokes `probe_binary` instead of the
    /// default `/bin/echo` stand-in.
    pub fn with_probe_binary(probe_binary: impl Into<String>) -> Self {
        Self {
            probe_binary: probe_binary.into(),
        }
    }
}

fn parse_port_state(s: &str) -> Option<PortState> {
    match s {
        "open" => Some(PortState::Open),
        "closed" => Some(PortState::Closed),
        "filtered" => Some(PortState::Filtered),
        _ => None,
    }
}

fn parse_protocol(s: &str) -> Option<Protocol> {
    match s {
        "tcp" => Some(Protocol::Tcp),
        "udp" => Some(Protocol::Udp),
        _ => None,
    }
}

/// Parse one `number/state/proto/owner/service/rpcinfo/version/` field group
/// (nmap's `-oG` port token shape) into a [`Port`].
fn parse_port_token(token: &str) -> Option<Port> {
    let fields: Vec<&str> = token.trim().split('/').collect();
    if fields.len() < 7 {
        return None;
    }
    let number: u16 = fields[0].parse().ok()?;
    let state = parse_port_state(fields[1])?;
    let protocol = parse_protocol(fields[2])?;
    let mut port = Port::new(number, protocol, state);
    let service = fields[4].trim();
    if !service.is_empty() {
        port.service = Some(service.to_string());
    }
    let version = fields[6].trim();
    if !version.is_empty() {
        port.product_version = Some(version.to_string());
    }
    Some(port)
}

impl Adapter for PortProbeAdapter {
    fn register(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "portprobe".to_string(),
            category: ToolCategory::Scanner,
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
                "ports" => {
                    let v = value.as_str().ok_or_else(|| {
                        NeoSecError::new(ErrorCode::InvalidInput, "portprobe: `ports` must be a string")
                    })?;
                    reject_shell_metacharacters(v)?;
                    argv.push("-p".to_string());
                    argv.push(v.to_string());
                }
                other => {
                    return Err(NeoSecError::new(
                        ErrorCode::InvalidInput,
                        format!("portprobe: unknown option `{other}`"),
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
            let Some(caps) = HOST_LINE.captures(line.trim()) else {
                continue;
            };
            let mut host = Host::new(&caps["addr"]);
            for token in caps["ports"].split(',') {
                if let Some(port) = parse_port_token(token) {
                    host.upsert_port(port);
                }
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
        Target::parse("10.0.0.1").unwrap()
    }

    #[test]
    fn build_command_places_ports_option_before_target() {
        let adapter = PortProbeAdapter::default();
        let mut opts = BTreeMap::new();
        opts.insert("ports".to_string(), OptionValue::Str("1-1000".to_string()));
        let argv = adapter.build_command(&target(), &opts).unwrap();
        assert_eq!(argv, vec!["/bin/echo", "-p", "1-1000", "10.0.0.1"]);
    }

    #[test]
    fn build_command_rejects_unknown_option() {
        let adapter = PortProbeAdapter::default();
        let mut opts = BTreeMap::new();
        opts.insert("bogus".to_string(), OptionValue::Bool(true));
        let err = adapter.build_command(&target(), &opts).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn parse_output_extracts_ports_with_service_and_version() {
        let adapter = PortProbeAdapter::default();
        let stdout =
            b"Host: 10.0.0.1 ()\tPorts: 22/open/tcp//ssh//OpenSSH 9.6/, 80/closed/tcp//http///\n";
        let parsed = adapter.parse_output(stdout, b"", None).unwrap();
        assert_eq!(parsed.assets.hosts.len(), 1);
        let host = &parsed.assets.hosts[0];
        assert_eq!(host.port_count(), 2);
        let ssh = host.port(22, Protocol::Tcp).unwrap();
        assert_eq!(ssh.state, PortState::Open);
        assert_eq!(ssh.service.as_deref(), Some("ssh"));
        assert_eq!(ssh.product_version.as_deref(), Some("OpenSSH 9.6"));
        let http = host.port(80, Protocol::Tcp).unwrap();
        assert_eq!(http.state, PortState::Closed);
    }

    #[test]
    fn parse_output_ignores_unparseable_lines() {
        let adapter = PortProbeAdapter::default();
        let parsed = adapter.parse_output(b"garbage\n", b"", None).unwrap();
        assert!(parsed.assets.is_empty());
    }

    #[test]
    fn parse_output_skips_malformed_port_tokens() {
        let adapter = PortProbeAdapter::default();
        let stdout = b"Host: 10.0.0.1 ()\tPorts: not-a-port, 22/open/tcp//ssh//OpenSSH/\n";
        let parsed = adapter.parse_output(stdout, b"", None).unwrap();
        assert_eq!(parsed.assets.hosts[0].port_count(), 1);
    }
}

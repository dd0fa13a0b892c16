// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`StaticFindingAdapter`]: a zero-binary-dependency adapter that always
//! reports the same fixed finding. Used to exercise the façade's
//! severity-threshold exit code and the CLI's `init-config` example workflow
//! without depending on any real scanning tool.

use neosec_core::{
    Adapter, Affected, FormatHint, OptionValue, ParsedResult, Severity, Target, ToolCategory,
    ToolDescriptor, Vulnerability, VulnerabilityCategory,
};
use neosec_error::NeoSecError;
use std::collections::BTreeMap;

/// Always succeeds and always reports one fixed medium-severity finding,
/// independent of its target or options.
///
/// Registered under the tool name `"staticfinding"`. Its one required
/// binary is `/bin/true`, a binary present on essentially any POSIX host, so
/// this adapter never fails pre-flight validation.
#[derive(Debug, Default)]
pub struct StaticFindingAdapter;

impl Adapter for StaticFindingAdapter {
    fn register(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "staticfinding".to_string(),
            category: ToolCategory::Other,
            required_binaries: vec!["true".to_string()],
            default_timeout: None,
        }
    }

    fn build_command(
        &self,
        target: &Target,
        _options: &BTreeMap<String, OptionValue>,
    ) -> Result<Vec<String>, NeoSecError> {
        Ok(vec!["/bin/true".to_string(), target.as_str().to_string()])
    }

    fn parse_output(
        &self,
        _stdout: &[u8],
        _stderr: &[u8],
        _format_hint: FormatHint<'_>,
    ) -> Result<ParsedResult, NeoSecError> {
        let finding = Vulnerability {
            id: "NEOSEC-STATIC-0001".to_string(),
            name: "Demonstration finding".to_string(),
            description: "A fixed finding emitted by the static-finding reference adapter, \
                independent of any real scan."
                .to_string(),
            severity: Severity::Medium,
            cvss: None,
            cve: Vec::new(),
            category: VulnerabilityCategory::Other,
            affected: Affected::Url {
                url: "https://example.invalid".to_string(),
            },
            evidence: "staticfinding always reports this finding".to_string(),
            timestamp: chrono::Utc::now(),
        };
        Ok(ParsedResult {
            assets: Default::default(),
            vulnerabilities: vec![finding],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_tool_name_is_staticfinding() {
        assert_eq!(StaticFindingAdapter.name(), "staticfinding");
    }

    #[test]
    fn build_command_uses_bin_true_regardless_of_options() {
        let target = Target::parse("example.com").unwrap();
        let argv = StaticFindingAdapter
            .build_command(&target, &BTreeMap::new())
            .unwrap();
        assert_eq!(argv[0], "/bin/true");
    }

    #[test]
    fn parse_output_always_yields_one_fixed_finding() {
        let parsed = StaticFindingAdapter
            .parse_output(b"anything", b"", None)
            .unwrap();
        assert_eq!(parsed.vulnerabilities.len(), 1);
        assert_eq!(parsed.vulnerabilities[0].id, "NEOSEC-STATIC-0001");
        assert_eq!(parsed.vulnerabilities[0].severity, Severity::Medium);
    }

    #[test]
    fn parse_output_ignores_its_inputs() {
        let a = StaticFindingAdapter.parse_output(b"foo", b"bar", None).unwrap();
        let b = StaticFindingAdapter.parse_output(b"", b"", Some("xml")).unwrap();
        assert_eq!(a.vulnerabilities[0].id, b.vulnerabilities[0].id);
    }
}

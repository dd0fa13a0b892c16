// SPDX-License-Identifier: MIT OR Apache-2.0
//! The adapter registry: a process-scope table mapping hook names to the
//! ordered vector of registered [`Adapter`]s.
//!
//! This replaces the original dynamic-registration / decorator mechanism
//! with an explicit registry built once at startup. Registration order is
//! preserved and there is no runtime re-registration (`9. DESIGN NOTES`).

use neosec_core::{Adapter, BinaryResolution, FormatHint, OptionValue, ParsedResult, Target, ToolDescriptor};
use neosec_error::{ErrorCode, NeoSecError};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Ordered collection of registered [`Adapter`]s, with single-responder
/// dispatch for `build_command` and `parse_output`.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn Adapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter. Adapters register once at startup; this is not
    /// meant to be called again mid-run.
    pub fn register(&mut self, adapter: Arc<dyn Adapter>) {
        self.adapters.push(adapter);
    }

    /// `register_tool`: every registered adapter's self-description, in
    /// registration order.
    pub fn register_tool(&self) -> Vec<ToolDescriptor> {
        self.adapters.iter().map(|a| a.register()).collect()
    }

    /// `validate_dependencies`: resolve every distinct required binary name
    /// across all registered adapters.
    ///
    /// `explicit_paths` overrides PATH lookup per binary name (see
    /// [`BinaryResolution::resolve`]); `path_env` is typically
    /// `std::env::var("PATH")`.
    pub fn validate_dependencies(
        &self,
        explicit_paths: &BTreeMap<String, String>,
        path_env: Option<&str>,
    ) -> BTreeMap<String, BinaryResolution> {
        let mut out = BTreeMap::new();
        for adapter in &self.adapters {
            for binary in adapter.register().required_binaries {
                out.entry(binary.clone()).or_insert_with(|| {
                    BinaryResolution::resolve(&binary, explicit_paths.get(&binary).map(|s| s.as_str()), path_env)
                });
            }
        }
        out
    }

    /// Returns `true` if an adapter named `tool_name` is registered.
    pub fn contains(&self, tool_name: &str) -> bool {
        self.adapters.iter().any(|a| a.name() == tool_name)
    }

    /// The descriptor of the adapter registered under `tool_name`, if any.
    ///
    /// Used by the scheduler to read a tool's own default timeout (the
    /// middle tier of the task/tool/global precedence chain); duplicate
    /// registrations are caught separately by `build_command`'s
    /// single-responder check, so this takes the first match.
    pub fn tool_descriptor(&self, tool_name: &str) -> Option<ToolDescriptor> {
        self.adapters.iter().find(|a| a.name() == tool_name).map(|a| a.register())
    }

    /// Find the single adapter registered under `tool_name`.
    ///
    /// Per the single-responder contract, zero or more than one match is a
    /// configuration error.
    fn resolve_single(&self, tool_name: &str) -> Result<&Arc<dyn Adapter>, NeoSecError> {
        let mut matches = self.adapters.iter().filter(|a| a.name() == tool_name);
        let first = matches.next().ok_or_else(|| {
            NeoSecError::new(
                ErrorCode::AdapterResolutionError,
                format!("no adapter registered for tool `{tool_name}`"),
            )
            .with_context("tool", tool_name)
        })?;
        if matches.next().is_some() {
            return Err(NeoSecError::new(
                ErrorCode::AdapterResolutionError,
                format!("more than one adapter registered for tool `{tool_name}`"),
            )
            .with_context("tool", tool_name));
        }
        Ok(first)
    }

    /// `build_command`: dispatch to the single adapter registered for
    /// `tool_name`.
    pub fn build_command(
        &self,
        tool_name: &str,
        target: &Target,
        options: &BTreeMap<String, OptionValue>,
    ) -> Result<Vec<String>, NeoSecError> {
        self.resolve_single(tool_name)?.build_command(target, options)
    }

    /// `parse_output`: dispatch to the single adapter registered for
    /// `tool_name`.
    pub fn parse_output(
        &self,
        tool_name: &str,
        stdout: &[u8],
        stderr: &[u8],
        format_hint: FormatHint<'_>,
    ) -> Result<ParsedResult, NeoSecError> {
        self.resolve_single(tool_name)?.parse_output(stdout, stderr, format_hint)
    }

    /// Number of registered adapters.
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// `true` if no adapters are registered.
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

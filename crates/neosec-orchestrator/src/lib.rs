// SPDX-License-Identifier: MIT OR Apache-2.0
//! The orchestrator façade: wires the [`AdapterRegistry`], [`HookBus`], and
//! [`neosec_scheduler::run_workflow`] behind a single entry point, and owns
//! the two concerns that live outside the core subsystems proper —
//! persisting raw per-task output and the final report to disk, and
//! computing the CLI's severity-threshold exit code.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use neosec_bus::{AdapterRegistry, HookBus, ScanHook};
use neosec_config::NeoSecConfig;
use neosec_core::{Adapter, BinaryResolution, ScanResult, Target, ToolCategory, ToolDescriptor, WorkflowSpec};
use neosec_error::NeoSecError;
pub use neosec_scheduler::CancelToken;
use neosec_scheduler::RunOptions;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Resolution state of one required binary, as reported by
/// [`Orchestrator::validate`].
///
/// A flattened, caller-friendly view over
/// [`AdapterRegistry::validate_dependencies`]'s `BTreeMap<String,
/// BinaryResolution>`, keeping the binary name alongside its resolution so
/// callers (the CLI's `validate` subcommand) can render a simple list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryCheck {
    /// The binary name a registered adapter requires (e.g. `"nmap"`).
    pub binary: String,
    /// The resolution outcome for that name.
    pub resolution: BinaryResolution,
}

/// Wires the extension bus, the DAG scheduler, and ambient configuration
/// behind one entry point.
///
/// `Orchestrator` owns nothing the scheduler or bus don't already own; it is
/// pure wiring plus disk persistence and exit-code policy.
pub struct Orchestrator {
    registry: AdapterRegistry,
    hooks: HookBus,
    config: NeoSecConfig,
}

impl Orchestrator {
    /// Construct an orchestrator with no adapters or hooks registered yet.
    pub fn new(config: NeoSecConfig) -> Self {
        Self {
            registry: AdapterRegistry::new(),
            hooks: HookBus::new(),
            config,
        }
    }

    /// Register an adapter. Adapters register once at startup.
    pub fn register(&mut self, adapter: Arc<dyn Adapter>) {
        self.registry.register(adapter);
    }

    /// Register a lifecycle hook. Hooks fire in registration order.
    pub fn register_hook(&mut self, hook: Box<dyn ScanHook>) {
        self.hooks.register(hook);
    }

    /// Resolve every binary required by a registered adapter, without
    /// running anything.
    pub fn validate(&self) -> Result<Vec<BinaryCheck>, NeoSecError> {
        let resolved = self
            .registry
            .validate_dependencies(&self.config.binary_paths, std::env::var("PATH").ok().as_deref());
        Ok(resolved
            .into_iter()
            .map(|(binary, resolution)| BinaryCheck { binary, resolution })
            .collect())
    }

    /// List every registered tool's descriptor, optionally filtered to one
    /// category.
    pub fn list_tools(&self, category: Option<ToolCategory>) -> Vec<ToolDescriptor> {
        self.registry
            .register_tool()
            .into_iter()
            .filter(|d| category.is_none_or(|c| d.category == c))
            .collect()
    }

    /// Run `workflow` against `target`, persisting raw per-task output and
    /// the final report under `config.data_dir`, tagged with `run_id`.
    ///
    /// `cancel` lets a caller (e.g. the CLI's `Ctrl-C` handler) interrupt the
    /// run from outside; firing it cancels every in-flight and
    /// not-yet-started task the same way the run's own global timeout does.
    pub async fn scan(
        &self,
        workflow: &WorkflowSpec,
        target: &Target,
        run_id: &str,
        cancel: &CancelToken,
    ) -> Result<ScanResult, NeoSecError> {
        let raw_dir = self.config.raw_outputs_dir(run_id);
        std::fs::create_dir_all(&raw_dir).map_err(|e| {
            NeoSecError::new(
                neosec_error::ErrorCode::Internal,
                format!("failed to create raw output directory {}: {e}", raw_dir.display()),
            )
        })?;

        let sink_dir = raw_dir.clone();
        let raw_output_sink: neosec_scheduler::RawOutputSink = Arc::new(move |task_id, stdout, stderr| {
            let stdout_path = sink_dir.join(format!("{task_id}.stdout"));
            let stderr_path = sink_dir.join(format!("{task_id}.stderr"));
            if let Err(e) = std::fs::write(&stdout_path, stdout) {
                tracing::warn!(target: "neosec.orchestrator", task_id, error = %e, "failed to persist raw stdout");
            }
            if let Err(e) = std::fs::write(&stderr_path, stderr) {
                tracing::warn!(target: "neosec.orchestrator", task_id, error = %e, "failed to persist raw stderr");
            }
        });

        let opts = RunOptions {
            max_concurrency: self.config.max_concurrency,
            explicit_binary_paths: self.config.binary_paths.clone(),
            path_env: std::env::var("PATH").ok(),
            format_hints: Default::default(),
            raw_output_sink: Some(raw_output_sink),
            grace_period: self.config.grace_period(),
            max_output_bytes: self.config.max_output_bytes,
            cancel: cancel.clone(),
        };

        let started = Instant::now();
        let result = neosec_scheduler::run_workflow(workflow, target, &self.registry, &self.hooks, opts).await?;
        let elapsed = started.elapsed();
        info!(target: "neosec.orchestrator", run_id, workflow = %workflow.name, status = ?result.status, duration_ms = elapsed.as_millis() as u64, "scan finished");

        let report_path = self.config.report_path(run_id);
        if let Some(parent) = report_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                NeoSecError::new(
                    neosec_error::ErrorCode::Internal,
                    format!("failed to create report directory {}: {e}", parent.display()),
                )
            })?;
        }
        let report_json = serde_json::to_string_pretty(&result).map_err(|e| {
            NeoSecError::new(neosec_error::ErrorCode::Internal, format!("failed to serialize report: {e}"))
        })?;
        std::fs::write(&report_path, report_json).map_err(|e| {
            NeoSecError::new(
                neosec_error::ErrorCode::Internal,
                format!("failed to write report {}: {e}", report_path.display()),
            )
        })?;

        Ok(result)
    }

    /// Compute the CLI's exit code for a finished run, per `6. EXTERNAL
    /// INTERFACES`'s exit-code table: `0` every task succeeded and no
    /// vulnerability meets the configured severity threshold; `1` partial
    /// failure or threshold exceeded; `130` cancelled.
    ///
    /// Configuration/validation errors (exit `2`) are raised as an
    /// [`NeoSecError`] before a [`ScanResult`] ever exists, so they are not
    /// represented here.
    pub fn exit_code(&self, result: &ScanResult) -> i32 {
        use neosec_core::RunStatus;

        if result.status == RunStatus::Cancelled {
            return 130;
        }
        if result.status != RunStatus::Succeeded {
            return 1;
        }
        if let Some(threshold) = self.config.severity_threshold {
            if let Some(max) = result.max_severity() {
                if max.meets_or_exceeds(threshold) {
                    return 1;
                }
            }
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neosec_core::{TaskSpec, WorkflowSpec};
    use neosec_demo_adapters::StaticFindingAdapter;
    use std::time::Duration;

    fn target() -> Target {
        Target::parse("10.0.0.1").unwrap()
    }

    fn workflow() -> WorkflowSpec {
        WorkflowSpec {
            name: "demo".to_string(),
            description: None,
            global_timeout: Duration::from_secs(30),
            tasks: vec![TaskSpec::new("finding", "staticfinding")],
        }
    }

    #[test]
    fn list_tools_reflects_registration() {
        let mut orch = Orchestrator::new(NeoSecConfig::default());
        assert!(orch.list_tools(None).is_empty());
        orch.register(Arc::new(StaticFindingAdapter));
        let tools = orch.list_tools(None);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "staticfinding");
    }

    #[test]
    fn list_tools_filters_by_category() {
        let mut orch = Orchestrator::new(NeoSecConfig::default());
        orch.register(Arc::new(StaticFindingAdapter));
        assert!(orch.list_tools(Some(ToolCategory::Scanner)).is_empty());
        assert_eq!(orch.list_tools(Some(ToolCategory::Other)).len(), 1);
    }

    #[test]
    fn validate_reports_bin_true_as_available() {
        let mut orch = Orchestrator::new(NeoSecConfig::default());
        orch.register(Arc::new(StaticFindingAdapter));
        let checks = orch.validate().unwrap();
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].binary, "true");
        assert!(checks[0].resolution.available);
    }

    #[test]
    fn exit_code_zero_when_succeeded_with_no_threshold() {
        let orch = Orchestrator::new(NeoSecConfig::default());
        let result = ScanResult::new("demo", "10.0.0.1", chrono::Utc::now());
        assert_eq!(orch.exit_code(&result), 0);
    }

    #[test]
    fn exit_code_130_when_cancelled() {
        let orch = Orchestrator::new(NeoSecConfig::default());
        let mut result = ScanResult::new("demo", "10.0.0.1", chrono::Utc::now());
        result.status = neosec_core::RunStatus::Cancelled;
        assert_eq!(orch.exit_code(&result), 130);
    }

    #[test]
    fn exit_code_one_when_partial_failure() {
        let orch = Orchestrator::new(NeoSecConfig::default());
        let mut result = ScanResult::new("demo", "10.0.0.1", chrono::Utc::now());
        result.status = neosec_core::RunStatus::PartialFailure;
        assert_eq!(orch.exit_code(&result), 1);
    }

    #[test]
    fn exit_code_one_when_severity_threshold_exceeded() {
        use neosec_core::{Affected, Severity, Vulnerability, VulnerabilityCategory};

        let config = NeoSecConfig {
            severity_threshold: Some(Severity::High),
            ..NeoSecConfig::default()
        };
        let orch = Orchestrator::new(config);
        let mut result = ScanResult::new("demo", "10.0.0.1", chrono::Utc::now());
        result.vulnerabilities.push(Vulnerability {
            id: "1".to_string(),
            name: "n".to_string(),
            description: "d".to_string(),
            severity: Severity::Critical,
            cvss: None,
            cve: vec![],
            category: VulnerabilityCategory::Other,
            affected: Affected::Url { url: "https://example.invalid".to_string() },
            evidence: String::new(),
            timestamp: chrono::Utc::now(),
        });
        assert_eq!(orch.exit_code(&result), 1);
    }

    #[test]
    fn exit_code_zero_when_below_severity_threshold() {
        use neosec_core::{Affected, Severity, Vulnerability, VulnerabilityCategory};

        let config = NeoSecConfig {
            severity_threshold: Some(Severity::Critical),
            ..NeoSecConfig::default()
        };
        let orch = Orchestrator::new(config);
        let mut result = ScanResult::new("demo", "10.0.0.1", chrono::Utc::now());
        result.vulnerabilities.push(Vulnerability {
            id: "1".to_string(),
            name: "n".to_string(),
            description: "d".to_string(),
            severity: Severity::Low,
            cvss: None,
            cve: vec![],
            category: VulnerabilityCategory::Other,
            affected: Affected::Url { url: "https://example.invalid".to_string() },
            evidence: String::new(),
            timestamp: chrono::Utc::now(),
        });
        assert_eq!(orch.exit_code(&result), 0);
    }

    #[tokio::test]
    async fn scan_persists_raw_output_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let config = NeoSecConfig {
            data_dir: dir.path().to_string_lossy().into_owned(),
            ..NeoSecConfig::default()
        };
        let mut orch = Orchestrator::new(config.clone());
        orch.register(Arc::new(StaticFindingAdapter));

        let result = orch
            .scan(&workflow(), &target(), "run-1", &CancelToken::new())
            .await
            .unwrap();
        assert_eq!(result.vulnerabilities.len(), 1);

        assert!(config.raw_outputs_dir("run-1").join("finding.stdout").exists());
        assert!(config.report_path("run-1").exists());
        let report: ScanResult =
            serde_json::from_str(&std::fs::read_to_string(config.report_path("run-1")).unwrap()).unwrap();
        assert_eq!(report.workflow_name, "demo");
    }
}

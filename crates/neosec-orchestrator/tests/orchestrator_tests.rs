// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end tests driving the façade the way the `neosec` CLI would:
//! register adapters, run a workflow, and check the persisted report and
//! exit code.

use neosec_config::NeoSecConfig;
use neosec_core::{Severity, Target, TaskSpec, TaskState, WorkflowSpec};
use neosec_demo_adapters::StaticFindingAdapter;
use neosec_orchestrator::{CancelToken, Orchestrator};
use std::sync::Arc;
use std::time::Duration;

fn target() -> Target {
    Target::parse("10.0.0.1").unwrap()
}

fn orchestrator(data_dir: &std::path::Path) -> Orchestrator {
    let config = NeoSecConfig {
        data_dir: data_dir.to_string_lossy().into_owned(),
        ..NeoSecConfig::default()
    };
    let mut orch = Orchestrator::new(config);
    orch.register(Arc::new(StaticFindingAdapter));
    orch
}

#[tokio::test]
async fn two_node_chain_both_succeed_and_persist_a_report() {
    let dir = tempfile::tempdir().unwrap();
    let orch = orchestrator(dir.path());

    let workflow = WorkflowSpec {
        name: "two-node-chain".to_string(),
        description: None,
        global_timeout: Duration::from_secs(30),
        tasks: vec![
            TaskSpec::new("recon", "staticfinding"),
            TaskSpec::new("report", "staticfinding").depends_on(["recon"]),
        ],
    };

    let result = orch
        .scan(&workflow, &target(), "chain-run", &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(result.task_outcomes["recon"].state, TaskState::Succeeded);
    assert_eq!(result.task_outcomes["report"].state, TaskState::Succeeded);
    assert_eq!(result.vulnerabilities.len(), 2);
    assert_eq!(orch.exit_code(&result), 0);

    let report_path = dir.path().join("reports").join("chain-run.json");
    assert!(report_path.exists());
    let raw_dir = dir.path().join("raw_outputs").join("chain-run");
    assert!(raw_dir.join("recon.stdout").exists());
    assert!(raw_dir.join("report.stdout").exists());
}

#[tokio::test]
async fn exit_code_reflects_severity_threshold_after_a_real_scan() {
    let dir = tempfile::tempdir().unwrap();
    let config = NeoSecConfig {
        data_dir: dir.path().to_string_lossy().into_owned(),
        severity_threshold: Some(Severity::High),
        ..NeoSecConfig::default()
    };
    let mut orch = Orchestrator::new(config);
    orch.register(Arc::new(StaticFindingAdapter));

    let workflow = WorkflowSpec {
        name: "threshold-check".to_string(),
        description: None,
        global_timeout: Duration::from_secs(30),
        tasks: vec![TaskSpec::new("finding", "staticfinding")],
    };

    let result = orch
        .scan(&workflow, &target(), "threshold-run", &CancelToken::new())
        .await
        .unwrap();
    // StaticFindingAdapter always reports a Medium finding, below the High threshold.
    assert_eq!(orch.exit_code(&result), 0);
}

#[tokio::test]
async fn external_cancellation_before_the_scan_starts_yields_a_cancelled_run() {
    let dir = tempfile::tempdir().unwrap();
    let orch = orchestrator(dir.path());

    let workflow = WorkflowSpec {
        name: "cancel-me".to_string(),
        description: None,
        global_timeout: Duration::from_secs(30),
        tasks: vec![TaskSpec::new("finding", "staticfinding")],
    };

    let cancel = CancelToken::new();
    cancel.cancel();
    let result = orch.scan(&workflow, &target(), "cancelled-run", &cancel).await.unwrap();

    assert_eq!(result.task_outcomes["finding"].state, TaskState::Cancelled);
    assert_eq!(orch.exit_code(&result), 130);
}

#[tokio::test]
async fn validate_reports_missing_binary_for_an_unregistered_tool() {
    let dir = tempfile::tempdir().unwrap();
    let orch = orchestrator(dir.path());
    let checks = orch.validate().unwrap();
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].binary, "true");
    assert!(checks[0].resolution.available);
}

#[tokio::test]
async fn list_tools_returns_every_registered_adapter() {
    let dir = tempfile::tempdir().unwrap();
    let orch = orchestrator(dir.path());
    let tools = orch.list_tools(None);
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "staticfinding");
}

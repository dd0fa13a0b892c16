// SPDX-License-Identifier: MIT OR Apache-2.0
//! Drives one [`WorkflowSpec`] to completion: pre-flight validation,
//! layer-by-layer concurrent dispatch through the [`AdapterRegistry`] and
//! [`ExecutorPool`], failure propagation, global timeout enforcement, and
//! [`ScanResult`] aggregation.

use chrono::Utc;
use neosec_bus::{AdapterRegistry, HookBus};
use neosec_core::{ScanResult, Target, TaskOutcome, TaskState, WorkflowSpec};
use neosec_core::{BinaryResolution, FormatHint};
use neosec_error::{ErrorCode, NeoSecError};
use neosec_executor::{CancelToken, ExecOptions, ExecutorPool, Termination};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Callback invoked with a task's raw captured `(stdout, stderr)` as soon as
/// its subprocess terminates, before `parse_output` runs. Lets a caller
/// (the orchestrator façade) persist the exact bytes a tool produced for
/// forensics, independent of whether parsing later succeeds.
pub type RawOutputSink = Arc<dyn Fn(&str, &[u8], &[u8]) + Send + Sync>;

/// Parameters governing one workflow run, independent of the workflow or
/// target themselves.
pub struct RunOptions {
    /// Maximum number of tool invocations allowed to run at once.
    pub max_concurrency: usize,
    /// Explicit configured path per binary name, overriding `PATH` search.
    pub explicit_binary_paths: BTreeMap<String, String>,
    /// `PATH`-style search string (typically `std::env::var("PATH")`).
    pub path_env: Option<String>,
    /// Output-format hint per tool name, forwarded to `parse_output`.
    pub format_hints: BTreeMap<String, String>,
    /// Optional sink for each task's raw captured stdout/stderr, called as
    /// soon as the task's subprocess terminates (see `6. EXTERNAL
    /// INTERFACES`'s persisted state layout).
    pub raw_output_sink: Option<RawOutputSink>,
    /// Delay between `SIGTERM` and `SIGKILL` when a task is killed, whether
    /// by its own timeout or by run-level cancellation.
    pub grace_period: Duration,
    /// Cap on retained stdout/stderr bytes per task stream.
    pub max_output_bytes: usize,
    /// Caller-supplied cancellation signal. Firing it externally (e.g. from
    /// a `Ctrl-C` handler) cancels every in-flight and not-yet-started task
    /// in this run, the same way the run's own global timeout does.
    pub cancel: CancelToken,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            explicit_binary_paths: BTreeMap::new(),
            path_env: std::env::var("PATH").ok(),
            format_hints: BTreeMap::new(),
            raw_output_sink: None,
            grace_period: neosec_executor::DEFAULT_GRACE_PERIOD,
            max_output_bytes: neosec_executor::DEFAULT_MAX_OUTPUT_BYTES,
            cancel: CancelToken::new(),
        }
    }
}

/// Validate the workflow, the tools it names, and the binaries those tools
/// require, without running anything.
///
/// This is step 4 of the DAG scheduler's pre-execution checklist: a
/// misconfigured workflow should fail before a single process is spawned.
fn preflight(
    workflow: &WorkflowSpec,
    registry: &AdapterRegistry,
    opts: &RunOptions,
) -> Result<(), NeoSecError> {
    workflow.validate()?;

    let descriptors: BTreeMap<String, Vec<String>> = registry
        .register_tool()
        .into_iter()
        .map(|d| (d.name, d.required_binaries))
        .collect();

    let mut required_binaries: BTreeMap<String, ()> = BTreeMap::new();
    for task in &workflow.tasks {
        let Some(binaries) = descriptors.get(&task.tool) else {
            return Err(NeoSecError::new(
                ErrorCode::AdapterResolutionError,
                format!("no adapter registered for tool `{}`", task.tool),
            )
            .with_context("task_id", &task.id)
            .with_context("tool", &task.tool));
        };
        for binary in binaries {
            required_binaries.insert(binary.clone(), ());
        }
    }

    for binary in required_binaries.keys() {
        let resolution = BinaryResolution::resolve(
            binary,
            opts.explicit_binary_paths.get(binary).map(String::as_str),
            opts.path_env.as_deref(),
        );
        if !resolution.available {
            return Err(NeoSecError::new(
                ErrorCode::BinaryMissing,
                format!("required binary `{binary}` was not found"),
            )
            .with_context("binary", binary));
        }
    }

    Ok(())
}

/// Run `workflow` against `default_target`, dispatching through `registry`
/// and broadcasting lifecycle events through `hooks`.
pub async fn run_workflow(
    workflow: &WorkflowSpec,
    default_target: &Target,
    registry: &AdapterRegistry,
    hooks: &HookBus,
    opts: RunOptions,
) -> Result<ScanResult, NeoSecError> {
    preflight(workflow, registry, &opts)?;
    let layers = workflow.layers()?;

    let started_at = Utc::now();
    hooks.fire_scan_start(&workflow.name, default_target.as_str());

    let result = Arc::new(Mutex::new(ScanResult::new(
        workflow.name.clone(),
        default_target.as_str(),
        started_at,
    )));
    let task_states: Arc<Mutex<HashMap<String, TaskState>>> = Arc::new(Mutex::new(
        workflow
            .tasks
            .iter()
            .map(|t| (t.id.clone(), TaskState::Pending))
            .collect(),
    ));

    let pool = ExecutorPool::new(opts.max_concurrency.max(1));
    let run_cancel = opts.cancel.clone();
    let deadline = tokio::time::Instant::now() + workflow.global_timeout;

    // Fires `run_cancel` the moment the global timeout elapses, even while a
    // layer's tasks are still in flight; without this the deadline was only
    // ever observed between layers and an unbounded task inside a layer
    // could block the whole run past its budget.
    let watcher_cancel = run_cancel.clone();
    let watcher = tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => watcher_cancel.cancel(),
            _ = watcher_cancel.cancelled() => {}
        }
    });

    for layer in &layers {
        if run_cancel.is_cancelled() {
            break;
        }

        let futures = layer.iter().map(|task_id| {
            run_task(
                workflow,
                task_id,
                default_target,
                registry,
                hooks,
                &opts,
                &pool,
                &run_cancel,
                &task_states,
                &result,
            )
        });
        futures::future::join_all(futures).await;
    }

    watcher.abort();
    let cancelled = run_cancel.is_cancelled();
    if cancelled {
        let reason = if tokio::time::Instant::now() >= deadline {
            "run-level global timeout exceeded"
        } else {
            "run was cancelled"
        };
        warn!(target: "neosec.scheduler", workflow = %workflow.name, reason, "cancelling remaining tasks");
        let mut states = task_states.lock().await;
        let mut res = result.lock().await;
        for task in &workflow.tasks {
            let state = states.entry(task.id.clone()).or_insert(TaskState::Pending);
            if !state.is_terminal() {
                *state = TaskState::Cancelled;
                res.task_outcomes.insert(
                    task.id.clone(),
                    TaskOutcome {
                        state: TaskState::Cancelled,
                        duration: None,
                        detail: Some(reason.to_string()),
                    },
                );
                hooks.fire_task_complete(&task.id, TaskState::Cancelled);
            }
        }
        res.status = neosec_core::RunStatus::Cancelled;
    }

    let mut result = result.lock().await.clone();
    result.ended_at = Some(Utc::now());
    if !cancelled {
        result.derive_status();
    }
    hooks.fire_scan_complete(&result);
    info!(target: "neosec.scheduler", workflow = %workflow.name, status = ?result.status, "run complete");
    Ok(result)
}

#[allow(clippy::too_many_arguments)]
async fn run_task(
    workflow: &WorkflowSpec,
    task_id: &str,
    default_target: &Target,
    registry: &AdapterRegistry,
    hooks: &HookBus,
    opts: &RunOptions,
    pool: &ExecutorPool,
    run_cancel: &CancelToken,
    task_states: &Arc<Mutex<HashMap<String, TaskState>>>,
    result: &Arc<Mutex<ScanResult>>,
) {
    let task = workflow.task(task_id).expect("task id came from this workflow's own layering");

    let upstream_failure = {
        let states = task_states.lock().await;
        task.depends_on
            .iter()
            .find(|dep| states.get(dep.as_str()).is_some_and(TaskState::is_non_succeeded_terminal))
            .cloned()
    };

    if let Some(failed_dep) = upstream_failure {
        record_outcome(
            task_states,
            result,
            hooks,
            task_id,
            TaskState::Skipped,
            None,
            Some(format!("skipped: dependency `{failed_dep}` did not succeed")),
        )
        .await;
        return;
    }

    {
        let mut states = task_states.lock().await;
        states.insert(task_id.to_string(), TaskState::Running);
    }
    hooks.fire_task_start(task_id);

    let started = Instant::now();
    let outcome = execute_task(
        task,
        workflow.global_timeout,
        default_target,
        registry,
        opts,
        pool,
        run_cancel,
        result,
    )
    .await;
    let duration = Some(started.elapsed());

    match outcome {
        Ok((state, detail)) => {
            record_outcome(task_states, result, hooks, task_id, state, duration, detail).await;
        }
        Err(e) => {
            record_outcome(
                task_states,
                result,
                hooks,
                task_id,
                TaskState::Failed,
                duration,
                Some(e.message),
            )
            .await;
        }
    }
}

async fn execute_task(
    task: &neosec_core::TaskSpec,
    workflow_global_timeout: Duration,
    default_target: &Target,
    registry: &AdapterRegistry,
    opts: &RunOptions,
    pool: &ExecutorPool,
    run_cancel: &CancelToken,
    result: &Arc<Mutex<ScanResult>>,
) -> Result<(TaskState, Option<String>), NeoSecError> {
    let target = match &task.target {
        Some(addr) => Target::parse(addr.clone())?,
        None => default_target.clone(),
    };

    let argv = registry.build_command(&task.tool, &target, &task.options)?;

    // Precedence chain (task override) > (tool default) > (workflow global).
    let tool_default_timeout = registry.tool_descriptor(&task.tool).and_then(|d| d.default_timeout);
    let effective_timeout = task.timeout.or(tool_default_timeout).or(Some(workflow_global_timeout));

    let exec_opts = ExecOptions {
        timeout: effective_timeout,
        grace_period: opts.grace_period,
        max_output_bytes: opts.max_output_bytes,
        cancel: run_cancel.clone(),
        ..ExecOptions::default()
    };
    let outcome = pool.run(&argv, exec_opts).await?;

    if let Some(sink) = &opts.raw_output_sink {
        sink(&task.id, &outcome.stdout.bytes, &outcome.stderr.bytes);
    }

    match outcome.termination {
        Termination::TimedOut => Ok((TaskState::TimedOut, Some("exceeded its configured timeout".to_string()))),
        Termination::Cancelled => Ok((TaskState::Cancelled, Some("cancelled".to_string()))),
        Termination::Exited => {
            if outcome.exit_code != Some(0) {
                return Ok((
                    TaskState::Failed,
                    Some(format!("exited with code {:?}", outcome.exit_code)),
                ));
            }
            let format_hint: FormatHint<'_> = opts.format_hints.get(&task.tool).map(String::as_str);
            let parsed = registry.parse_output(&task.tool, &outcome.stdout.bytes, &outcome.stderr.bytes, format_hint)?;
            {
                let mut res = result.lock().await;
                res.assets.merge(parsed.assets);
                res.vulnerabilities.extend(parsed.vulnerabilities);
            }
            let detail = (outcome.stdout.truncated || outcome.stderr.truncated)
                .then(|| "output truncated at the configured size cap".to_string());
            Ok((TaskState::Succeeded, detail))
        }
    }
}

async fn record_outcome(
    task_states: &Arc<Mutex<HashMap<String, TaskState>>>,
    result: &Arc<Mutex<ScanResult>>,
    hooks: &HookBus,
    task_id: &str,
    state: TaskState,
    duration: Option<Duration>,
    detail: Option<String>,
) {
    {
        let mut states = task_states.lock().await;
        states.insert(task_id.to_string(), state);
    }
    {
        let mut res = result.lock().await;
        res.task_outcomes.insert(task_id.to_string(), TaskOutcome { state, duration, detail });
    }
    hooks.fire_task_complete(task_id, state);
}

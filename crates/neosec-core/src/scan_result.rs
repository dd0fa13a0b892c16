// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`ScanResult`]: the aggregate handed back to the caller once a run
//! finishes.

use crate::asset::Asset;
use crate::task_state::TaskState;
use crate::vulnerability::Vulnerability;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Top-level outcome of a run, independent of any single task's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every task succeeded.
    Succeeded,
    /// At least one task ended non-`Succeeded`, but the run itself completed.
    PartialFailure,
    /// The run was cancelled by its cancellation signal or global timeout.
    Cancelled,
    /// Pre-execution validation failed; no task was ever spawned.
    Failed,
}

/// The terminal record kept for one task once the run ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutcome {
    /// Final lifecycle state.
    pub state: TaskState,
    /// Wall-clock duration of the task's execution, if it ran at all.
    pub duration: Option<Duration>,
    /// Human-readable detail (error message, truncation note, etc), if any.
    pub detail: Option<String>,
}

/// The aggregate result of one workflow run against one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Name of the workflow that produced this result.
    pub workflow_name: String,
    /// Default target the run executed against.
    pub target: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run ended.
    pub ended_at: Option<DateTime<Utc>>,
    /// Per-task terminal outcomes, keyed by task id.
    pub task_outcomes: BTreeMap<String, TaskOutcome>,
    /// Merged discoveries from every task that produced any.
    pub assets: Asset,
    /// Merged vulnerabilities from every task that produced any.
    pub vulnerabilities: Vec<Vulnerability>,
    /// Top-level status.
    pub status: RunStatus,
}

impl ScanResult {
    /// Start a new, empty result for `workflow_name` against `target`.
    pub fn new(workflow_name: impl Into<String>, target: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            workflow_name: workflow_name.into(),
            target: target.into(),
            started_at,
            ended_at: None,
            task_outcomes: BTreeMap::new(),
            assets: Asset::new(),
            vulnerabilities: Vec::new(),
            status: RunStatus::Succeeded,
        }
    }

    /// Derive the top-level [`RunStatus`] from the recorded task outcomes.
    ///
    /// `Succeeded` if every task is `Succeeded`; `PartialFailure` if any task
    /// is not. Callers that cancel a run outright or reject it in
    /// pre-validation set `status` directly instead of calling this.
    pub fn derive_status(&mut self) {
        let all_succeeded = self
            .task_outcomes
            .values()
            .all(|o| o.state == TaskState::Succeeded);
        self.status = if all_succeeded {
            RunStatus::Succeeded
        } else {
            RunStatus::PartialFailure
        };
    }

    /// Highest [`crate::Severity`] among the run's vulnerabilities, if any.
    pub fn max_severity(&self) -> Option<crate::Severity> {
        self.vulnerabilities.iter().map(|v| v.severity).max()
    }
}

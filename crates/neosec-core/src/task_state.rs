// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`TaskState`]: the per-task lifecycle state machine owned exclusively by
//! the scheduler.

use serde::{Deserialize, Serialize};

/// Lifecycle state of one task within a run.
///
/// ```text
/// Pending --(deps all Succeeded)--> Ready --(scheduled)--> Running
///                                                            |
///                         +----------------------------------+---------------+
///                         v                  v                               v
///                    Succeeded       Failed / TimedOut                 Cancelled
///
/// (>=1 dependency in a non-Succeeded terminal state) --> Skipped
///                                            (from Pending or Ready)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Waiting on at least one dependency.
    Pending,
    /// Every dependency has succeeded; eligible to be scheduled.
    Ready,
    /// Currently executing.
    Running,
    /// Completed successfully.
    Succeeded,
    /// Completed with a non-zero exit or a parse failure.
    Failed,
    /// Never ran because a dependency ended in a non-Succeeded terminal state.
    Skipped,
    /// Killed after exceeding its timeout.
    TimedOut,
    /// Killed by a run-level or caller-level cancellation.
    Cancelled,
}

impl TaskState {
    /// `true` for any state from which no further transition occurs.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::Skipped | Self::TimedOut | Self::Cancelled
        )
    }

    /// `true` for a terminal state other than [`TaskState::Succeeded`].
    ///
    /// A dependency in one of these states is what triggers
    /// [`TaskState::Skipped`] propagation to its dependents.
    pub fn is_non_succeeded_terminal(&self) -> bool {
        self.is_terminal() && !matches!(self, Self::Succeeded)
    }
}

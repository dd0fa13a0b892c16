// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`TaskSpec`]: one node of a [`crate::WorkflowSpec`], immutable after
//! parsing.

use crate::option_value::OptionValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// One task in a workflow: which tool to run, what it depends on, and its
/// adapter options.
///
/// `TaskSpec`s are immutable after parsing; the scheduler never mutates
/// them, only the [`crate::TaskState`] table it owns alongside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Identifier, unique within the owning [`crate::WorkflowSpec`].
    pub id: String,
    /// Name of the adapter (tool) to invoke; must match a registered adapter.
    pub tool: String,
    /// Task ids this task depends on.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Per-task target override; `None` inherits the run's default target.
    #[serde(default)]
    pub target: Option<String>,
    /// Adapter-specific key/value options.
    #[serde(default)]
    pub options: BTreeMap<String, OptionValue>,
    /// Per-task timeout override, taking precedence over the tool default and
    /// the workflow's global timeout.
    #[serde(default, with = "crate::duration_secs::option")]
    pub timeout: Option<Duration>,
}

impl TaskSpec {
    /// Construct a task with no dependencies, target override, options, or
    /// timeout override.
    pub fn new(id: impl Into<String>, tool: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tool: tool.into(),
            depends_on: Vec::new(),
            target: None,
            options: BTreeMap::new(),
            timeout: None,
        }
    }

    /// Builder-style setter for `depends_on`.
    #[must_use]
    pub fn depends_on(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.depends_on = ids.into_iter().map(Into::into).collect();
        self
    }
}

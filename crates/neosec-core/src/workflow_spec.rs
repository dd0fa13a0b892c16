// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`WorkflowSpec`]: the parsed, validated workflow DAG.
//!
//! Parsing (`from_yaml_str`) and structural validation (`validate`,
//! `layers`) live here because they are pure functions of already-read text;
//! actually reading the workflow file from disk is the CLI's job.

use crate::task_spec::TaskSpec;
use neosec_error::{ErrorCode, NeoSecError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::time::Duration;

fn default_global_timeout() -> Duration {
    Duration::from_secs(3600)
}

/// A parsed workflow: a name, optional description, a global timeout, and an
/// ordered list of [`TaskSpec`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSpec {
    /// Workflow name.
    pub name: String,
    /// Optional free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Global timeout across the whole run; bounds the sum of per-task
    /// timeouts (see `5. CONCURRENCY & RESOURCE MODEL`).
    #[serde(default = "default_global_timeout", with = "crate::duration_secs")]
    pub global_timeout: Duration,
    /// Tasks, in the order they appeared in the workflow file.
    pub tasks: Vec<TaskSpec>,
}

impl WorkflowSpec {
    /// Parse a `WorkflowSpec` from an already-read YAML string.
    ///
    /// Structural validation ([`WorkflowSpec::validate`]) is *not* run here;
    /// callers must invoke it explicitly so a caller that only wants to
    /// inspect the raw structure (e.g. `list-tools`) is not forced to pay
    /// for DAG validation.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, NeoSecError> {
        serde_yaml::from_str(yaml).map_err(|e| {
            NeoSecError::new(ErrorCode::InvalidInput, format!("invalid workflow YAML: {e}"))
        })
    }

    /// Look up a task by id.
    pub fn task(&self, id: &str) -> Option<&TaskSpec> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Run the full pre-execution validation described in `4.4 DAG
    /// Scheduler`: unique ids, dependencies that exist, and acyclicity.
    ///
    /// Adapter availability (step 4 of that section) is a bus-level concern
    /// and is validated separately by the scheduler once adapters are known.
    pub fn validate(&self) -> Result<(), NeoSecError> {
        self.validate_unique_ids()?;
        self.validate_dependencies_exist()?;
        self.layers()?;
        Ok(())
    }

    fn validate_unique_ids(&self) -> Result<(), NeoSecError> {
        let mut seen = BTreeSet::new();
        for task in &self.tasks {
            if !seen.insert(task.id.as_str()) {
                return Err(NeoSecError::new(
                    ErrorCode::WorkflowDuplicateTaskId,
                    format!("duplicate task id `{}`", task.id),
                )
                .with_context("task_id", &task.id));
            }
        }
        Ok(())
    }

    fn validate_dependencies_exist(&self) -> Result<(), NeoSecError> {
        let ids: BTreeSet<&str> = self.tasks.iter().map(|t| t.id.as_str()).collect();
        for task in &self.tasks {
            for dep in &task.depends_on {
                if !ids.contains(dep.as_str()) {
                    return Err(NeoSecError::new(
                        ErrorCode::WorkflowUnknownDependency,
                        format!("task `{}` depends on unknown task `{dep}`", task.id),
                    )
                    .with_context("task_id", &task.id)
                    .with_context("dependency", dep));
                }
            }
        }
        Ok(())
    }

    /// Compute a topological layering via Kahn's algorithm: repeatedly
    /// extract the set of tasks whose dependencies have all already been
    /// extracted. Each extracted set is one layer, safe to run concurrently.
    ///
    /// If a non-empty remainder can never be extracted, the graph has a
    /// cycle; the returned error names one task on that cycle.
    pub fn layers(&self) -> Result<Vec<Vec<String>>, NeoSecError> {
        let mut indegree: BTreeMap<&str, usize> = BTreeMap::new();
        // dependents[x] = tasks that list x in their depends_on
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        for task in &self.tasks {
            indegree.entry(task.id.as_str()).or_insert(0);
            for dep in &task.depends_on {
                *indegree.entry(task.id.as_str()).or_insert(0) += 1;
                dependents
                    .entry(dep.as_str())
                    .or_default()
                    .push(task.id.as_str());
            }
        }

        let mut layers: Vec<Vec<String>> = Vec::new();
        let mut remaining = indegree.clone();
        let mut frontier: VecDeque<&str> = remaining
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(&id, _)| id)
            .collect();

        let mut resolved = 0usize;
        while !frontier.is_empty() {
            let mut layer: Vec<&str> = frontier.drain(..).collect();
            layer.sort_unstable();
            resolved += layer.len();

            let mut next_frontier = Vec::new();
            for &id in &layer {
                remaining.remove(id);
                if let Some(deps) = dependents.get(id) {
                    for &dependent in deps {
                        if let Some(deg) = remaining.get_mut(dependent) {
                            *deg -= 1;
                            if *deg == 0 {
                                next_frontier.push(dependent);
                            }
                        }
                    }
                }
            }
            layers.push(layer.into_iter().map(str::to_owned).collect());
            frontier.extend(next_frontier);
        }

        if resolved != self.tasks.len() {
            // Every id still in `remaining` has indegree > 0 and can never be
            // resolved: it sits on (or depends transitively on) a cycle.
            let stuck = remaining
                .keys()
                .next()
                .copied()
                .unwrap_or("<unknown>")
                .to_string();
            return Err(NeoSecError::new(
                ErrorCode::WorkflowCycle,
                format!("dependency cycle detected involving task `{stuck}`"),
            )
            .with_context("task_id", &stuck));
        }

        Ok(layers)
    }

    /// Transitive dependents of `id`: every task that (directly or
    /// indirectly) depends on it.
    ///
    /// The scheduler itself propagates failure reactively (each task checks
    /// its own `depends_on` as it becomes ready) rather than by precomputing
    /// this set; it's exposed for callers that want to preview a workflow's
    /// blast radius before running it, e.g. "if `id` fails, what gets
    /// skipped?".
    pub fn transitive_dependents(&self, id: &str) -> BTreeSet<String> {
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for task in &self.tasks {
            for dep in &task.depends_on {
                dependents
                    .entry(dep.as_str())
                    .or_default()
                    .push(task.id.as_str());
            }
        }

        let mut result = BTreeSet::new();
        let mut queue: VecDeque<&str> = dependents.get(id).cloned().unwrap_or_default().into();
        while let Some(next) = queue.pop_front() {
            if result.insert(next.to_string()) {
                if let Some(further) = dependents.get(next) {
                    queue.extend(further);
                }
            }
        }
        result
    }
}

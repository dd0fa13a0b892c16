// SPDX-License-Identifier: MIT OR Apache-2.0
//! Broadcast lifecycle hooks: `on_scan_start`, `on_scan_complete`,
//! `on_task_start`, `on_task_complete`.
//!
//! Every registered [`ScanHook`] is invoked for every event; a hook that
//! returns an error is logged and skipped, never aborting the broadcast.

use neosec_core::{ScanResult, TaskState};

/// A listener for run- and task-level lifecycle events.
///
/// All methods default to a no-op so a hook only needs to override the
/// callbacks it cares about.
pub trait ScanHook: Send + Sync {
    /// Human-readable name, used in logging.
    fn name(&self) -> &str;

    /// Called once, before the first task is scheduled.
    fn on_scan_start(&self, _workflow_name: &str, _target: &str) -> Result<(), String> {
        Ok(())
    }

    /// Called once, after the run's [`ScanResult`] is finalized.
    fn on_scan_complete(&self, _result: &ScanResult) -> Result<(), String> {
        Ok(())
    }

    /// Called when a task transitions into `Running`.
    fn on_task_start(&self, _task_id: &str) -> Result<(), String> {
        Ok(())
    }

    /// Called when a task reaches a terminal [`TaskState`].
    fn on_task_complete(&self, _task_id: &str, _outcome: TaskState) -> Result<(), String> {
        Ok(())
    }
}

/// Ordered collection of [`ScanHook`]s, fired in registration order.
#[derive(Default)]
pub struct HookBus {
    hooks: Vec<Box<dyn ScanHook>>,
}

impl HookBus {
    /// Create an empty hook bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook. Hooks fire in the order they are registered.
    pub fn register(&mut self, hook: Box<dyn ScanHook>) {
        self.hooks.push(hook);
    }

    /// Broadcast `on_scan_start` to every registered hook.
    pub fn fire_scan_start(&self, workflow_name: &str, target: &str) {
        for hook in &self.hooks {
            if let Err(e) = hook.on_scan_start(workflow_name, target) {
                tracing::warn!(target: "neosec.hooks", hook = hook.name(), error = %e, "on_scan_start failed");
            }
        }
    }

    /// Broadcast `on_scan_complete` to every registered hook.
    pub fn fire_scan_complete(&self, result: &ScanResult) {
        for hook in &self.hooks {
            if let Err(e) = hook.on_scan_complete(result) {
                tracing::warn!(target: "neosec.hooks", hook = hook.name(), error = %e, "on_scan_complete failed");
            }
        }
    }

    /// Broadcast `on_task_start` to every registered hook.
    pub fn fire_task_start(&self, task_id: &str) {
        for hook in &self.hooks {
            if let Err(e) = hook.on_task_start(task_id) {
                tracing::warn!(target: "neosec.hooks", hook = hook.name(), error = %e, "on_task_start failed");
            }
        }
    }

    /// Broadcast `on_task_complete` to every registered hook.
    pub fn fire_task_complete(&self, task_id: &str, outcome: TaskState) {
        for hook in &self.hooks {
            if let Err(e) = hook.on_task_complete(task_id, outcome) {
                tracing::warn!(target: "neosec.hooks", hook = hook.name(), error = %e, "on_task_complete failed");
            }
        }
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// `true` if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

/// Logs every lifecycle event via `tracing`.
pub struct LoggingHook;

impl ScanHook for LoggingHook {
    fn name(&self) -> &str {
        "logging"
    }

    fn on_scan_start(&self, workflow_name: &str, target: &str) -> Result<(), String> {
        tracing::info!(target: "neosec.hooks", workflow = workflow_name, %target, "scan starting");
        Ok(())
    }

    fn on_scan_complete(&self, result: &ScanResult) -> Result<(), String> {
        tracing::info!(target: "neosec.hooks", status = ?result.status, "scan complete");
        Ok(())
    }

    fn on_task_start(&self, task_id: &str) -> Result<(), String> {
        tracing::debug!(target: "neosec.hooks", task_id, "task starting");
        Ok(())
    }

    fn on_task_complete(&self, task_id: &str, outcome: TaskState) -> Result<(), String> {
        tracing::debug!(target: "neosec.hooks", task_id, ?outcome, "task complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHook(Arc<AtomicUsize>);

    impl ScanHook for CountingHook {
        fn name(&self) -> &str {
            "counting"
        }
        fn on_task_start(&self, _task_id: &str) -> Result<(), String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingHook;

    impl ScanHook for FailingHook {
        fn name(&self) -> &str {
            "failing"
        }
        fn on_task_start(&self, _task_id: &str) -> Result<(), String> {
            Err("boom".to_string())
        }
    }

    #[test]
    fn broadcast_invokes_every_hook_in_order() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = HookBus::new();
        bus.register(Box::new(CountingHook(counter.clone())));
        bus.register(Box::new(CountingHook(counter.clone())));
        bus.fire_task_start("task-1");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn a_failing_hook_does_not_abort_the_broadcast() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = HookBus::new();
        bus.register(Box::new(FailingHook));
        bus.register(Box::new(CountingHook(counter.clone())));
        bus.fire_task_start("task-1");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_bus_reports_empty() {
        let bus = HookBus::new();
        assert!(bus.is_empty());
        assert_eq!(bus.len(), 0);
    }
}

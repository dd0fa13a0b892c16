// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bounded-concurrency execution pool.
//!
//! Caps how many tool invocations run at once, independent of how many
//! tasks the scheduler has made `Ready`.

use crate::run::{run, ExecOptions, ExecutionOutcome};
use neosec_error::NeoSecError;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Gates concurrent [`run`] calls behind a fixed number of permits.
#[derive(Clone)]
pub struct ExecutorPool {
    semaphore: Arc<Semaphore>,
}

impl ExecutorPool {
    /// Create a pool allowing up to `max_concurrency` simultaneous runs.
    ///
    /// `max_concurrency` is clamped to at least 1.
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }

    /// Run `argv` once a permit is available, releasing it when the run
    /// finishes (successfully, by timeout, or by cancellation).
    pub async fn run(&self, argv: &[String], opts: ExecOptions) -> Result<ExecutionOutcome, NeoSecError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .expect("semaphore is never closed");
        run(argv, opts).await
    }

    /// Number of permits currently available (i.e. free execution slots).
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn limits_concurrent_runs_to_the_configured_cap() {
        let pool = ExecutorPool::new(2);
        assert_eq!(pool.available_permits(), 2);

        let opts = ExecOptions {
            timeout: Some(Duration::from_secs(5)),
            ..ExecOptions::default()
        };
        let a = pool.run(&argv(&["/bin/sleep", "1"]), opts);
        tokio::pin!(a);
        // Poll once to acquire the permit without finishing the run.
        let _ = tokio::time::timeout(Duration::from_millis(10), &mut a).await;
        assert!(pool.available_permits() <= 2);
    }

    #[tokio::test]
    async fn runs_complete_and_release_their_permit() {
        let pool = ExecutorPool::new(1);
        let outcome = pool
            .run(&argv(&["/bin/echo", "ok"]), ExecOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome.exit_code, Some(0));
        assert_eq!(pool.available_permits(), 1);
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structured run metrics and telemetry export for NeoSec.
//!
//! Not part of the three core subsystems (`spec.md` §1 places "logging
//! infrastructure" out of scope as a feature, not as an excuse to go without
//! structured observability) — a completed run's metrics are recorded here,
//! independent of the [`neosec_core::ScanResult`] itself, so a caller can
//! track trends across many runs without re-deserializing every report.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use neosec_core::{RunStatus, ScanResult, TaskState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

// ---------------------------------------------------------------------------
// RunMetrics
// ---------------------------------------------------------------------------

/// Metrics captured for a single completed workflow run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunMetrics {
    /// Name of the workflow that produced this run.
    pub workflow_name: String,
    /// Target the run executed against.
    pub target: String,
    /// Wall-clock duration of the whole run, in milliseconds.
    pub duration_ms: u64,
    /// Final run-level status.
    pub status: RunStatusTag,
    /// Number of tasks that ended `Succeeded`.
    pub succeeded_count: u64,
    /// Number of tasks that ended `Failed`.
    pub failed_count: u64,
    /// Number of tasks that ended `Skipped`.
    pub skipped_count: u64,
    /// Number of tasks that ended `TimedOut`.
    pub timed_out_count: u64,
    /// Number of tasks that ended `Cancelled`.
    pub cancelled_count: u64,
    /// Number of vulnerabilities discovered.
    pub vulnerabilities_count: u64,
    /// Highest severity discovered, as its display string (e.g. `"critical"`),
    /// if any vulnerabilities were found.
    pub max_severity: Option<String>,
}

/// A [`RunStatus`] copy that derives the traits metrics storage needs
/// (`RunStatus` itself intentionally does not derive `Default`, since a
/// freshly constructed [`ScanResult`] has a real, meaningful status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatusTag {
    /// See [`RunStatus::Succeeded`].
    Succeeded,
    /// See [`RunStatus::PartialFailure`].
    PartialFailure,
    /// See [`RunStatus::Cancelled`].
    Cancelled,
    /// See [`RunStatus::Failed`].
    Failed,
}

impl Default for RunStatusTag {
    fn default() -> Self {
        Self::Succeeded
    }
}

impl From<RunStatus> for RunStatusTag {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Succeeded => Self::Succeeded,
            RunStatus::PartialFailure => Self::PartialFailure,
            RunStatus::Cancelled => Self::Cancelled,
            RunStatus::Failed => Self::Failed,
        }
    }
}

impl RunMetrics {
    /// Derive metrics from a finished [`ScanResult`] and the run's measured
    /// wall-clock `duration`.
    pub fn from_scan_result(result: &ScanResult, duration: Duration) -> Self {
        let mut m = Self {
            workflow_name: result.workflow_name.clone(),
            target: result.target.clone(),
            duration_ms: duration.as_millis() as u64,
            status: result.status.into(),
            vulnerabilities_count: result.vulnerabilities.len() as u64,
            max_severity: result.max_severity().map(|s| s.to_string()),
            ..Self::default()
        };
        for outcome in result.task_outcomes.values() {
            match outcome.state {
                TaskState::Succeeded => m.succeeded_count += 1,
                TaskState::Failed => m.failed_count += 1,
                TaskState::Skipped => m.skipped_count += 1,
                TaskState::TimedOut => m.timed_out_count += 1,
                TaskState::Cancelled => m.cancelled_count += 1,
                TaskState::Pending | TaskState::Ready | TaskState::Running => {}
            }
        }
        m
    }
}

// ---------------------------------------------------------------------------
// MetricsSummary
// ---------------------------------------------------------------------------

/// Aggregated statistics across multiple recorded runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsSummary {
    /// Number of runs recorded.
    pub count: usize,
    /// Mean run duration in milliseconds.
    pub mean_duration_ms: f64,
    /// Median (p50) run duration in milliseconds.
    pub p50_duration_ms: f64,
    /// 99th-percentile run duration in milliseconds.
    pub p99_duration_ms: f64,
    /// Total vulnerabilities discovered across all runs.
    pub total_vulnerabilities: u64,
    /// Fraction of runs that did not end `Succeeded` (0.0-1.0).
    pub non_success_rate: f64,
    /// Per-workflow run counts (deterministic ordering).
    pub workflow_counts: BTreeMap<String, usize>,
}

impl Default for MetricsSummary {
    fn default() -> Self {
        Self {
            count: 0,
            mean_duration_ms: 0.0,
            p50_duration_ms: 0.0,
            p99_duration_ms: 0.0,
            total_vulnerabilities: 0,
            non_success_rate: 0.0,
            workflow_counts: BTreeMap::new(),
        }
    }
}

/// Compute a percentile value from a **sorted** slice.
fn percentile(sorted: &[u64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0] as f64;
    }
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] as f64 * (1.0 - frac) + sorted[upper] as f64 * frac
}

// ---------------------------------------------------------------------------
// MetricsCollector
// ---------------------------------------------------------------------------

/// Thread-safe collector for [`RunMetrics`].
///
/// Wrap in an `Arc` (or clone, since the inner storage is already behind an
/// `Arc<Mutex<_>>`) to share across a long-lived orchestrator instance.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<Vec<RunMetrics>>>,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    /// Create a new, empty collector.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Record one run's metrics.
    pub fn record(&self, metrics: RunMetrics) {
        let mut data = self.inner.lock().expect("metrics lock poisoned");
        data.push(metrics);
    }

    /// Return all recorded run metrics, in recording order.
    pub fn runs(&self) -> Vec<RunMetrics> {
        let data = self.inner.lock().expect("metrics lock poisoned");
        data.clone()
    }

    /// Number of runs recorded so far.
    pub fn len(&self) -> usize {
        let data = self.inner.lock().expect("metrics lock poisoned");
        data.len()
    }

    /// Whether the collector has no recorded runs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compute an aggregated summary of all recorded runs.
    pub fn summary(&self) -> MetricsSummary {
        let data = self.inner.lock().expect("metrics lock poisoned");
        if data.is_empty() {
            return MetricsSummary::default();
        }

        let count = data.len();
        let mut durations: Vec<u64> = data.iter().map(|r| r.duration_ms).collect();
        durations.sort_unstable();

        let total_duration: u64 = durations.iter().sum();
        let mean_duration_ms = total_duration as f64 / count as f64;
        let p50_duration_ms = percentile(&durations, 50.0);
        let p99_duration_ms = percentile(&durations, 99.0);

        let total_vulnerabilities: u64 = data.iter().map(|r| r.vulnerabilities_count).sum();
        let non_successes = data.iter().filter(|r| r.status != RunStatusTag::Succeeded).count();
        let non_success_rate = non_successes as f64 / count as f64;

        let mut workflow_counts: BTreeMap<String, usize> = BTreeMap::new();
        for r in data.iter() {
            *workflow_counts.entry(r.workflow_name.clone()).or_insert(0) += 1;
        }

        MetricsSummary {
            count,
            mean_duration_ms,
            p50_duration_ms,
            p99_duration_ms,
            total_vulnerabilities,
            non_success_rate,
            workflow_counts,
        }
    }

    /// Clear all recorded metrics.
    pub fn clear(&self) {
        let mut data = self.inner.lock().expect("metrics lock poisoned");
        data.clear();
    }
}

// ---------------------------------------------------------------------------
// TelemetrySpan
// ---------------------------------------------------------------------------

/// A structured span emitted through `tracing`, for correlating a run's
/// metrics with its log output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySpan {
    /// Span name / operation.
    pub name: String,
    /// Arbitrary key-value attributes (deterministic ordering).
    pub attributes: BTreeMap<String, String>,
}

impl TelemetrySpan {
    /// Create a new span with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Insert an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Emit the span via `tracing::info!`.
    pub fn emit(&self) {
        info!(
            target: "neosec.telemetry",
            span_name = %self.name,
            attributes = ?self.attributes,
            "telemetry_span"
        );
    }
}

// ---------------------------------------------------------------------------
// TelemetryExporter
// ---------------------------------------------------------------------------

/// Exports a [`MetricsSummary`] to some external sink.
pub trait TelemetryExporter: Send + Sync {
    /// Export the given summary. Returns the serialized output on success.
    fn export(&self, summary: &MetricsSummary) -> Result<String, String>;
}

/// Exports metrics as pretty-printed JSON.
#[derive(Debug, Default)]
pub struct JsonExporter;

impl TelemetryExporter for JsonExporter {
    fn export(&self, summary: &MetricsSummary) -> Result<String, String> {
        serde_json::to_string_pretty(summary).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neosec_core::{Affected, Severity, TaskOutcome, Vulnerability, VulnerabilityCategory};
    use std::thread;

    fn sample_result(workflow: &str, succeeded: usize, failed: usize) -> ScanResult {
        let mut r = ScanResult::new(workflow, "10.0.0.1", chrono::Utc::now());
        for i in 0..succeeded {
            r.task_outcomes.insert(
                format!("ok-{i}"),
                TaskOutcome { state: TaskState::Succeeded, duration: None, detail: None },
            );
        }
        for i in 0..failed {
            r.task_outcomes.insert(
                format!("bad-{i}"),
                TaskOutcome { state: TaskState::Failed, duration: None, detail: None },
            );
        }
        r.derive_status();
        r
    }

    #[test]
    fn from_scan_result_counts_states() {
        let result = sample_result("wf", 2, 1);
        let metrics = RunMetrics::from_scan_result(&result, Duration::from_millis(500));
        assert_eq!(metrics.succeeded_count, 2);
        assert_eq!(metrics.failed_count, 1);
        assert_eq!(metrics.status, RunStatusTag::PartialFailure);
        assert_eq!(metrics.duration_ms, 500);
    }

    #[test]
    fn from_scan_result_captures_max_severity() {
        let mut result = sample_result("wf", 1, 0);
        result.vulnerabilities.push(Vulnerability {
            id: "v1".into(),
            name: "n".into(),
            description: "d".into(),
            severity: Severity::High,
            cvss: None,
            cve: vec![],
            category: VulnerabilityCategory::Other,
            affected: Affected::Url { url: "https://x".into() },
            evidence: String::new(),
            timestamp: chrono::Utc::now(),
        });
        let metrics = RunMetrics::from_scan_result(&result, Duration::from_secs(1));
        assert_eq!(metrics.vulnerabilities_count, 1);
        assert_eq!(metrics.max_severity.as_deref(), Some("high"));
    }

    #[test]
    fn collector_new_is_empty() {
        let c = MetricsCollector::new();
        assert!(c.is_empty());
    }

    #[test]
    fn collector_record_and_runs() {
        let c = MetricsCollector::new();
        let result = sample_result("wf", 1, 0);
        c.record(RunMetrics::from_scan_result(&result, Duration::from_millis(10)));
        assert_eq!(c.len(), 1);
        assert_eq!(c.runs()[0].workflow_name, "wf");
    }

    #[test]
    fn collector_clear() {
        let c = MetricsCollector::new();
        c.record(RunMetrics::default());
        c.clear();
        assert!(c.is_empty());
    }

    #[test]
    fn empty_summary_has_zeroed_fields() {
        let s = MetricsCollector::new().summary();
        assert_eq!(s.count, 0);
        assert_eq!(s.mean_duration_ms, 0.0);
        assert!(s.workflow_counts.is_empty());
    }

    #[test]
    fn summary_mean_and_percentiles() {
        let c = MetricsCollector::new();
        for d in [10u64, 20, 30, 40, 50] {
            c.record(RunMetrics { duration_ms: d, workflow_name: "wf".into(), ..Default::default() });
        }
        let s = c.summary();
        assert!((s.mean_duration_ms - 30.0).abs() < f64::EPSILON);
        assert!((s.p50_duration_ms - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_non_success_rate() {
        let c = MetricsCollector::new();
        c.record(RunMetrics { status: RunStatusTag::Succeeded, ..Default::default() });
        c.record(RunMetrics { status: RunStatusTag::Failed, ..Default::default() });
        let s = c.summary();
        assert!((s.non_success_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_workflow_counts() {
        let c = MetricsCollector::new();
        c.record(RunMetrics { workflow_name: "alpha".into(), ..Default::default() });
        c.record(RunMetrics { workflow_name: "beta".into(), ..Default::default() });
        c.record(RunMetrics { workflow_name: "alpha".into(), ..Default::default() });
        let s = c.summary();
        assert_eq!(s.workflow_counts["alpha"], 2);
        assert_eq!(s.workflow_counts["beta"], 1);
    }

    #[test]
    fn concurrent_recording_is_safe() {
        let c = MetricsCollector::new();
        let mut handles = vec![];
        for i in 0..10 {
            let cc = c.clone();
            handles.push(thread::spawn(move || {
                cc.record(RunMetrics { duration_ms: i, ..Default::default() });
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(c.len(), 10);
    }

    #[test]
    fn json_exporter_roundtrip() {
        let c = MetricsCollector::new();
        c.record(RunMetrics::default());
        let s = c.summary();
        let json = JsonExporter.export(&s).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["count"], 1);
    }

    #[test]
    fn telemetry_span_attributes() {
        let span = TelemetrySpan::new("scan").with_attribute("workflow", "wf");
        assert_eq!(span.attributes["workflow"], "wf");
    }

    #[test]
    fn percentile_empty_and_single() {
        assert_eq!(percentile(&[], 50.0), 0.0);
        assert_eq!(percentile(&[7], 99.0), 7.0);
    }
}

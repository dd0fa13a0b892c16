// SPDX-License-Identifier: MIT OR Apache-2.0
//! Unified error taxonomy for the NeoSec orchestration core.
//!
//! Every error raised anywhere in the core carries a stable [`ErrorCode`] (a
//! machine-readable tag that the taxonomy in the specification names by
//! kind), a human-readable message, an optional cause chain, and arbitrary
//! key-value context. Build one with [`NeoSecError::new`] and the fluent
//! `with_*` methods.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// Broad subsystem family that an [`ErrorCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Target/option validation at parse time.
    Input,
    /// Workflow DAG structure errors (cycles, dangling dependencies).
    Workflow,
    /// Extension bus / adapter contract errors.
    Adapter,
    /// Subprocess executor errors.
    Process,
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Input => "input",
            Self::Workflow => "workflow",
            Self::Adapter => "adapter",
            Self::Process => "process",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Machine-readable, stable error code.
///
/// Each variant mirrors one row of the error taxonomy: every recovery
/// decision in the scheduler is made by matching on this code, never by
/// inspecting a message string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // -- Input --
    /// Target or option value failed validation (e.g. shell metacharacters).
    InvalidInput,

    // -- Workflow --
    /// The dependency graph contains a cycle.
    WorkflowCycle,
    /// A `depends_on` entry names a task id that does not exist.
    WorkflowUnknownDependency,
    /// Two tasks in the same workflow share an id.
    WorkflowDuplicateTaskId,

    // -- Adapter / Extension bus --
    /// A single-responder hook returned zero or more than one result.
    AdapterResolutionError,
    /// An adapter's required binary is not present on `PATH` (or configured path).
    BinaryMissing,
    /// `parse_output` could not make sense of the raw captured output.
    DataParsingError,

    // -- Process / Executor --
    /// The OS refused to spawn the child process.
    SpawnFailed,
    /// The child ran past its allotted wall-clock timeout and was killed.
    SubprocessTimeoutError,
    /// A captured stream hit its size cap and was truncated.
    OutputTruncated,
    /// The run (or an individual task) was cancelled by caller request.
    CancellationRequested,

    // -- Internal --
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl ErrorCode {
    /// Returns the broad [`ErrorCategory`] this code belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput => ErrorCategory::Input,

            Self::WorkflowCycle
            | Self::WorkflowUnknownDependency
            | Self::WorkflowDuplicateTaskId => ErrorCategory::Workflow,

            Self::AdapterResolutionError | Self::BinaryMissing | Self::DataParsingError => {
                ErrorCategory::Adapter
            }

            Self::SpawnFailed
            | Self::SubprocessTimeoutError
            | Self::OutputTruncated
            | Self::CancellationRequested => ErrorCategory::Process,

            Self::Internal => ErrorCategory::Internal,
        }
    }

    /// Stable `&'static str` representation (e.g. `"WORKFLOW_CYCLE"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::WorkflowCycle => "WORKFLOW_CYCLE",
            Self::WorkflowUnknownDependency => "WORKFLOW_UNKNOWN_DEPENDENCY",
            Self::WorkflowDuplicateTaskId => "WORKFLOW_DUPLICATE_TASK_ID",
            Self::AdapterResolutionError => "ADAPTER_RESOLUTION_ERROR",
            Self::BinaryMissing => "BINARY_MISSING",
            Self::DataParsingError => "DATA_PARSING_ERROR",
            Self::SpawnFailed => "SPAWN_FAILED",
            Self::SubprocessTimeoutError => "SUBPROCESS_TIMEOUT_ERROR",
            Self::OutputTruncated => "OUTPUT_TRUNCATED",
            Self::CancellationRequested => "CANCELLATION_REQUESTED",
            Self::Internal => "INTERNAL",
        }
    }

    /// Whether this code represents a pre-execution (run-aborting) failure,
    /// as opposed to a per-task outcome.
    pub fn aborts_run(&self) -> bool {
        matches!(
            self,
            Self::WorkflowCycle
                | Self::WorkflowUnknownDependency
                | Self::WorkflowDuplicateTaskId
                | Self::AdapterResolutionError
                | Self::BinaryMissing
                | Self::InvalidInput
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// NeoSecError
// ---------------------------------------------------------------------------

/// Unified NeoSec error.
///
/// Carries a stable [`ErrorCode`], a human-readable message, an optional
/// source error for cause-chaining, and arbitrary structured context.
///
/// # Builder usage
///
/// ```
/// use neosec_error::{NeoSecError, ErrorCode};
///
/// let err = NeoSecError::new(ErrorCode::SubprocessTimeoutError, "nmap exceeded its timeout")
///     .with_context("task_id", "port-scan")
///     .with_context("timeout_secs", 30);
/// ```
pub struct NeoSecError {
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Optional underlying cause.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// Arbitrary structured context for diagnostics.
    pub context: BTreeMap<String, serde_json::Value>,
}

impl NeoSecError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
            context: BTreeMap::new(),
        }
    }

    /// Attach a key-value pair to the diagnostic context.
    ///
    /// The value is converted via [`serde_json::to_value`]; if serialisation
    /// fails, the entry is silently skipped.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Attach an underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Shorthand for `self.code.category()`.
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }
}

impl fmt::Debug for NeoSecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("NeoSecError");
        d.field("code", &self.code);
        d.field("message", &self.message);
        if let Some(ref src) = self.source {
            d.field("source", &src.to_string());
        }
        if !self.context.is_empty() {
            d.field("context", &self.context);
        }
        d.finish()
    }
}

impl fmt::Display for NeoSecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)?;
        if !self.context.is_empty() {
            // Deterministic output thanks to BTreeMap.
            if let Ok(ctx) = serde_json::to_string(&self.context) {
                write!(f, " {ctx}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for NeoSecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

// ---------------------------------------------------------------------------
// Serialization support
// ---------------------------------------------------------------------------

/// Serialisable snapshot of a [`NeoSecError`] (without the opaque source).
///
/// Used to embed error detail into a [`ScanResult`](neosec_core::ScanResult)
/// or a persisted report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NeoSecErrorDto {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Structured context.
    pub context: BTreeMap<String, serde_json::Value>,
    /// String representation of the source error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_message: Option<String>,
}

impl From<&NeoSecError> for NeoSecErrorDto {
    fn from(err: &NeoSecError) -> Self {
        Self {
            code: err.code,
            message: err.message.clone(),
            context: err.context.clone(),
            source_message: err.source.as_ref().map(|s| s.to_string()),
        }
    }
}

impl From<NeoSecErrorDto> for NeoSecError {
    fn from(dto: NeoSecErrorDto) -> Self {
        Self {
            code: dto.code,
            message: dto.message,
            source: None,
            context: dto.context,
        }
    }
}

/// Convenience alias used throughout the core crates.
pub type Result<T> = std::result::Result<T, NeoSecError>;

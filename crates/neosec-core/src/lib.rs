// SPDX-License-Identifier: MIT OR Apache-2.0
//! Normalized data model, workflow DAG, and adapter contract for NeoSec.
//!
//! This crate is pure values and pure validation: no I/O, no process
//! spawning, no async runtime. [`neosec_executor`] and [`neosec_scheduler`]
//! (companion crates) drive the side-effecting parts of a run.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
mod asset;
mod binary;
mod cvss;
mod duration_secs;
mod host;
mod option_value;
mod port;
mod scan_result;
mod severity;
mod subdomain;
mod target;
mod task_spec;
mod task_state;
mod validate;
mod vulnerability;
mod webapp;
mod workflow_spec;

pub use adapter::{Adapter, FormatHint, ParsedResult, ToolCategory, ToolDescriptor};
pub use asset::Asset;
pub use binary::{BinaryResolution, BinarySource};
pub use cvss::{Cvss, CvssVersion};
pub use host::Host;
pub use option_value::OptionValue;
pub use port::{Port, PortState, Protocol};
pub use scan_result::{RunStatus, ScanResult, TaskOutcome};
pub use severity::Severity;
pub use subdomain::Subdomain;
pub use target::Target;
pub use task_spec::TaskSpec;
pub use task_state::TaskState;
pub use validate::reject_shell_metacharacters;
pub use vulnerability::{Affected, Vulnerability, VulnerabilityCategory};
pub use webapp::WebApp;
pub use workflow_spec::WorkflowSpec;

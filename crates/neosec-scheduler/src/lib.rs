// SPDX-License-Identifier: MIT OR Apache-2.0
//! The DAG scheduler: turns a validated [`neosec_core::WorkflowSpec`] plus a
//! registered [`neosec_bus::AdapterRegistry`] into a completed
//! [`neosec_core::ScanResult`].

#![warn(missing_docs)]

mod engine;

pub use engine::{run_workflow, RunOptions};
pub use neosec_executor::CancelToken;

// SPDX-License-Identifier: MIT OR Apache-2.0
//! The extension bus: an [`AdapterRegistry`] for single-responder tool
//! dispatch, and a [`HookBus`] for broadcast lifecycle events.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod hooks;
mod registry;

pub use hooks::{HookBus, LoggingHook, ScanHook};
pub use registry::AdapterRegistry;

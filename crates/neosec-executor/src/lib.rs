// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sandboxed subprocess executor: argv spawning with no shell
//! interpolation, process-group isolation, concurrent bounded output
//! capture, and timeout/cancellation handling.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cancel;
mod kill;
mod output;
mod pool;
mod run;

pub use cancel::CancelToken;
pub use kill::isolate_process_group;
pub use output::Captured;
pub use pool::ExecutorPool;
pub use run::{
    run as execute, ExecOptions, ExecutionOutcome, Termination, DEFAULT_GRACE_PERIOD,
    DEFAULT_MAX_OUTPUT_BYTES,
};

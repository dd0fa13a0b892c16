// SPDX-License-Identifier: MIT OR Apache-2.0
//! Process-group isolation and group-wide termination.
//!
//! Tools like `nmap` or `nikto` sometimes fork helper processes; killing
//! only the immediate child leaves orphans behind. Every spawned tool runs
//! in its own process group (pgid == pid) so the whole tree can be
//! terminated in one signal.

use std::process::Stdio;
use tokio::process::Command;

/// Put the spawned child in a new process group of its own, so its pid also
/// becomes the group's pgid.
#[cfg(unix)]
pub fn isolate_process_group(cmd: &mut Command) {
    cmd.process_group(0);
}

#[cfg(not(unix))]
pub fn isolate_process_group(_cmd: &mut Command) {}

/// Send `SIGTERM` to every process in `pgid`'s group.
///
/// A process whose group has already exited is not an error.
#[cfg(unix)]
#[allow(unsafe_code)]
pub fn terminate_group(pgid: i32) {
    // SAFETY: libc::kill with a negative pid targets the process group;
    // it is always safe to call and returns -1/ESRCH if the group is gone.
    unsafe {
        libc::kill(-pgid, libc::SIGTERM);
    }
}

/// Send `SIGKILL` to every process in `pgid`'s group.
#[cfg(unix)]
#[allow(unsafe_code)]
pub fn kill_group(pgid: i32) {
    // SAFETY: see `terminate_group`.
    unsafe {
        libc::kill(-pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
pub fn terminate_group(_pgid: i32) {}

#[cfg(not(unix))]
pub fn kill_group(_pgid: i32) {}

pub(crate) fn base_command(binary: &str) -> Command {
    let mut cmd = Command::new(binary);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    isolate_process_group(&mut cmd);
    cmd
}

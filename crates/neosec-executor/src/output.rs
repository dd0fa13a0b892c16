// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bounded, deadlock-free capture of a child's stdout/stderr.
//!
//! Each stream is drained by its own task so that a tool which fills one
//! pipe's OS buffer while waiting for the other to be read can never
//! stall the run. Capture stops accumulating past `max_bytes` but keeps
//! reading (and discarding) so the child is never blocked on a full pipe.

use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;

/// Captured bytes from one stream, with a flag for whether the cap was hit.
#[derive(Debug, Clone, Default)]
pub struct Captured {
    /// Bytes retained, up to the configured cap.
    pub bytes: Vec<u8>,
    /// `true` if more bytes were produced than the cap allowed.
    pub truncated: bool,
}

/// Read `reader` to EOF, retaining at most `max_bytes` and discarding the
/// rest while continuing to drain so the writer is never blocked.
pub async fn drain_capped<R: AsyncRead + Unpin>(mut reader: R, max_bytes: usize) -> Captured {
    let mut buf = [0u8; 16 * 1024];
    let mut out = Captured::default();
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(_) => break,
        };
        if out.bytes.len() < max_bytes {
            let take = (max_bytes - out.bytes.len()).min(n);
            out.bytes.extend_from_slice(&buf[..take]);
            if take < n {
                out.truncated = true;
            }
        } else {
            out.truncated = true;
        }
    }
    out
}

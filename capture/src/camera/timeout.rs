//! Wall-clock bounds for blocking device calls.
//!
//! The operation runs on its own thread while the caller waits on a channel
//! with a deadline. On timeout the thread is abandoned: whatever it returns
//! later is dropped along with the closed channel, which releases any device
//! handle it carried.

use crate::error::{CaptureError, Result};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Runs `op` on a named helper thread and waits at most `timeout` for it.
///
/// # Arguments
/// * `name` - Thread name, also used in the timeout error
/// * `timeout` - Maximum wait
/// * `op` - Blocking operation
///
/// # Returns
/// * The operation's own result when it finishes in time
/// * `Err(CaptureError::Timeout)` when the deadline passes first
pub fn run_with_timeout<T, F>(name: &str, timeout: Duration, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            // The receiver is gone after a timeout; the result is dropped here.
            let _ = tx.send(op());
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(CaptureError::Timeout(format!(
            "{} did not finish within {:.1}s",
            name,
            timeout.as_secs_f64()
        ))),
        Err(RecvTimeoutError::Disconnected) => Err(CaptureError::Camera(format!(
            "{} stopped without a result",
            name
        ))),
    }
}

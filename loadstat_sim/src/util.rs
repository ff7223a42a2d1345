use std::time::{Duration, Instant};

use crate::error::{Result, SimError};

/// Wait until `done` returns true, or fail once `timeout` expires.
/// Sleeps in small intervals to avoid CPU spinning.
pub fn wait_until_with_timeout(
    mut done: impl FnMut() -> bool,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    while !done() {
        if Instant::now() >= deadline {
            return Err(SimError::DrainTimeout(timeout));
        }
        std::thread::sleep(poll_interval);
    }
    Ok(())
}

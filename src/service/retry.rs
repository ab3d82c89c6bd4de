//! Bounded retry with exponential backoff for service calls.

use std::thread;
use std::time::Duration;

use crate::error::Error;

/// Outcome of a single failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Transport problems, throttling, server errors.
    Transient(String),
    /// Anything retrying will not fix (unknown identifier, bad body).
    Permanent(String),
}

/// Run `op` up to `max_attempts` times, sleeping `backoff`, `2 * backoff`, …
/// between transient failures. The last failure becomes [`Error::Lookup`].
pub fn with_retry<T>(
    max_attempts: u32,
    backoff: Duration,
    mut op: impl FnMut() -> Result<T, Failure>,
) -> Result<T, Error> {
    let mut delay = backoff;
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(Failure::Transient(msg)) if attempt < max_attempts => {
                log::info!("attempt {attempt}/{max_attempts} failed: {msg}; retrying");
                thread::sleep(delay);
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(Failure::Transient(msg)) => {
                return Err(Error::Lookup(format!("{msg} (after {attempt} attempts)")));
            }
            Err(Failure::Permanent(msg)) => return Err(Error::Lookup(msg)),
        }
    }
}

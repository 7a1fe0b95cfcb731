//! Whole-chain polling.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use uiinspect_protocols::{AccessError, SelectorError};

use super::error::{LevelFailure, ResolveError, StaleFailure};

/// Outcome of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    Found(T),
    /// Retryable until the deadline.
    NotFound(LevelFailure),
    /// Terminal unless the poller retries stale attempts. An unavailable
    /// backend is always retried.
    Stale(StaleFailure),
    /// Never retried.
    Syntax(SelectorError),
}

/// Fixed-interval retry bounded by a wall-clock timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    pub timeout: Duration,
    pub interval: Duration,
    pub retry_on_stale: bool,
}

impl Default for Poller {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            interval: Duration::from_millis(500),
            retry_on_stale: false,
        }
    }
}

impl Poller {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            interval,
            retry_on_stale: false,
        }
    }

    pub fn with_retry_on_stale(mut self, retry_on_stale: bool) -> Self {
        self.retry_on_stale = retry_on_stale;
        self
    }

    fn retries_stale(&self, failure: &StaleFailure) -> bool {
        self.retry_on_stale || matches!(failure.error, AccessError::Unavailable(_))
    }

    /// Run `attempt` until it finds something, fails terminally, or the
    /// timeout measured from this call expires.
    ///
    /// The first attempt always runs, even with a zero timeout. On expiry the
    /// last retryable failure is wrapped in [`ResolveError::Timeout`].
    pub fn until<T>(&self, mut attempt: impl FnMut() -> Attempt<T>) -> Result<T, ResolveError> {
        let start = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let last = match attempt() {
                Attempt::Found(value) => return Ok(value),
                Attempt::Syntax(err) => return Err(ResolveError::Selector(err)),
                Attempt::Stale(failure) if !self.retries_stale(&failure) => {
                    warn!(attempt = attempts, "Stale element: {}", failure);
                    return Err(ResolveError::Stale(failure));
                }
                Attempt::Stale(failure) => ResolveError::Stale(failure),
                Attempt::NotFound(failure) => ResolveError::NotFound(failure),
            };

            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                warn!(attempts, elapsed = ?elapsed, "Polling timed out: {}", last);
                return Err(ResolveError::Timeout {
                    timeout: self.timeout,
                    elapsed,
                    attempts,
                    last: Box::new(last),
                });
            }

            let pause = self.interval.min(self.timeout - elapsed);
            debug!(attempt = attempts, pause = ?pause, "Attempt failed, retrying: {}", last);
            thread::sleep(pause);
        }
    }
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;

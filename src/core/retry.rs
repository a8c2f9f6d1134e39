//! Retry policy for flaky backend calls.
//!
//! A policy is a maximum attempt count plus a backoff that maps the number of the
//! attempt that just failed to the delay before the next one. The default backoff is
//! a fixed delay between attempts.

use crate::errors::Result;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy)]
pub enum Backoff {
    /// Same delay after every failed attempt
    Fixed(Duration),
    /// `base * attempt`
    Linear(Duration),
    /// Caller-supplied schedule, given the 1-based attempt that just failed
    Custom(fn(u32) -> Duration),
}

impl Backoff {
    /// Delay before the attempt following `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Linear(base) => base.saturating_mul(attempt),
            Self::Custom(schedule) => schedule(attempt),
        }
    }
}

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts including the first; values below 1 behave as 1
    pub max_attempts: u32,
    /// Wait between attempts
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// `max_attempts` tries with a constant delay.
    #[must_use]
    pub const fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed(delay),
        }
    }

    /// One attempt, no retries.
    #[must_use]
    pub const fn none() -> Self {
        Self::fixed(1, Duration::ZERO)
    }

    /// Same attempts, different wait.
    #[must_use]
    pub const fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error, or the
    /// attempts are used up. The last error is returned when retries are exhausted.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match operation(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(label, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) if attempt >= max_attempts => {
                    warn!(label, attempt, error = %e, "Giving up after final attempt");
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.backoff.delay_after(attempt);
                    warn!(label, attempt, max_attempts, ?delay, error = %e, "Attempt failed, retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(3, Duration::from_secs(1))
    }
}

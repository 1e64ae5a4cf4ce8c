//! Bounded retry with exponential backoff for document saves.

use crate::error::Result;
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How often, and how patiently, a failed persist is retried.
///
/// Only transient failures are retried (see [`crate::error::Error::is_transient`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_backoff_ms: u64,
    /// Upper bound for any single delay
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 250,
            max_backoff_ms: 4000,
        }
    }
}

impl RetryPolicy {
    /// Upper limit for `max_attempts`.
    pub const MAX_ATTEMPTS_LIMIT: u32 = 10;

    /// A single attempt, no retries.
    #[cfg(test)]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    /// Delay before retry number `retry` (1-based), doubling each time.
    pub fn backoff(&self, retry: u32) -> Duration {
        let shift = retry.saturating_sub(1).min(32);
        let delay = self
            .initial_backoff_ms
            .saturating_mul(1u64 << shift)
            .min(self.max_backoff_ms);
        Duration::from_millis(delay)
    }

    /// Clamp values loaded from disk into a usable range.
    pub fn sanitize(&mut self) {
        self.max_attempts = self.max_attempts.clamp(1, Self::MAX_ATTEMPTS_LIMIT);
        if self.max_backoff_ms < self.initial_backoff_ms {
            self.max_backoff_ms = self.initial_backoff_ms;
        }
    }

    /// Time spent waiting between attempts when every retry is used.
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts).map(|retry| self.backoff(retry)).sum()
    }

    /// Lower the delays so that using every retry waits at most `budget`.
    /// The number of attempts is kept.
    pub fn fit_within(&mut self, budget: Duration) {
        let retries = u64::from(self.max_attempts.saturating_sub(1));
        if retries == 0 || self.total_backoff() <= budget {
            return;
        }
        let budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX);
        self.max_backoff_ms = self.max_backoff_ms.min(budget_ms / retries);
        self.initial_backoff_ms = self.initial_backoff_ms.min(self.max_backoff_ms);
    }

    /// Run `op`, retrying transient failures. `sleep` is called between
    /// attempts with the backoff delay.
    pub fn run<T>(
        &self,
        mut op: impl FnMut() -> Result<T>,
        mut sleep: impl FnMut(Duration),
    ) -> Result<T> {
        let mut attempt = 1;
        loop {
            match op() {
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    let delay = self.backoff(attempt);
                    warn!(
                        "Attempt {}/{} failed: {}. Retrying in {:?}",
                        attempt, self.max_attempts, e, delay
                    );
                    sleep(delay);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

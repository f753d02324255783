//! Bounded retry with randomized exponential backoff.

use anyhow::Result;
use log::debug;
use rand::Rng;
use std::time::Duration;

use crate::errors::is_input_error;
use crate::utils::config::RetryConsts;

/// Attempt budget plus backoff bounds. Wait before attempt `n + 1` is drawn uniformly from
/// `[min_backoff, min(max_backoff, min_backoff * 2^(n-1))]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub min_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: RetryConsts::MAX_ATTEMPTS,
            min_backoff: RetryConsts::MIN_BACKOFF,
            max_backoff: RetryConsts::MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// No waiting between attempts (tests, library callers that pace themselves).
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            min_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Randomized wait after failed attempt `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        let ceiling = self
            .min_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
            .max(self.min_backoff);
        if ceiling.is_zero() || ceiling == self.min_backoff {
            return ceiling;
        }
        let millis = rand::rng().random_range(self.min_backoff.as_millis()..=ceiling.as_millis());
        Duration::from_millis(millis as u64)
    }

    /// Run `op` until it succeeds, fails with an input error, or the budget is spent.
    /// `op` receives the 1-based attempt number; `on_retry` is told about each failure
    /// that will be retried, with the wait about to be taken.
    pub fn run<T, F, R>(&self, mut op: F, mut on_retry: R) -> Result<(T, u32)>
    where
        F: FnMut(u32) -> Result<T>,
        R: FnMut(u32, &anyhow::Error, Duration),
    {
        let attempts = self.attempts();
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok((value, attempt)),
                Err(e) if is_input_error(&e) || attempt >= attempts => {
                    return Err(e.context(format!(
                        "failed after {attempt} attempt{}",
                        if attempt == 1 { "" } else { "s" }
                    )));
                }
                Err(e) => {
                    let wait = self.backoff(attempt);
                    on_retry(attempt, &e, wait);
                    debug!("attempt {attempt}/{attempts} failed; retrying in {wait:?}");
                    if !wait.is_zero() {
                        std::thread::sleep(wait);
                    }
                    attempt += 1;
                }
            }
        }
    }
}

//! Timeout and retry policy for collaborator calls.
//!
//! Each attempt is bounded by a timeout. Transient failures (timeouts,
//! network errors, 429/5xx) are retried with exponential backoff:
//! `base_delay * 2^attempt`, capped at `max_delay`. Other failures are
//! returned immediately.

use log::warn;
use std::future::Future;
use std::time::Duration;

use crate::config::schema::CallConfig;
use crate::error::{GeocodeError, TravelError};

/// Errors a [`CallPolicy`] knows how to classify.
pub trait RetryableError: std::fmt::Display {
    fn is_transient(&self) -> bool;

    /// The error reported when an attempt exceeds the timeout.
    fn timed_out(after: Duration) -> Self;
}

impl RetryableError for GeocodeError {
    fn is_transient(&self) -> bool {
        GeocodeError::is_transient(self)
    }

    fn timed_out(after: Duration) -> Self {
        GeocodeError::Timeout(after)
    }
}

impl RetryableError for TravelError {
    fn is_transient(&self) -> bool {
        TravelError::is_transient(self)
    }

    fn timed_out(after: Duration) -> Self {
        TravelError::Timeout(after)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl CallPolicy {
    pub fn from_config(config: &CallConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }

    /// Backoff before retry number `attempt + 1`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Runs `operation` under this policy.
    pub async fn call<F, Fut, T, E>(&self, what: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RetryableError,
    {
        let mut attempt = 0;

        loop {
            let outcome = match tokio::time::timeout(self.timeout, operation()).await {
                Ok(result) => result,
                Err(_) => Err(E::timed_out(self.timeout)),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        what,
                        attempt + 1,
                        self.max_retries + 1,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self::from_config(&CallConfig::default())
    }
}

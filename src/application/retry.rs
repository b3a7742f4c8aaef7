//! Retry policy shared by collaborator calls.
//!
//! Each attempt runs under its own timeout; an attempt that times out
//! counts as a retryable failure. Backoff grows geometrically and is
//! capped at `max_backoff`. A delay requested by the collaborator (a rate
//! limit's `Retry-After`) replaces the computed backoff, under the same cap.

use std::future::Future;
use std::time::Duration;

use crate::ports::{AIError, HandoffError, SpeechError, TelephonyError};

/// Errors the policy knows how to classify.
pub trait RetryableError: Sized {
    fn is_retryable(&self) -> bool;

    /// Error standing for an attempt that exceeded its timeout.
    fn timed_out(after: Duration) -> Self;

    /// Delay the collaborator asked for before the next attempt.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl RetryableError for AIError {
    fn is_retryable(&self) -> bool {
        AIError::is_retryable(self)
    }

    fn timed_out(after: Duration) -> Self {
        AIError::timeout(after)
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            AIError::RateLimited { retry_after_secs } => {
                Some(Duration::from_secs(u64::from(*retry_after_secs)))
            }
            _ => None,
        }
    }
}

impl RetryableError for SpeechError {
    fn is_retryable(&self) -> bool {
        matches!(self, SpeechError::Unavailable(_))
    }

    fn timed_out(after: Duration) -> Self {
        SpeechError::Unavailable(format!("timed out after {}ms", after.as_millis()))
    }
}

impl RetryableError for HandoffError {
    fn is_retryable(&self) -> bool {
        matches!(self, HandoffError::Unavailable(_))
    }

    fn timed_out(after: Duration) -> Self {
        HandoffError::Unavailable(format!("timed out after {}ms", after.as_millis()))
    }
}

impl RetryableError for TelephonyError {
    fn is_retryable(&self) -> bool {
        matches!(self, TelephonyError::Unavailable(_))
    }

    fn timed_out(after: Duration) -> Self {
        TelephonyError::Unavailable(format!("timed out after {}ms", after.as_millis()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. At least 1.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: f64,
    pub max_backoff: Duration,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(250),
            multiplier: 2.0,
            max_backoff: Duration::from_secs(5),
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration, attempt_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            attempt_timeout,
            ..Self::default()
        }
    }

    /// Single attempt, no backoff.
    pub fn no_retry(attempt_timeout: Duration) -> Self {
        Self::new(1, Duration::ZERO, attempt_timeout)
    }

    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    /// Delay before attempt `attempt + 1`, where `attempt` is 1-based.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(attempt.saturating_sub(1) as i32);
        let millis = (self.initial_backoff.as_millis() as f64 * factor).min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(millis as u64)
    }

    /// Delay before the attempt following `err` on attempt `attempt`.
    pub fn delay_after<E: RetryableError>(&self, err: &E, attempt: u32) -> Duration {
        match err.retry_after() {
            Some(requested) => requested.min(self.max_backoff),
            None => self.backoff_for(attempt),
        }
    }

    /// Run `operation` until it succeeds, fails permanently, or attempts
    /// run out. Returns the last error on exhaustion.
    pub async fn run<T, E, F, Fut>(&self, operation_name: &str, mut operation: F) -> Result<T, E>
    where
        E: RetryableError + std::fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let result = match tokio::time::timeout(self.attempt_timeout, operation(attempt)).await {
                Ok(result) => result,
                Err(_) => Err(E::timed_out(self.attempt_timeout)),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let backoff = self.delay_after(&err, attempt);
                    tracing::warn!(
                        operation = operation_name,
                        attempt,
                        max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "attempt failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::warn!(operation = operation_name, attempt, error = %err, "giving up");
                    return Err(err);
                }
            }
        }
    }
}

//! Retry with capped exponential backoff
//!
//! One policy object is shared by the source and destination clients so that
//! every outbound call retries the same way. Only errors reporting
//! [`EtlError::is_transient`] are retried; everything else is returned
//! immediately.

use crate::domain::{ApiError, EtlError, Result};
use std::future::Future;
use std::time::Duration;

/// Bounded retry policy with multiplicative, capped delays
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
}

impl RetryPolicy {
    /// Create a new policy
    ///
    /// `max_attempts` counts the first attempt, so `1` disables retries.
    /// A zero value is treated as `1`.
    pub fn new(max_attempts: usize, base_delay: Duration, max_delay: Duration, multiplier: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: max_delay.max(base_delay),
            multiplier: if multiplier.is_finite() && multiplier >= 1.0 {
                multiplier
            } else {
                1.0
            },
        }
    }

    /// Policy that never waits between attempts
    pub fn immediate(max_attempts: usize) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO, 1.0)
    }

    /// Maximum number of attempts, including the first one
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as usize) as i32;
        let base_ms = self.base_delay.as_millis() as f64;
        let max_ms = self.max_delay.as_millis() as f64;
        let delay_ms = (base_ms * self.multiplier.powi(exponent)).min(max_ms);
        Duration::from_millis(delay_ms as u64)
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempt
    /// budget is spent
    ///
    /// A transient API error that survives every attempt is converted into
    /// [`ApiError::ExternalService`] carrying the last status and reason.
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(
                            operation = operation_name,
                            attempt = attempt,
                            "Request succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    if attempt >= self.max_attempts {
                        tracing::error!(
                            operation = operation_name,
                            attempts = attempt,
                            error = %e,
                            "Retries exhausted"
                        );
                        return Err(exhausted(e, attempt));
                    }

                    let delay = self.delay_for_attempt(attempt);
                    crate::log_retry_attempt!(attempt, self.max_attempts, e);
                    tracing::debug!(
                        operation = operation_name,
                        delay_ms = delay.as_millis() as u64,
                        "Waiting before next attempt"
                    );

                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(60), 2.0)
    }
}

fn exhausted(error: EtlError, attempts: usize) -> EtlError {
    match error {
        EtlError::Api(ApiError::Transient { status, reason }) => {
            EtlError::Api(ApiError::ExternalService {
                status,
                reason: format!("{reason} (gave up after {attempts} attempts)"),
            })
        }
        other => other,
    }
}

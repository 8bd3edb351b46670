//! Timeouts and bounded retry for read-only RPC calls.
//!
//! Transactions are never retried: a resubmitted `send` would pay twice.

use std::{future::Future, time::Duration};

use eyre::{eyre, Result};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
    /// Upper bound for a single attempt
    pub call_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Single attempt, no backoff.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Backoff before retry number `attempt` (0-indexed).
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let backoff_secs =
            self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        let capped = backoff_secs.min(self.max_backoff.as_secs_f64());
        Duration::from_secs_f64(capped)
    }

    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// RPC timeout, dropped connection, rate limiting
    Transient,
    /// Reverts and malformed requests; the same call fails again
    Permanent,
    Unknown,
}

pub fn classify_error(error: &str) -> ErrorClass {
    let error_lower = error.to_lowercase();

    if error_lower.contains("revert")
        || error_lower.contains("invalid params")
        || error_lower.contains("invalid argument")
        || error_lower.contains("insufficient funds")
        || error_lower.contains("not valid utf-8")
    {
        return ErrorClass::Permanent;
    }

    if error_lower.contains("timeout")
        || error_lower.contains("timed out")
        || error_lower.contains("connection")
        || error_lower.contains("network")
        || error_lower.contains("rate limit")
        || error_lower.contains("too many requests")
        || error_lower.contains("502")
        || error_lower.contains("503")
        || error_lower.contains("temporarily unavailable")
    {
        return ErrorClass::Transient;
    }

    ErrorClass::Unknown
}

/// Runs `operation` under the per-attempt timeout, retrying transient and
/// unknown failures with exponential backoff.
pub async fn with_retry<F, T, Fut>(config: &RetryConfig, what: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        let error = match tokio::time::timeout(config.call_timeout, operation()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e,
            Err(_) => eyre!("{what} timed out after {:?}", config.call_timeout),
        };

        let error_str = format!("{error:#}");
        let class = classify_error(&error_str);
        if class == ErrorClass::Permanent || !config.should_retry(attempt) {
            debug!(what, attempt, ?class, error = %error_str, "giving up");
            return Err(error);
        }

        let backoff = config.backoff_for_attempt(attempt);
        attempt += 1;
        warn!(
            what,
            attempt,
            max = config.max_retries,
            ?backoff,
            error = %error_str,
            "retrying after backoff"
        );
        tokio::time::sleep(backoff).await;
    }
}

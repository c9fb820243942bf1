//! Bounded retry with a fixed delay.
//!
//! Used around calls to unreliable external providers, never around cache
//! or database I/O.
//!
//! **Algorithm:**
//! 1. Attempt operation
//! 2. If successful, return result
//! 3. On failure, log it; if attempts remain, sleep `delay` and retry
//! 4. After `max_attempts` failures, return the last error unchanged
//!
//! [`execute`] treats every error as retryable. [`execute_if`] lets the
//! caller stop early on errors it knows are permanent.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// How many times to try and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; values below 1 are treated as 1
    pub max_attempts: u32,
    /// Fixed pause between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Run `operation` until it succeeds or `policy.max_attempts` is exhausted.
///
/// # Arguments
/// * `operation_name` - Name for logging (e.g., "sentiment inference")
/// * `policy` - Attempt budget and delay
/// * `operation` - Closure producing a fresh future per attempt
pub async fn execute<F, Fut, T, E>(
    operation_name: &str,
    policy: RetryPolicy,
    operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    execute_if(operation_name, policy, operation, |_| true).await
}

/// Like [`execute`], but gives up immediately when `is_retryable` returns false.
pub async fn execute_if<F, Fut, T, E, P>(
    operation_name: &str,
    policy: RetryPolicy,
    mut operation: F,
    is_retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    P: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(err) => {
                tracing::error!(
                    operation = operation_name,
                    attempt,
                    max_attempts,
                    "Attempt failed: {}",
                    err
                );

                if !is_retryable(&err) {
                    tracing::debug!(
                        operation = operation_name,
                        "Error is not retryable, giving up"
                    );
                    return Err(err);
                }
                if attempt >= max_attempts {
                    return Err(err);
                }

                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}

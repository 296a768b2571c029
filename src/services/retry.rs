use super::scheduler::Scheduler;
use crate::models::error::AppError;
use std::future::Future;

/// How often and how patiently a failed request is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u32,
    pub multiplier: u32,
}

impl RetryPolicy {
    /// One attempt, no retry.
    pub const fn fail_fast() -> Self {
        Self {
            max_attempts: 1,
            initial_delay_ms: 0,
            multiplier: 1,
        }
    }

    /// Up to `max_attempts` attempts, 500ms → 2500ms → ...
    pub const fn with_backoff(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay_ms: 500,
            multiplier: 5,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fail_fast()
    }
}

/// Retries an async operation with exponential backoff.
///
/// # Behavior
///
/// - Only transient errors are retried (see [`AppError::is_transient`])
/// - All other errors immediately propagate
/// - The last error is returned once `policy.max_attempts` is reached
pub async fn retry_with_backoff<S, F, Fut, T>(
    scheduler: &S,
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, AppError>
where
    S: Scheduler,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut delay_ms = policy.initial_delay_ms;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                log::warn!(
                    "{e}, retrying in {delay_ms}ms (attempt {attempt}/{max_attempts})"
                );
                scheduler.sleep(delay_ms).await;
                delay_ms = delay_ms.saturating_mul(policy.multiplier);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

//! Bounded retry for transient read failures.
//!
//! Retries apply to the read/fetch layer only. Mutations are never
//! retried here: a failed precondition is a terminal business answer,
//! and a transient failure mid-mutation must surface to the caller
//! rather than be silently resubmitted.

use shared_types::StoreError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry policy for transient store errors.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(25),
        }
    }
}

impl RetryPolicy {
    /// Runs `op`, retrying on transient errors with exponential backoff.
    /// Non-transient errors return immediately.
    pub async fn read<T, F, Fut>(&self, op: F) -> Result<T, StoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut delay = self.base_delay;
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    warn!(attempt, error = %err, "transient store error, retrying read");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

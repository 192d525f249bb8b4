//! Backoff between random id candidates.

use std::time::Duration;

use async_trait::async_trait;

/// Waits between retries. Swapped out in tests to avoid real delays.
#[async_trait]
pub trait Sleeper: Send + Sync + std::fmt::Debug {
    /// Wait for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the Tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Bounded retry budget with a fixed wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub attempts: u32,
    /// Wait before every attempt after the first.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Whether another attempt follows `attempt` (1-based).
    pub fn has_next(&self, attempt: u32) -> bool {
        attempt < self.attempts
    }
}

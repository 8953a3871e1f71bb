//! Exponential backoff for transient failures.

use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Serialize};

use crate::error::{BumpError, BumpResult};

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry (milliseconds)
    pub initial_delay_ms: u64,
    /// Maximum delay between retries (milliseconds)
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff
    pub multiplier: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay_ms: 100,
            max_delay_ms: 30_000,
            multiplier: 2.0_f32,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_max_times(self.max_retries as usize)
            .with_min_delay(Duration::from_millis(self.initial_delay_ms))
            .with_max_delay(Duration::from_millis(self.max_delay_ms))
            .with_factor(self.multiplier)
    }
}

/// Run `op`, retrying while it fails with a transient [`BumpError`].
pub async fn retry_transient<T, F, Fut>(policy: &RetryPolicy, what: &str, op: F) -> BumpResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = BumpResult<T>>,
{
    op.retry(policy.backoff())
        .when(BumpError::is_transient)
        .notify(|err, dur| {
            tracing::warn!(operation = what, error = %err, "Transient failure, retrying in {:?}", dur);
        })
        .await
}

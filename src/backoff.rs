//! Bounded retry with exponential backoff.
//!
//! Only an operation returning `Err` is retried. A tool that returns a
//! `ToolOutcome` with `success: false` has answered, and that answer is left
//! to the orchestrator's required/optional handling.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retry budget and delay curve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
        }
    }
}

impl BackoffPolicy {
    pub fn new(max_retries: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            max_delay_ms,
        }
    }

    /// Policy that never sleeps between attempts.
    pub fn immediate(max_retries: u32) -> Self {
        Self::new(max_retries, 0, 0)
    }

    /// Delay before the given retry (1-based): `base * 2^(retry-1)`, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(31);
        let delay_ms = self
            .base_delay_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }

    /// This policy with any set override fields applied.
    pub fn merged(&self, overrides: Option<&BackoffOverride>) -> Self {
        let Some(o) = overrides else {
            return self.clone();
        };
        Self {
            max_retries: o.max_retries.unwrap_or(self.max_retries),
            base_delay_ms: o.base_delay_ms.unwrap_or(self.base_delay_ms),
            max_delay_ms: o.max_delay_ms.unwrap_or(self.max_delay_ms),
        }
    }
}

/// Per-call override of individual policy fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffOverride {
    pub max_retries: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
}

/// Runs a fallible async operation under a [`BackoffPolicy`].
#[derive(Debug, Clone, Default)]
pub struct BackoffExecutor {
    policy: BackoffPolicy,
}

impl BackoffExecutor {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    pub async fn run<T, E, F, Fut>(&self, label: &str, op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run_with(None, label, op).await
    }

    /// Run `op`, retrying on `Err` up to the (possibly overridden) budget.
    /// The last error propagates once retries are exhausted.
    pub async fn run_with<T, E, F, Fut>(
        &self,
        overrides: Option<&BackoffOverride>,
        label: &str,
        mut op: F,
    ) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let policy = self.policy.merged(overrides);
        let mut retry = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if retry < policy.max_retries => {
                    retry += 1;
                    let delay = policy.delay_for(retry);
                    tracing::warn!(
                        operation = label,
                        attempt = retry,
                        max_retries = policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Operation failed, retrying after backoff"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(err) => {
                    tracing::error!(
                        operation = label,
                        attempts = retry + 1,
                        error = %err,
                        "Operation failed, retries exhausted"
                    );
                    return Err(err);
                }
            }
        }
    }
}

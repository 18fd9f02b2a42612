//! # Bounded Polling
//!
//! One backoff utility for every bounded wait: node readiness and consensus
//! settling both go through [`poll_until`].
//!
//! The probe runs exactly `max_attempts` times at most, with a fixed
//! `interval` sleep between consecutive attempts (none after the last one).

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Max attempts × fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Probe invocations before giving up (values below 1 behave as 1).
    pub max_attempts: u32,
    /// Sleep between attempts, in milliseconds.
    pub interval_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval_ms: interval.as_millis() as u64,
        }
    }

    /// A single attempt, no sleeping.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            interval_ms: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Effective attempt count.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Worst-case wall time spent sleeping.
    pub fn max_wait(&self) -> Duration {
        self.interval() * self.attempts().saturating_sub(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(30, Duration::from_secs(2))
    }
}

/// The probe never reported success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("gave up after {attempts} attempts")]
pub struct RetryExhausted {
    pub attempts: u32,
    /// Last probe error, if the final attempts failed rather than
    /// reporting "not yet".
    pub last_error: Option<String>,
}

/// Run `probe` until it yields `Ok(Some(_))` or the policy is exhausted.
///
/// `Ok(None)` means "not yet"; `Err(_)` is treated the same way but its
/// message is kept for the final [`RetryExhausted`]. The probe receives the
/// 1-based attempt number.
pub async fn poll_until<T, E, F, Fut>(policy: &RetryPolicy, mut probe: F) -> Result<T, RetryExhausted>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
    E: std::fmt::Display,
{
    let attempts = policy.attempts();
    let mut last_error = None;

    for attempt in 1..=attempts {
        match probe(attempt).await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {
                debug!(attempt, max_attempts = attempts, "Condition not met yet");
                last_error = None;
            }
            Err(e) => {
                debug!(attempt, max_attempts = attempts, error = %e, "Probe failed");
                last_error = Some(e.to_string());
            }
        }

        if attempt < attempts {
            tokio::time::sleep(policy.interval()).await;
        }
    }

    Err(RetryExhausted {
        attempts,
        last_error,
    })
}

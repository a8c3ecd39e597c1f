//! Snapshot availability waiter
//!
//! Polls the provider until a snapshot reports "available". The interval
//! starts at `PollPolicy::interval` and grows by `multiplier` per attempt,
//! capped at `max_interval`. A multiplier of 1.0 gives fixed-interval polling.

use crate::error::{Result, SnapshotError};
use crate::provider::{SnapshotInfo, SnapshotProvider};
use std::time::Duration;
use tokio::time::sleep;

/// Availability polling policy
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// Delay before the second attempt
    pub interval: Duration,

    /// Maximum number of describe calls
    pub max_attempts: u32,

    /// Backoff multiplier (1.0 = fixed interval)
    pub multiplier: f64,

    /// Upper bound for a single delay
    pub max_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 1000,
            multiplier: 1.0,
            max_interval: Duration::from_secs(60),
        }
    }
}

impl PollPolicy {
    /// Fixed-interval policy
    pub fn fixed(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            multiplier: 1.0,
            max_interval: interval,
        }
    }

    pub fn with_backoff(mut self, multiplier: f64, max_interval: Duration) -> Self {
        self.multiplier = multiplier;
        self.max_interval = max_interval;
        self
    }

    /// Check the policy can terminate and never shrinks its delay
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(SnapshotError::InvalidConfig(
                "interval must be greater than zero".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(SnapshotError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(SnapshotError::InvalidConfig(format!(
                "multiplier must be >= 1.0, got {}",
                self.multiplier
            )));
        }
        Ok(())
    }

    /// Delay after the given zero-based attempt
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if self.multiplier <= 1.0 {
            return self.interval;
        }
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let delay = self.interval.as_secs_f64() * self.multiplier.powi(exponent);
        let cap = self.max_interval.max(self.interval);
        if !delay.is_finite() || delay >= cap.as_secs_f64() {
            cap
        } else {
            Duration::from_secs_f64(delay)
        }
    }
}

/// Block until the snapshot is available
///
/// # Returns
/// * `Ok(SnapshotInfo)` - the snapshot as last described, status available
/// * `Err(SnapshotError::SnapshotFailed)` - a terminal failure status was seen
/// * `Err(_)` - the first describe error, unchanged
/// * `Err(SnapshotError::Timeout)` - `max_attempts` describe calls without success
pub async fn wait_until_available(
    provider: &dyn SnapshotProvider,
    snapshot_id: &str,
    policy: &PollPolicy,
) -> Result<SnapshotInfo> {
    for attempt in 0..policy.max_attempts {
        match provider.describe_snapshot(snapshot_id).await {
            Ok(info) if info.is_available() => {
                tracing::debug!(snapshot_id, attempt, "snapshot available");
                return Ok(info);
            }
            Ok(info) if info.status.is_terminal_failure() => {
                return Err(SnapshotError::SnapshotFailed {
                    snapshot_id: snapshot_id.to_string(),
                    status: info.status.to_string(),
                });
            }
            Ok(info) => {
                tracing::debug!(snapshot_id, attempt, status = %info.status, "snapshot not yet available");
            }
            Err(e) => {
                tracing::warn!(snapshot_id, attempt, error = %e, "describe failed while waiting");
                return Err(e);
            }
        }

        if attempt + 1 < policy.max_attempts {
            sleep(policy.delay_for_attempt(attempt)).await;
        }
    }

    Err(SnapshotError::Timeout {
        snapshot_id: snapshot_id.to_string(),
        attempts: policy.max_attempts,
    })
}

//! Fixed-delay retry policy shared by every strategy.
//!
//! This is the only backoff in the pipeline. Advancing to the next strategy
//! takes the place of exponential backoff.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Pause between attempts in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    2
}

fn default_delay_ms() -> u64 {
    750
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay_ms: delay.as_millis().min(u64::MAX as u128) as u64,
        }
    }

    /// Exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay_ms: 0,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Whether another attempt is allowed after `attempt` (1-based) failed.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.attempts()
    }
}

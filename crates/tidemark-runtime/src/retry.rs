//! Retry policy for event delivery

use std::time::Duration;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default fixed back-off between attempts
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(200);

/// Bounded, fixed-interval retry policy
///
/// The interval is the same before every retry (no exponential growth) and
/// the budget does not depend on the event kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Wait before each retry
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Single attempt, no retries
    pub fn none() -> Self {
        RetryPolicy {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Attempts including the first one
    #[inline]
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Time spent waiting by a delivery that fails every attempt
    ///
    /// Every failed attempt is followed by one back-off, the last one included.
    pub fn max_total_backoff(&self) -> Duration {
        self.backoff.saturating_mul(self.total_attempts())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

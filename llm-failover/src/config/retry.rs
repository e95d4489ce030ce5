//! Backoff schedule as a plain value, testable without timing.

use std::time::Duration;

/// Exponential backoff schedule applied between local retries of one provider.
///
/// The delay before retry `attempt` (1-based) is
/// `base_delay × multiplier^(attempt − 1)`. The number of attempts is owned by
/// the provider descriptor, not by this value.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub multiplier: f64,
}

impl RetryPolicy {
    /// Delay to sleep after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        self.base_delay.mul_f64(factor.max(0.0))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            multiplier: 2.0,
        }
    }
}

//! Bounded retry with configurable backoff.
//!
//! Callers drive the loop themselves through [`Attempts`], so a retried
//! operation can keep borrowing run state such as the cookie jar.
//!
//! ```rust
//! use jobscout_scraper::retry::{Backoff, RetryPolicy};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let policy = RetryPolicy::new(3, Duration::ZERO, Backoff::Exponential);
//! let mut attempts = policy.attempts();
//! let mut seen = Vec::new();
//! while let Some(attempt) = attempts.next_attempt().await {
//!     seen.push(attempt);
//!     attempts.back_off();
//! }
//! assert_eq!(seen, vec![1, 2, 3]);
//! # });
//! ```

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `base × attempt`
    Linear,
    /// `base × 2^attempt`
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff: Backoff,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            backoff,
        }
    }

    /// Delay after the given failed attempt (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = match self.backoff {
            Backoff::Linear => attempt,
            Backoff::Exponential => 1u32.checked_shl(attempt).unwrap_or(u32::MAX),
        };
        self.base_delay.saturating_mul(factor)
    }

    #[must_use]
    pub fn attempts(&self) -> Attempts {
        Attempts {
            policy: *self,
            attempt: 0,
            pending: None,
        }
    }
}

/// One retry budget. Every failure kind draws from the same counter.
#[derive(Debug)]
pub struct Attempts {
    policy: RetryPolicy,
    attempt: u32,
    pending: Option<Duration>,
}

impl Attempts {
    /// Wait out any scheduled delay and yield the next attempt number.
    ///
    /// Returns `None` once the budget is spent, without sleeping.
    pub async fn next_attempt(&mut self) -> Option<u32> {
        if self.attempt >= self.policy.max_attempts {
            return None;
        }
        if let Some(delay) = self.pending.take() {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        self.attempt += 1;
        Some(self.attempt)
    }

    /// Schedule the policy delay for the attempt that just failed.
    pub fn back_off(&mut self) {
        self.pending = Some(self.policy.delay_for(self.attempt));
    }

    /// Schedule a fixed delay for the attempt that just failed.
    pub fn retry_after(&mut self, delay: Duration) {
        self.pending = Some(delay);
    }

    #[must_use]
    pub fn current(&self) -> u32 {
        self.attempt
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.policy.max_attempts
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.attempt >= self.policy.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_delays() {
        let policy = RetryPolicy::new(3, Duration::from_millis(2000), Backoff::Linear);
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(6000));
    }

    #[test]
    fn test_exponential_delays() {
        let policy = RetryPolicy::new(3, Duration::from_millis(2000), Backoff::Exponential);
        assert_eq!(policy.delay_for(1), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(8000));
        assert_eq!(policy.delay_for(40), Duration::from_millis(2000).saturating_mul(u32::MAX));
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let policy = RetryPolicy::new(0, Duration::ZERO, Backoff::Linear);
        assert_eq!(policy.max_attempts, 1);
    }

    #[tokio::test]
    async fn test_budget_is_shared_and_bounded() {
        let policy = RetryPolicy::new(3, Duration::ZERO, Backoff::Exponential);
        let mut attempts = policy.attempts();

        assert_eq!(attempts.next_attempt().await, Some(1));
        attempts.back_off();
        assert_eq!(attempts.next_attempt().await, Some(2));
        attempts.retry_after(Duration::ZERO);
        assert_eq!(attempts.next_attempt().await, Some(3));
        assert!(attempts.is_last());
        attempts.back_off();
        assert_eq!(attempts.next_attempt().await, None);
        assert_eq!(attempts.current(), 3);
    }

    #[tokio::test]
    async fn test_no_sleep_after_final_attempt() {
        let policy = RetryPolicy::new(1, Duration::from_secs(3600), Backoff::Linear);
        let mut attempts = policy.attempts();
        assert_eq!(attempts.next_attempt().await, Some(1));
        attempts.back_off();

        // Would hang for an hour if the exhausted budget slept.
        let next = tokio::time::timeout(Duration::from_secs(1), attempts.next_attempt()).await;
        assert_eq!(next.expect("returns immediately"), None);
    }
}

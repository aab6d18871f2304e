//! Capped exponential backoff for reconnection scheduling.

use std::time::Duration;

/// Delay schedule between successive reconnection attempts: exponential
/// growth capped at a maximum, with a give-up ceiling on the attempt count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    cap_secs: u64,
    max_attempts: u32,
}

impl BackoffPolicy {
    /// Create a policy with the given cap and attempt ceiling.
    pub fn new(cap_secs: u64, max_attempts: u32) -> Self {
        Self {
            cap_secs,
            max_attempts,
        }
    }

    /// Delay before attempt `attempt` (0-based): `min(2^attempt, cap)`
    /// seconds, or `None` once the attempt ceiling is reached.
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let secs = 2u64
            .checked_pow(attempt)
            .map_or(self.cap_secs, |d| d.min(self.cap_secs));
        Some(Duration::from_secs(secs))
    }

    /// Attempt ceiling after which the policy signals give-up.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            cap_secs: 30,
            max_attempts: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_doubles_then_caps() {
        let policy = BackoffPolicy::new(30, 100);

        assert_eq!(policy.delay(0), Some(Duration::from_secs(1)));
        assert_eq!(policy.delay(1), Some(Duration::from_secs(2)));
        assert_eq!(policy.delay(2), Some(Duration::from_secs(4)));
        assert_eq!(policy.delay(3), Some(Duration::from_secs(8)));
        assert_eq!(policy.delay(4), Some(Duration::from_secs(16)));
        assert_eq!(policy.delay(5), Some(Duration::from_secs(30)));
        assert_eq!(policy.delay(6), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_gives_up_at_max_attempts() {
        let policy = BackoffPolicy::new(30, 5);

        assert!(policy.delay(4).is_some());
        assert_eq!(policy.delay(5), None);
        assert_eq!(policy.delay(6), None);
    }

    #[test]
    fn test_huge_attempt_stays_capped() {
        // 2^attempt overflows u64 well before u32::MAX attempts.
        let policy = BackoffPolicy::new(30, u32::MAX);
        assert_eq!(policy.delay(70), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_default_policy() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.max_attempts(), 10);
        assert_eq!(policy.delay(0), Some(Duration::from_secs(1)));
        assert_eq!(policy.delay(9), Some(Duration::from_secs(30)));
        assert_eq!(policy.delay(10), None);
    }

    #[test]
    fn test_monotonically_non_decreasing() {
        let policy = BackoffPolicy::new(60, 20);
        let mut last = Duration::ZERO;
        for attempt in 0..20 {
            let delay = policy.delay(attempt).unwrap();
            assert!(delay >= last);
            last = delay;
        }
    }
}

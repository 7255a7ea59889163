// src/platform/backoff.rs
use std::fmt::Debug;
use std::time::Duration;

/// Decides how long to wait before re-issuing a failed request.
pub trait BackoffPolicy: Send + Sync + Debug {
    /// Delay before retry number `retry`, starting at 1 for the second attempt.
    fn delay(&self, retry: u32) -> Duration;
}

/// `retry × base`.
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    base: Duration,
}

impl LinearBackoff {
    pub fn new(base: Duration) -> Self {
        Self { base }
    }

    pub fn from_millis(base_ms: u64) -> Self {
        Self::new(Duration::from_millis(base_ms))
    }
}

impl BackoffPolicy for LinearBackoff {
    fn delay(&self, retry: u32) -> Duration {
        self.base.saturating_mul(retry)
    }
}

/// Retries immediately.
#[derive(Debug, Clone, Default)]
pub struct NoBackoff;

impl BackoffPolicy for NoBackoff {
    fn delay(&self, _retry: u32) -> Duration {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_backoff() {
        let backoff = LinearBackoff::from_millis(1_000);
        assert_eq!(backoff.delay(1), Duration::from_millis(1_000));
        assert_eq!(backoff.delay(2), Duration::from_millis(2_000));
        assert_eq!(backoff.delay(3), Duration::from_millis(3_000));
    }

    #[test]
    fn test_no_backoff() {
        assert_eq!(NoBackoff.delay(5), Duration::ZERO);
    }
}

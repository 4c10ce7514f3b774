//! Simple exponential backoff retry policy.

use std::time::{Duration, SystemTime};

use reqwest_retry::{RetryDecision, RetryPolicy};

/// Exponential backoff retry policy.
///
/// Retries failed requests with exponentially increasing delays, capped at a maximum.
/// Which failures count as transient is decided by `RetryTransientMiddleware`
/// (connection errors, timeouts, 5xx, 408 and 429 responses).
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl BackoffPolicy {
    /// Create a new retry policy.
    ///
    /// # Arguments
    ///
    /// * `max_retries` - Maximum number of retry attempts after the first request
    /// * `base_delay` - Delay before the first retry, doubled for each following one
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }

    /// Calculate exponential backoff delay.
    fn exponential_delay(&self, n_attempts: u32) -> Duration {
        let delay = self.base_delay.as_secs_f64() * 2_f64.powi(n_attempts as i32);
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }
}

impl RetryPolicy for BackoffPolicy {
    fn should_retry(&self, _request_start_time: SystemTime, n_past_retries: u32) -> RetryDecision {
        if n_past_retries >= self.max_retries {
            RetryDecision::DoNotRetry
        } else {
            let delay = self.exponential_delay(n_past_retries);
            RetryDecision::Retry {
                execute_after: SystemTime::now() + delay,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_delay() {
        let policy = BackoffPolicy::new(3, Duration::from_millis(500));

        assert_eq!(policy.exponential_delay(0), Duration::from_millis(500));
        assert_eq!(policy.exponential_delay(1), Duration::from_millis(1000));
        assert_eq!(policy.exponential_delay(2), Duration::from_millis(2000));
    }

    #[test]
    fn test_max_delay_cap() {
        let policy = BackoffPolicy::new(10, Duration::from_secs(1));

        let delay = policy.exponential_delay(10);
        assert!(delay <= policy.max_delay);
    }

    #[test]
    fn test_stops_after_max_retries() {
        let policy = BackoffPolicy::new(2, Duration::from_millis(10));
        let start = SystemTime::now();

        assert!(matches!(
            policy.should_retry(start, 0),
            RetryDecision::Retry { .. }
        ));
        assert!(matches!(
            policy.should_retry(start, 1),
            RetryDecision::Retry { .. }
        ));
        assert!(matches!(
            policy.should_retry(start, 2),
            RetryDecision::DoNotRetry
        ));
    }
}

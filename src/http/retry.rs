//! Bounded retry loop with exponential backoff.

use log::{debug, warn};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Default number of attempts for a retried operation.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Delay before the second attempt, in milliseconds. Doubles for each later attempt.
pub const BASE_DELAY_MS: u64 = 1000;

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// A zero `max_attempts` still runs the operation once.
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn with_max_attempts(self, max_attempts: usize) -> Self {
        Self::new(max_attempts, self.base_delay)
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Delay to wait before the 1-based `attempt`.
    ///
    /// The first attempt starts immediately; attempt N (N >= 2) waits
    /// `base_delay * 2^(N-2)`.
    pub fn delay_before(&self, attempt: usize) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exponent = (attempt - 2).min(31) as u32;
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

/// Runs `operation` until it succeeds or `policy.max_attempts()` attempts have failed.
///
/// Attempts are strictly sequential. On exhaustion the error of the last
/// attempt is returned.
pub async fn with_retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    operation_name: &str,
    operation: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!("{}: succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(e) if attempt >= policy.max_attempts() => {
                warn!(
                    "{}: giving up after {} attempt(s): {}",
                    operation_name, attempt, e
                );
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_before(attempt + 1);
                warn!(
                    "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                    operation_name,
                    attempt,
                    policy.max_attempts(),
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.base_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn test_delay_before_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_before(1), Duration::ZERO);
        assert_eq!(policy.delay_before(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_before(3), Duration::from_millis(2000));
        assert_eq!(policy.delay_before(4), Duration::from_millis(4000));
        assert_eq!(policy.delay_before(5), Duration::from_millis(8000));
    }

    #[test]
    fn test_delay_before_matches_formula() {
        let policy = RetryPolicy::default();
        for n in 2..=12usize {
            let expected = 1000u64 * 2u64.pow((n - 2) as u32);
            assert_eq!(policy.delay_before(n), Duration::from_millis(expected));
        }
    }

    #[test]
    fn test_delay_before_saturates() {
        let policy = RetryPolicy::default();
        // Must not panic on overflow
        let _ = policy.delay_before(usize::MAX);
        assert!(policy.delay_before(100) >= policy.delay_before(33));
    }

    #[test]
    fn test_zero_attempts_runs_once() {
        let policy = RetryPolicy::new(0, Duration::from_millis(1));
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(RetryPolicy::default().with_max_attempts(0).max_attempts(), 1);
    }

    #[tokio::test]
    async fn test_with_retry_success() {
        let result = with_retry(&RetryPolicy::default(), "test", || async {
            Ok::<_, String>(42)
        })
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_recovers() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = Arc::clone(&attempts);

        let result = with_retry(&RetryPolicy::default(), "test", || {
            let attempts = Arc::clone(&attempts_clone);
            async move {
                let count = attempts.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    Err::<i32, _>(format!("connection reset #{}", count))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_exhausts_and_returns_last_error() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = Arc::clone(&attempts);

        let result = with_retry(&RetryPolicy::default(), "test", || {
            let attempts = Arc::clone(&attempts_clone);
            async move {
                let count = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                Err::<i32, _>(format!("failure {}", count))
            }
        })
        .await;

        assert_eq!(result.unwrap_err(), "failure 3");
        assert_eq!(attempts.load(Ordering::SeqCst), DEFAULT_MAX_ATTEMPTS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_never_exceeds_max_attempts() {
        for max in 1..=5usize {
            let attempts = Arc::new(AtomicUsize::new(0));
            let attempts_clone = Arc::clone(&attempts);
            let policy = RetryPolicy::default().with_max_attempts(max);

            let result = with_retry(&policy, "test", || {
                let attempts = Arc::clone(&attempts_clone);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>("down")
                }
            })
            .await;

            assert!(result.is_err());
            assert_eq!(attempts.load(Ordering::SeqCst), max);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_waits_exponentially() {
        let start = tokio::time::Instant::now();
        let timestamps = Arc::new(std::sync::Mutex::new(Vec::new()));
        let timestamps_clone = Arc::clone(&timestamps);

        let _ = with_retry(&RetryPolicy::default(), "test", || {
            let timestamps = Arc::clone(&timestamps_clone);
            async move {
                timestamps.lock().unwrap().push(start.elapsed());
                Err::<(), _>("down")
            }
        })
        .await;

        let timestamps = timestamps.lock().unwrap();
        assert_eq!(timestamps.len(), 3);
        assert!(timestamps[0] < Duration::from_millis(10));
        let first_gap = timestamps[1] - timestamps[0];
        let second_gap = timestamps[2] - timestamps[1];
        assert!(first_gap >= Duration::from_millis(1000) && first_gap < Duration::from_millis(1010));
        assert!(second_gap >= Duration::from_millis(2000) && second_gap < Duration::from_millis(2010));
        // No sleep after the final attempt
        assert!(start.elapsed() - timestamps[2] < Duration::from_millis(10));
    }
}

//! Fixed-count, fixed-wait retry.

use std::fmt::Display;
use std::thread;
use std::time::Duration;

use tracing::warn;

/// Default number of attempts for retried operations.
pub const DEFAULT_RETRY_COUNT: u32 = 3;
/// Default wait between attempts.
pub const DEFAULT_RETRY_WAIT: Duration = Duration::from_secs(5);

/// How often, and how patiently, a failing operation is retried.
///
/// Retry is unconditional on the error kind: every error is retried until the
/// attempts run out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first. Values below 1 are
    /// treated as 1.
    pub count: u32,
    /// Synchronous sleep between attempts.
    pub wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            count: DEFAULT_RETRY_COUNT,
            wait: DEFAULT_RETRY_WAIT,
        }
    }
}

impl RetryPolicy {
    pub fn new(count: u32, wait: Duration) -> Self {
        Self { count, wait }
    }

    /// A single attempt with no wait.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Run `op` until it succeeds or the attempts are exhausted.
    ///
    /// `op` receives the zero-based attempt number. Each failure is logged
    /// with its attempt number before the wait. The last error is returned.
    pub fn retry<T, E, F>(&self, mut op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut(u32) -> Result<T, E>,
    {
        let attempts = self.count.max(1);
        let mut attempt = 0;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    warn!(attempt = attempt + 1, of = attempts, error = %err, "attempt failed");
                    attempt += 1;
                    if attempt >= attempts {
                        return Err(err);
                    }
                    if !self.wait.is_zero() {
                        thread::sleep(self.wait);
                    }
                    warn!("retrying...");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_succeeds_on_last_attempt() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let mut calls = 0;

        let result: Result<u32, String> = policy.retry(|attempt| {
            calls += 1;
            if attempt < 2 {
                Err(format!("network down on attempt {}", attempt))
            } else {
                Ok(attempt)
            }
        });

        assert_eq!(result, Ok(2));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_always_failing_stops_after_count() {
        let policy = RetryPolicy::new(4, Duration::ZERO);
        let mut calls = 0;

        let result: Result<(), String> = policy.retry(|_| {
            calls += 1;
            Err("permanent".to_string())
        });

        assert_eq!(result, Err("permanent".to_string()));
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_zero_count_still_runs_once() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        let mut calls = 0;

        let _: Result<(), &str> = policy.retry(|_| {
            calls += 1;
            Err("boom")
        });

        assert_eq!(calls, 1);
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.count, 3);
        assert_eq!(policy.wait, Duration::from_secs(5));
        assert_eq!(RetryPolicy::once().count, 1);
    }
}

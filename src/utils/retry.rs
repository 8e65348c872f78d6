// Retry with exponential backoff for idempotent requests

use futures::future::BoxFuture;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Backoff schedule for a retried operation.
///
/// `max_attempts` counts every attempt including the first; the delay
/// before retry `k` (0-based) is `base_delay * 2^k`, so the default
/// policy makes 3 attempts with waits of 1s and 2s between them. There
/// is no delay after the final failure.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the failed attempt with the given 0-based index.
    pub fn delay_after(&self, attempt_index: u32) -> Duration {
        self.base_delay * 2u32.pow(attempt_index.min(5))
    }
}

/// Run `operation` until it succeeds or the policy's attempt budget is
/// exhausted, sleeping between attempts. The closure receives the
/// 0-based attempt index. On exhaustion the most recent error is
/// returned unchanged.
pub async fn retry_with_backoff<T, E, F>(policy: RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> BoxFuture<'static, Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;

    loop {
        match operation(attempt).await {
            Ok(result) => return Ok(result),
            Err(error) => {
                let failed = attempt;
                attempt += 1;
                if attempt >= policy.max_attempts {
                    return Err(error);
                }

                let delay = policy.delay_after(failed);
                warn!(
                    "Attempt {}/{} failed: {}; retrying in {:?}",
                    failed + 1,
                    policy.max_attempts,
                    error,
                    delay
                );
                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    fn recording_operation(
        fail_first: u32,
    ) -> (
        Arc<AtomicU32>,
        Arc<Mutex<Vec<Duration>>>,
        impl FnMut(u32) -> BoxFuture<'static, Result<u32, String>>,
    ) {
        let calls = Arc::new(AtomicU32::new(0));
        let stamps = Arc::new(Mutex::new(Vec::new()));
        let started = Instant::now();

        let calls_in = calls.clone();
        let stamps_in = stamps.clone();
        let operation = move |attempt: u32| -> BoxFuture<'static, Result<u32, String>> {
            let calls = calls_in.clone();
            let stamps = stamps_in.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                stamps.lock().unwrap().push(started.elapsed());
                if attempt < fail_first {
                    Err(format!("failure on attempt {}", attempt + 1))
                } else {
                    Ok(attempt)
                }
            })
        };

        (calls, stamps, operation)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_twice_then_succeeds_with_expected_delays() {
        let (calls, stamps, operation) = recording_operation(2);

        let result = retry_with_backoff(RetryPolicy::default(), operation).await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        // Attempts land at t=0, t=1s, t=3s: backoff of 1s then 2s.
        let stamps = stamps.lock().unwrap();
        assert_eq!(stamps[0], Duration::from_millis(0));
        assert_eq!(stamps[1], Duration::from_millis(1000));
        assert_eq!(stamps[2], Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_attempts_fail_returns_last_error_without_trailing_delay() {
        let (calls, _stamps, operation) = recording_operation(10);

        let started = Instant::now();
        let result = retry_with_backoff(RetryPolicy::default(), operation).await;

        assert_eq!(result, Err("failure on attempt 3".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s + 2s of backoff and nothing after the final failure.
        assert_eq!(started.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success_makes_single_call() {
        let (calls, _stamps, operation) = recording_operation(0);

        let started = Instant::now();
        let result = retry_with_backoff(RetryPolicy::default(), operation).await;

        assert_eq!(result, Ok(0));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_delay_schedule_doubles_from_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_after(1), Duration::from_millis(2000));

        let quick = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(10),
        };
        assert_eq!(quick.delay_after(2), Duration::from_millis(40));
    }
}

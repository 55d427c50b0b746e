//! Retry policy for remote calls
//!
//! Linear backoff: the delay before retry `n` (1-based) is `n × base_delay`.

use crate::config::ClientConfig;
use crate::error::ApiError;
use std::future::Future;
use std::time::Duration;

/// Retry ceiling and backoff for transient failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub max_retries: u32,
    /// Base delay multiplied by the retry index
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: crate::config::DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(crate::config::DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl From<&ClientConfig> for RetryPolicy {
    fn from(config: &ClientConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// Create a policy
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay slept before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(retry)
    }

    /// Run `attempt` until it succeeds, fails permanently, or retries run out
    ///
    /// The closure receives the zero-based attempt index. Errors that are
    /// not retryable are returned after a single attempt.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt: F) -> Result<T, ApiError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut index = 0u32;
        loop {
            match attempt(index).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && index < self.max_retries => {
                    index += 1;
                    let delay = self.delay_for(index);
                    tracing::warn!(
                        operation = operation,
                        attempt = index,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    let retryable = err.is_retryable();
                    let err = if retryable {
                        err.into_exhausted(index + 1)
                    } else {
                        err
                    };
                    tracing::error!(
                        operation = operation,
                        attempts = index + 1,
                        retryable = retryable,
                        error = %err,
                        "Retell API call failed"
                    );
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn server_error() -> ApiError {
        ApiError::Upstream {
            status: 503,
            body: "unavailable".to_string(),
        }
    }

    #[test]
    fn test_linear_delays() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(3000));
    }

    #[test]
    fn test_policy_from_config() {
        let config = ClientConfig::new("http://localhost", "k").with_retry(5, 250);
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_retries_with_linear_backoff() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000));
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let counter = calls.clone();
        let result: Result<(), ApiError> = policy
            .run("list_voices", |_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(server_error())
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // 1s + 2s + 3s
        assert_eq!(start.elapsed(), Duration::from_millis(6000));
        match result {
            Err(ApiError::RetriesExhausted {
                status, attempts, ..
            }) => {
                assert_eq!(status, 503);
                assert_eq!(attempts, 4);
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_fails_after_one_attempt() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000));
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let counter = calls.clone();
        let result: Result<(), ApiError> = policy
            .run("get_agent", |_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ApiError::Upstream {
                        status: 404,
                        body: "not found".to_string(),
                    })
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(result.unwrap_err().status(), Some(404));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        let start = Instant::now();

        let result = policy
            .run("list_calls", |attempt| async move {
                if attempt < 2 {
                    Err(ApiError::Network("connection reset".to_string()))
                } else {
                    Ok(attempt)
                }
            })
            .await;

        assert_eq!(result, Ok(2));
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_keeps_classification() {
        let policy = RetryPolicy::new(2, Duration::from_millis(10));
        let result: Result<(), ApiError> = policy
            .run("list_agents", |_| async {
                Err(ApiError::Timeout("deadline elapsed".to_string()))
            })
            .await;
        assert!(matches!(result, Err(ApiError::Timeout(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries() {
        let policy = RetryPolicy::new(0, Duration::from_millis(1000));
        let result: Result<(), ApiError> = policy
            .run("list_llms", |_| async { Err(server_error()) })
            .await;
        assert!(matches!(
            result,
            Err(ApiError::RetriesExhausted { attempts: 1, .. })
        ));
    }
}

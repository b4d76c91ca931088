//! Retry with exponential backoff and jitter.

use std::future::Future;
use std::time::Duration;

use crate::error::ParleyError;

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Execute an async operation, retrying errors for which
    /// [`ParleyError::is_retryable`] holds.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, ParleyError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ParleyError>>,
    {
        let mut backoff = self.initial_backoff;
        let attempts = self.max_attempts.max(1);

        for attempt in 1..=attempts {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() || attempt == attempts => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        "Retrying after error"
                    );

                    let wait = match &e {
                        ParleyError::RateLimited {
                            retry_after_ms: Some(ms),
                        } => Duration::from_millis(*ms).min(self.max_backoff),
                        // Jitter: 75%-125% of backoff
                        _ => Duration::from_secs_f64(
                            backoff.as_secs_f64() * (0.75 + rand_factor() * 0.5),
                        ),
                    };
                    tokio::time::sleep(wait).await;

                    backoff = Duration::from_secs_f64(
                        (backoff.as_secs_f64() * self.multiplier)
                            .min(self.max_backoff.as_secs_f64()),
                    );
                }
            }
        }

        Err(ParleyError::InvalidState(
            "retry loop exited without a result".into(),
        ))
    }
}

/// Pseudo-random factor in [0, 1) without pulling in rand.
fn rand_factor() -> f64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
        .hash(&mut hasher);
    std::thread::current().id().hash(&mut hasher);

    (hasher.finish() % 10000) as f64 / 10000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let result = RetryPolicy::default()
            .execute(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(ParleyError::api(503, "busy"))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = RetryPolicy::default()
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ParleyError::api(500, "down")) }
            })
            .await;
        assert!(matches!(result, Err(ParleyError::Api { status: 500, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = RetryPolicy::default()
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ParleyError::api(404, "gone")) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

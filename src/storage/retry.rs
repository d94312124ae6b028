use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio_retry::{strategy::FixedInterval, RetryIf};
use tracing::warn;

/// Transient statuses retried by default: 408, 429, 500, 502, 503, 504.
pub const DEFAULT_RETRY_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Fixed retry settings applied to every storage call.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub try_timeout: Duration,
    pub delay: Duration,
    pub statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            try_timeout: Duration::from_secs(60),
            delay: Duration::from_millis(500),
            statuses: DEFAULT_RETRY_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Run `attempt` until it succeeds, fails with a non-transient error,
    /// or the retry budget is spent.
    pub async fn run<F, Fut, T>(&self, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let strategy = FixedInterval::new(self.delay).take(self.max_retries);
        let mut tries = 0usize;

        let result = RetryIf::start(
            strategy,
            || {
                tries += 1;
                attempt()
            },
            |e: &Error| {
                let retry = e.is_transient(&self.statuses);
                if retry {
                    warn!("Storage request failed: {}. Will retry...", e);
                }
                retry
            },
        )
        .await;

        if result.is_err() && tries > 1 {
            warn!("Storage request gave up after {} attempts", tries);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::default().with_delay(Duration::from_millis(1))
    }

    fn storage_error(status: u16) -> Error {
        Error::Storage {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_default_policy_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.try_timeout, Duration::from_secs(60));
        assert_eq!(policy.delay, Duration::from_millis(500));
        assert_eq!(policy.statuses, vec![408, 429, 500, 502, 503, 504]);
    }

    #[tokio::test]
    async fn test_retries_transient_status_until_budget_spent() {
        let calls = AtomicUsize::new(0);

        let result: Result<()> = fast_policy()
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(storage_error(503)) }
            })
            .await;

        assert!(matches!(result, Err(Error::Storage { status: 503, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_does_not_retry_client_errors() {
        let calls = AtomicUsize::new(0);

        let result: Result<()> = fast_policy()
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(storage_error(404)) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failure() {
        let calls = AtomicUsize::new(0);

        let result = fast_policy()
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(storage_error(429))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 1);
    }
}

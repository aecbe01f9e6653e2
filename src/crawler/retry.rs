//! Fixed-delay retry policy for lookup requests
//!
//! Every failure is retried: connection errors, timeouts, non-success
//! statuses and body read errors alike. The delay between attempts is
//! constant. Once the last attempt fails the caller receives
//! [`FetchError::RetryExhausted`] wrapping the final error.

use crate::config::CrawlConfig;
use crate::crawler::observer::{CrawlEvent, CrawlObserver};
use crate::{FetchError, FetchResult};
use std::future::Future;
use std::time::Duration;

/// How many times a request is attempted and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first one
    pub max_attempts: u32,

    /// Pause after each failed attempt except the last
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(config.max_attempts, config.retry_delay())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&CrawlConfig::default())
    }
}

/// Runs `operation` until it succeeds or the policy's attempts are spent
///
/// Each failed attempt is reported to `observer` under the `request` label.
///
/// # Returns
///
/// * `Ok(T)` - The first successful result
/// * `Err(FetchError::RetryExhausted)` - Every attempt failed
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    request: &str,
    observer: &dyn CrawlObserver,
    mut operation: F,
) -> FetchResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchResult<T>>,
{
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                observer.on_event(&CrawlEvent::AttemptFailed {
                    request: request.to_string(),
                    attempt,
                    max_attempts: policy.max_attempts,
                    error: error.to_string(),
                });

                if attempt >= policy.max_attempts {
                    return Err(FetchError::RetryExhausted {
                        attempts: attempt,
                        last: Box::new(error),
                    });
                }

                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}

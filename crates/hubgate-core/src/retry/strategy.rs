//! The backoff strategy trait.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// A bounded strategy for re-attempting failed operations.
///
/// Implementations decide how long to wait between attempts and when to give
/// up. Whether a particular error is worth retrying at all is the caller's
/// call: `run` takes a predicate so that, for example, an HTTP client can
/// retry 5xx responses while failing 4xx immediately.
#[async_trait]
pub trait Backoff: Send + Sync {
    /// Execute `operation` until it succeeds, the predicate rejects the
    /// error, or the retry budget is exhausted.
    ///
    /// The operation is always attempted at least once; `max_retries`
    /// counts the re-attempts after the first failure.
    async fn run<F, Fut, T, E, P>(&self, operation: F, should_retry: P) -> Result<T, E>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: Send,
        P: Fn(&E) -> bool + Send + Sync,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if !should_retry(&err) => return Err(err),
                Err(err) if attempt >= self.max_retries() => return Err(err),
                Err(_) => {
                    if let Some(delay) = self.delay_for(attempt) {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Delay to wait before re-attempt number `attempt` (0-indexed after the
    /// first failure), or `None` for an immediate retry.
    fn delay_for(&self, attempt: u32) -> Option<Duration>;

    /// Maximum number of re-attempts after the initial one.
    fn max_retries(&self) -> u32;
}

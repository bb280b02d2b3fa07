//! Retry helper for chain and indexer calls.
//!
//! Policy: at most ONE retry, and only for transient failures
//! (network/timeout). Protocol-level errors — malformed responses, RPC
//! error objects — surface immediately; retrying them would only repeat
//! the same answer.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retries permitted for transient failures.
const MAX_RETRIES: u32 = 1;

/// Pause before the single retry.
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Run `operation`, retrying once after a short backoff when
/// `is_retryable` classifies the error as transient.
///
/// Returns the operation's result, or the last error once retries are
/// exhausted.
pub async fn retry_transient<F, Fut, T, E>(
    mut operation: F,
    is_retryable: fn(&E) -> bool,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(err) => {
                if !is_retryable(&err) || attempt >= MAX_RETRIES {
                    return Err(err);
                }

                tracing::warn!(
                    attempt = attempt + 1,
                    backoff_ms = RETRY_BACKOFF.as_millis() as u64,
                    error = %err,
                    "transient chain call failure, retrying"
                );

                sleep(RETRY_BACKOFF).await;
                attempt += 1;
            }
        }
    }
}

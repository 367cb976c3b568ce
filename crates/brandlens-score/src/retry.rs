//! Retry with exponential back-off for judge calls.
//!
//! The judge runs once per component after collection completes, so the
//! retry budget here is deliberately small. Non-transient errors (auth,
//! malformed output) are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::JudgeError;

/// Returns `true` for errors worth retrying after a back-off delay.
pub(crate) fn is_retriable(err: &JudgeError) -> bool {
    match err {
        JudgeError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        JudgeError::UnexpectedStatus { status, .. } => *status >= 500 || *status == 429,
        JudgeError::Auth(_)
        | JudgeError::Deserialize { .. }
        | JudgeError::EmptyResponse
        | JudgeError::MalformedJudgment(_) => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors, sleeping `backoff_base_ms * 2^(n-1)` before the n-th
/// retry.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, JudgeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, JudgeError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient judge error — retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

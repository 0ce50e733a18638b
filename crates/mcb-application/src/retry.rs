//! Retry budget for idempotent infrastructure calls (§4.1, §7).
//!
//! Exponential backoff with full jitter, capped at
//! [`crate::constants::MAX_RETRY_ATTEMPTS`] attempts and
//! [`crate::constants::RETRY_BACKOFF_CEILING_MS`]. `Transient` errors are
//! retried; anything else is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use mcb_domain::error::Error;
use rand::Rng;
use tracing::warn;

use crate::constants::{MAX_RETRY_ATTEMPTS, RETRY_BACKOFF_CEILING_MS};

/// Run `op` up to [`MAX_RETRY_ATTEMPTS`] times, retrying only on
/// [`Error::Transient`]. Exhausting the budget escalates the last error to
/// [`Error::BackendUnavailable`].
pub async fn with_retry<T, F, Fut>(what: &str, mut op: F) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(Error::Transient { message, source }) => {
                attempt += 1;
                if attempt >= MAX_RETRY_ATTEMPTS {
                    warn!(what, attempt, "retry budget exhausted, escalating to BackendUnavailable");
                    return Err(Error::BackendUnavailable {
                        message: format!("{what}: retry budget exhausted after {attempt} attempts ({message})"),
                        source,
                    });
                }
                let delay = backoff_delay(attempt);
                warn!(what, attempt, delay_ms = delay.as_millis() as u64, "retrying after transient failure");
                tokio::time::sleep(delay).await;
            }
            Err(other) => return Err(other),
        }
    }
}

/// Full-jitter exponential backoff: `uniform(0, min(ceiling, base * 2^attempt))`.
fn backoff_delay(attempt: u32) -> Duration {
    let base_ms: u64 = 100;
    let exp = base_ms.saturating_mul(1u64 << attempt.min(20));
    let capped = exp.min(RETRY_BACKOFF_CEILING_MS);
    let jittered = rand::rng().random_range(0..=capped);
    Duration::from_millis(jittered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn retries_transient_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let result = with_retry("test", move || {
            let calls = calls_clone.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(Error::transient("not yet"))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausting_budget_escalates_to_backend_unavailable() {
        let result: Result<(), Error> =
            with_retry("test", || async { Err(Error::transient("always fails")) }).await;

        match result {
            Err(Error::BackendUnavailable { .. }) => {}
            other => panic!("expected BackendUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_transient_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let result: Result<(), Error> = with_retry("test", move || {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::input_invalid("bad input"))
            }
        })
        .await;

        assert!(matches!(result, Err(Error::InputInvalid { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

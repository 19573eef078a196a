//! Exponential-backoff retry for the single-document insert operation
//! (spec §5, §7): `attempt -> 2^attempt * base_delay`, up to a
//! caller-specified max attempt count. Only a throttling transport error is
//! retried; every other error is fatal on first occurrence.
//!
//! Grounded on the teacher's `mcp-agent-mail-db::retry` backoff shape, with
//! the formula and jitter/circuit-breaker behavior dropped — neither is
//! specified for this crate (spec §9 Open Question (c): the documented
//! behavior, not the accidental double-bookkeeping mechanism, is the
//! target).

use std::time::Duration;

use tracing::warn;

use crate::error::{SearchClientError, SearchClientResult, TransportError};

/// Retry an insert/update/delete operation on throttling with exponential
/// backoff. `op` is invoked until it succeeds, reports a non-throttling
/// error (returned immediately), or exhausts `max_attempts`.
///
/// # Errors
/// Returns [`SearchClientError::Insert`] wrapping the last observed
/// [`TransportError`] once the attempt budget is exhausted, or immediately
/// on the first non-throttling failure.
pub async fn retry_insert<F, Fut>(
    doc_id: &str,
    schema: &str,
    max_attempts: u32,
    base_delay: Duration,
    mut op: F,
) -> SearchClientResult<()>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<(), TransportError>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(()) => return Ok(()),
            Err(cause) if cause.is_throttled() && attempt < max_attempts => {
                let delay = backoff_delay(attempt, base_delay);
                warn!(doc_id, schema, attempt, delay_ms = %delay.as_millis(), "insert throttled, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(cause) => {
                return Err(SearchClientError::Insert {
                    doc_id: doc_id.to_owned(),
                    schema: schema.to_owned(),
                    cause,
                });
            }
        }
    }
}

/// `2^attempt * base_delay`, per spec §5.
#[must_use]
pub fn backoff_delay(attempt: u32, base_delay: Duration) -> Duration {
    base_delay.saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX))
}

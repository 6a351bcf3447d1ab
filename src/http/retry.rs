//! Connection retry loop with randomized backoff
//!
//! Only socket-level failures are retried here. Responses from the server
//! never reach this loop's retry path, whatever their status.

use crate::error::Result;
use rand::Rng;
use std::time::Duration;
use tracing::warn;

/// Upper bound, in whole seconds, for a single retry wait.
pub(crate) const MAX_BACKOFF_SECS: u64 = 60;

/// Draw one backoff wait.
///
/// The wait is a whole-second value in `1..=n`, where `n` is itself drawn
/// from `1..=60`. Always at least one second, never more than a minute.
pub(crate) fn retry_delay<R: Rng>(rng: &mut R) -> Duration {
    let cap = rng.random_range(1..=MAX_BACKOFF_SECS);
    Duration::from_secs(rng.random_range(1..=cap))
}

/// Run `op` until it succeeds or fails in a non-retryable way.
///
/// `max_retries` bounds the total number of attempts; 0 means retry
/// forever. Once the bound is hit the last error is returned unchanged.
/// `sleep` performs the wait between attempts.
pub(crate) fn with_connection_retry<T, S, F>(
    target: &str,
    max_retries: u32,
    mut sleep: S,
    mut op: F,
) -> Result<T>
where
    S: FnMut(Duration),
    F: FnMut() -> Result<T>,
{
    let mut tries: u32 = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() => {
                tries += 1;
                if max_retries > 0 && tries >= max_retries {
                    return Err(err);
                }
                let wait = retry_delay(&mut rand::rng());
                warn!(
                    "Connection to {} failed {} time(s), waiting {}s before retry: {}",
                    target,
                    tries,
                    wait.as_secs(),
                    err
                );
                sleep(wait);
            }
            Err(err) => return Err(err),
        }
    }
}

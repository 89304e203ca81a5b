//! Bounded exponential-backoff loading of a session and its annotation batch.

use std::time::Duration;

use crate::foundation::error::{ReviewError, ReviewResult};
use crate::load::source::SessionSource;
use crate::model::batch::{AnnotationBatch, SkippedRecord, decode_batch};
use crate::model::session::VideoSession;

/// Tunable parameters for the load retry strategy.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts per fetch, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay_ms: u64,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
    /// Upper bound on the delay between attempts.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 200,
            multiplier: 2.0,
            max_delay_ms: 2_000,
        }
    }
}

impl RetryPolicy {
    /// Delay before the second attempt, capped at `max_delay`.
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms).min(self.max_delay())
    }

    /// Upper bound on any single delay.
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Next backoff delay, clamped to `max_delay`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        let multiplier = if self.multiplier.is_finite() {
            self.multiplier.max(1.0)
        } else {
            1.0
        };
        let next_ms = (current.as_millis() as f64 * multiplier) as u64;
        Duration::from_millis(next_ms).min(self.max_delay())
    }
}

/// Run `op` until it succeeds or `policy.max_attempts` is exhausted.
///
/// `sleep` is called between attempts; pass [`thread_sleep`] outside tests.
pub fn retry<T>(
    what: &str,
    policy: &RetryPolicy,
    sleep: &mut dyn FnMut(Duration),
    mut op: impl FnMut() -> anyhow::Result<T>,
) -> ReviewResult<T> {
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_delay();
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match op() {
            Ok(v) => {
                if attempt > 1 {
                    tracing::info!(what, attempt, "load succeeded after retry");
                }
                return Ok(v);
            }
            Err(e) if attempt >= max_attempts => {
                tracing::error!(what, attempt, error = %e, "load failed; giving up");
                return Err(ReviewError::load(attempt, format!("{what}: {e:#}")));
            }
            Err(e) => {
                tracing::warn!(
                    what,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "load attempt failed",
                );
            }
        }
        sleep(delay);
        delay = policy.next_delay(delay);
    }
}

/// Blocking sleep for [`retry`] / [`load_session`].
pub fn thread_sleep(d: Duration) {
    std::thread::sleep(d);
}

/// A session ready to be opened.
#[derive(Clone, Debug)]
pub struct LoadedSession {
    /// Validated session.
    pub session: VideoSession,
    /// Decoded records, not yet checked against the duration.
    pub batch: AnnotationBatch,
    /// Records dropped while decoding the raw batch.
    pub skipped: Vec<SkippedRecord>,
}

/// Fetch and decode a session descriptor and its annotation batch.
///
/// Each fetch is retried independently under `policy`. An invalid descriptor is a validation
/// error and is not retried.
#[tracing::instrument(skip(source, policy, sleep))]
pub fn load_session(
    source: &dyn SessionSource,
    session_id: &str,
    policy: &RetryPolicy,
    commentary_span_s: f64,
    sleep: &mut dyn FnMut(Duration),
) -> ReviewResult<LoadedSession> {
    let desc = retry("session descriptor", policy, sleep, || {
        source.fetch_descriptor(session_id)
    })?;
    let session = VideoSession::from_descriptor(desc)?;
    let raw = retry("annotation batch", policy, sleep, || {
        source.fetch_annotations(session_id)
    })?;
    let (batch, skipped) = decode_batch(raw, commentary_span_s);
    tracing::info!(
        session = session.id(),
        records = batch.len(),
        skipped = skipped.len(),
        "session loaded"
    );
    Ok(LoadedSession {
        session,
        batch,
        skipped,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/load/retry.rs"]
mod tests;

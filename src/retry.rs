//! Failure classification for the download state machine
//!
//! The state machine does not branch on error types directly; every
//! [`SourceError`] maps to exactly one [`FailureKind`], and the retry
//! behavior (re-fetch, backoff, or give up) follows from the kind alone.

use crate::config::RetryConfig;
use crate::error::SourceError;
use rand::Rng;
use std::time::Duration;

/// How a source failure is handled by the download state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The attachment reference went stale; re-fetch the message and retry
    /// immediately (counts against the attempt budget)
    StaleReference,
    /// Timeout-like failure; retry after the configured backoff delay
    /// (counts against the attempt budget)
    Transient,
    /// Anything else; the message is recorded as permanently failed without
    /// further attempts
    Permanent,
}

/// Classify errors into retry behaviors
pub trait ClassifyFailure {
    /// The retry behavior this error calls for
    fn failure_kind(&self) -> FailureKind;
}

impl ClassifyFailure for SourceError {
    fn failure_kind(&self) -> FailureKind {
        match self {
            SourceError::FileReferenceExpired { .. } => FailureKind::StaleReference,
            SourceError::Timeout(_) | SourceError::Connection(_) => FailureKind::Transient,
            SourceError::Api(_) | SourceError::Session(_) => FailureKind::Permanent,
        }
    }
}

impl ClassifyFailure for crate::error::Error {
    fn failure_kind(&self) -> FailureKind {
        match self {
            crate::error::Error::Source(e) => e.failure_kind(),
            // Local failures (filesystem, path handling) are never retried
            _ => FailureKind::Permanent,
        }
    }
}

/// Backoff delay before a transient retry, with optional jitter.
///
/// With jitter enabled the delay is uniformly distributed between
/// `retry_delay` and `2 * retry_delay`.
pub(crate) fn backoff_delay(config: &RetryConfig) -> Duration {
    if config.jitter {
        add_jitter(config.retry_delay)
    } else {
        config.retry_delay
    }
}

fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}

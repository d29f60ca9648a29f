//! Error types for telegram-media-dl
//!
//! Two layers of errors:
//! - [`Error`] — the crate-level error returned by library entry points
//!   (configuration, filesystem, serialization, and run-level source failures)
//! - [`SourceError`] — failures raised by the remote Message Source; these are
//!   classified by the retry module and, for per-message download work, never
//!   escape the download state machine

use crate::types::MessageId;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for telegram-media-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for telegram-media-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "page_size")
        key: Option<String>,
    },

    /// Message Source failure that escaped per-message containment
    /// (session bracket or message stream errors)
    #[error("message source error: {0}")]
    Source(#[from] SourceError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A path could not be decomposed for collision handling
    #[error("invalid path {path}: {reason}")]
    InvalidPath {
        /// The path that could not be handled
        path: PathBuf,
        /// Why the path is unusable
        reason: String,
    },

    /// No alternate name could be found for a colliding file
    #[error("file collision at {path}: {reason}")]
    FileCollision {
        /// The path where the collision occurred
        path: PathBuf,
        /// Why no alternate name was available
        reason: String,
    },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error for a specific key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Failures raised by the remote Message Source.
///
/// The download state machine classifies these into retry behaviors via
/// [`FailureKind`](crate::retry::FailureKind): expired file references are
/// recovered by re-fetching the message, timeout/connection failures are
/// retried after a backoff, and everything else fails the message
/// permanently.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The attachment's file reference expired server-side; the message must
    /// be re-fetched to obtain a fresh reference
    #[error("file reference expired for message {message_id}")]
    FileReferenceExpired {
        /// The message whose attachment reference went stale
        message_id: MessageId,
    },

    /// The call timed out
    #[error("timed out: {0}")]
    Timeout(String),

    /// Transport-level connection failure
    #[error("connection error: {0}")]
    Connection(String),

    /// The remote API rejected the call
    #[error("API error: {0}")]
    Api(String),

    /// Session lifecycle failure (start/stop)
    #[error("session error: {0}")]
    Session(String),
}

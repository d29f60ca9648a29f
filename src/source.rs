//! Message Source capability surface consumed by the downloader.
//!
//! The concrete Telegram client (authentication, transport, session storage,
//! the actual byte transfer) lives behind this trait; the downloader only
//! depends on the five capabilities below. This is also the crate's test
//! seam: the test suites drive the full pipeline against scripted
//! implementations.

use crate::error::SourceError;
use crate::types::{Message, MessageId};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::path::{Path, PathBuf};

/// Result alias for Message Source calls
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Remote message stream and attachment transfer capabilities.
///
/// Every method is a suspension point; all other downloader logic (naming,
/// filtering) is synchronous.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Open the session. Called once, before any other method.
    async fn start_session(&self) -> SourceResult<()>;

    /// Close the session. Called once at the end of a run, even when the
    /// run failed.
    async fn stop_session(&self) -> SourceResult<()>;

    /// Lazy stream of messages of `chat_id` with ids strictly greater than
    /// `after`, in increasing id order (forward, never reversed).
    fn iter_messages<'a>(
        &'a self,
        chat_id: &'a str,
        after: MessageId,
    ) -> BoxStream<'a, SourceResult<Message>>;

    /// Transfer the file identified by `file_id` to `dest`.
    ///
    /// Returns the path the file was written to, or `Ok(None)` when the
    /// source declines the transfer without raising (soft failure — logged
    /// by the caller, never retried).
    async fn download_file(&self, file_id: &str, dest: &Path) -> SourceResult<Option<PathBuf>>;

    /// Re-fetch a single message by id.
    ///
    /// Used only for stale-reference recovery: a re-fetched message carries
    /// fresh attachment references.
    async fn refetch_message(&self, chat_id: &str, id: MessageId) -> SourceResult<Message>;
}

//! Per-page concurrent fan-out and cursor reduction.
//!
//! One page of messages is launched as one task per message and awaited at a
//! join barrier. A task failing permanently does not cancel its siblings;
//! failures surface only through the failure registry. The only observable
//! result of a page is the maximum message id it contained.

use super::MediaDownloader;
use crate::source::MessageSource;
use crate::types::{Event, Message, MessageId};

impl MediaDownloader {
    /// Fan a page of messages out to the download state machine and wait for
    /// all of them to reach a terminal outcome.
    ///
    /// Returns the maximum message id among the page, or `None` for an empty
    /// page. Completion order within the page is unconstrained.
    pub(crate) async fn process_page(
        &self,
        source: &dyn MessageSource,
        messages: Vec<Message>,
    ) -> Option<MessageId> {
        let count = messages.len();
        let ids = futures::future::join_all(
            messages
                .into_iter()
                .map(|message| self.download_message_media(source, message)),
        )
        .await;

        let cursor = ids.into_iter().max()?;
        tracing::debug!(cursor = cursor.0, messages = count, "Page completed");
        self.emit_event(Event::PageCompleted {
            cursor,
            messages: count,
        });
        Some(cursor)
    }
}

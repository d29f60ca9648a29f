//! Resume loop — drives the remote message stream in pages.
//!
//! Pulls messages one at a time starting strictly after the stored cursor,
//! groups them into pages of `page_size`, hands each full (or final partial)
//! page to the fan-out, and folds every page's result into the resume
//! cursor. Pages are strictly sequential: page N+1 is not started until page
//! N's join barrier completes, so the cursor only ever advances
//! monotonically and a crash mid-run loses at most one in-flight page.

use super::MediaDownloader;
use crate::error::Result;
use crate::source::MessageSource;
use crate::types::{Event, Message, MessageId, RunReport};
use futures::StreamExt;

impl MediaDownloader {
    /// Run a full download pass over the configured chat.
    ///
    /// Opens the source session, drives the pagination loop, and closes the
    /// session even when the loop errors. Per-message failures never
    /// surface here; they are collected in the failure registry and carried
    /// in the returned [`RunReport`]. An error return means the source
    /// itself failed at the run level (session bracket or message stream).
    pub async fn run(&self, source: &dyn MessageSource) -> Result<RunReport> {
        tracing::info!(
            chat_id = %self.config.chat_id,
            after = self.config.last_read_message_id.0,
            page_size = self.config.page_size,
            "Starting download run"
        );
        source.start_session().await?;

        let outcome = self.drive(source).await;

        // A failed teardown must not lose the pass's cursor
        if let Err(e) = source.stop_session().await {
            tracing::warn!(error = %e, "Failed to close source session");
        }
        let last_read_message_id = outcome?;

        let report = RunReport {
            last_read_message_id,
            failed_ids: self.registry.snapshot(),
        };
        tracing::info!(
            last_read_message_id = report.last_read_message_id.0,
            newly_failed = report.newly_failed(),
            "Download run completed"
        );
        self.emit_event(Event::RunCompleted {
            last_read_message_id: report.last_read_message_id,
            newly_failed: report.newly_failed(),
        });
        Ok(report)
    }

    /// The pagination loop proper. Returns the final resume cursor.
    async fn drive(&self, source: &dyn MessageSource) -> Result<MessageId> {
        let page_size = self.config.page_size;
        let mut cursor = self.config.last_read_message_id;
        let mut page: Vec<Message> = Vec::with_capacity(page_size);
        let mut stopped = false;

        {
            let mut stream = source.iter_messages(&self.config.chat_id, cursor);
            while let Some(next) = stream.next().await {
                let message = next?;
                if page.len() < page_size {
                    page.push(message);
                    continue;
                }

                // Buffer full: dispatch it and start the next page with the
                // triggering message as its first element
                let full = std::mem::replace(&mut page, Vec::with_capacity(page_size));
                if let Some(max_id) = self.process_page(source, full).await {
                    cursor = cursor.max(max_id);
                }
                page.push(message);

                if self.config.single_page {
                    tracing::debug!("Single-page mode, ending stream after the first full page");
                    break;
                }
                if self.stop.is_cancelled() {
                    tracing::info!(cursor = cursor.0, "Stop requested, ending run at page boundary");
                    stopped = true;
                    break;
                }
            }
        }

        // Terminal flush of the final partial page. Skipped on a requested
        // stop; the buffered messages are past the cursor and will be
        // re-read next run.
        if !page.is_empty() && !stopped {
            if let Some(max_id) = self.process_page(source, page).await {
                cursor = cursor.max(max_id);
            }
        }

        Ok(cursor)
    }
}

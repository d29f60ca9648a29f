//! Per-message download state machine.
//!
//! Brings a single message to a terminal state with respect to its media
//! attachment: resolve the canonical name, apply the format filter, pick a
//! collision-free destination, and drive the source's download call, retrying
//! on classified failures. Errors never escape this module; a permanently
//! failed message is recorded in the failure registry and its id is still
//! returned so the page cursor can advance past it.

use super::MediaDownloader;
use crate::error::Result;
use crate::retry::{ClassifyFailure, FailureKind, backoff_delay};
use crate::source::MessageSource;
use crate::types::{Event, Media, Message, MessageId};
use crate::{dedup, filter, naming};
use std::path::PathBuf;

impl MediaDownloader {
    /// Download the media of a single message, retrying per failure kind.
    ///
    /// Bounded at `retry.max_attempts` total attempts. Always returns the
    /// message's id, whether it succeeded, was skipped, or permanently
    /// failed.
    pub(crate) async fn download_message_media(
        &self,
        source: &dyn MessageSource,
        mut message: Message,
    ) -> MessageId {
        let id = message.id;
        let max_attempts = self.config.retry.max_attempts;

        for attempt in 1..=max_attempts {
            let err = match self.process_attachment(source, &message).await {
                Ok(()) => return id,
                Err(err) => err,
            };

            match err.failure_kind() {
                FailureKind::Permanent => {
                    tracing::error!(
                        message_id = id.0,
                        error = %err,
                        "Message could not be downloaded, recorded for later retry"
                    );
                    self.record_failure(id);
                    return id;
                }
                FailureKind::StaleReference | FailureKind::Transient
                    if attempt == max_attempts =>
                {
                    tracing::error!(
                        message_id = id.0,
                        attempts = max_attempts,
                        error = %err,
                        "Retries exhausted, message recorded for later retry"
                    );
                    self.record_failure(id);
                    return id;
                }
                FailureKind::StaleReference => {
                    tracing::warn!(
                        message_id = id.0,
                        attempt,
                        "File reference expired, refetching message"
                    );
                    match source.refetch_message(&self.config.chat_id, id).await {
                        Ok(fresh) => message = fresh,
                        Err(refetch_err) => {
                            tracing::error!(
                                message_id = id.0,
                                error = %refetch_err,
                                "Refetch failed, message recorded for later retry"
                            );
                            self.record_failure(id);
                            return id;
                        }
                    }
                }
                FailureKind::Transient => {
                    let delay = backoff_delay(&self.config.retry);
                    tracing::warn!(
                        message_id = id.0,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient failure, retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        self.record_failure(id);
        id
    }

    /// One attempt over the message's attachment: naming, filtering, and the
    /// kind-appropriate download calls.
    async fn process_attachment(
        &self,
        source: &dyn MessageSource,
        message: &Message,
    ) -> Result<()> {
        let Some(media) = &message.media else {
            // No media: nothing to do, the message is done
            return Ok(());
        };

        let kind = media.kind();
        if !self.config.is_kind_enabled(kind) {
            return Ok(());
        }

        let meta = naming::resolve_media_meta(media, &self.config.download_dir, &self.config.chat_id);
        if !filter::can_download(kind, &self.config.file_formats, meta.file_format.as_deref()) {
            tracing::info!(
                message_id = message.id.0,
                kind = %kind,
                file_format = ?meta.file_format,
                "Format not in allow-list, skipping attachment"
            );
            self.emit_event(Event::MediaSkipped {
                message_id: message.id,
                file_format: meta.file_format.clone(),
            });
            return Ok(());
        }

        match media {
            // Videos: download each thumbnail image, not the video body
            Media::Video(video) => {
                for (index, thumb) in video.thumbs.iter().enumerate() {
                    let dest = naming::thumbnail_path(&meta.path, index);
                    self.fetch_to(source, message.id, &thumb.file_id, dest)
                        .await?;
                }
                Ok(())
            }
            other => {
                self.fetch_to(source, message.id, other.file_id(), meta.path.clone())
                    .await
            }
        }
    }

    /// Download one file to its resolved destination, handling name
    /// collisions before the transfer and byte-identical duplicates after.
    async fn fetch_to(
        &self,
        source: &dyn MessageSource,
        message_id: MessageId,
        file_id: &str,
        dest: PathBuf,
    ) -> Result<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let (dest, took_alternate) = if dedup::is_existing_file(&dest) {
            (dedup::next_available_name(&dest)?, true)
        } else {
            (dest, false)
        };

        match source.download_file(file_id, &dest).await? {
            Some(path) => {
                let final_path = if took_alternate {
                    dedup::reconcile_duplicate(&path)?
                } else {
                    path
                };
                tracing::info!(
                    message_id = message_id.0,
                    path = %final_path.display(),
                    "Downloaded media"
                );
                self.emit_event(Event::MediaDownloaded {
                    message_id,
                    path: final_path,
                });
            }
            None => {
                // Soft failure: logged and skipped, does not count against
                // the retry budget
                tracing::warn!(
                    message_id = message_id.0,
                    path = %dest.display(),
                    "Download returned no file"
                );
                self.emit_event(Event::DownloadSoftFailed {
                    message_id,
                    path: dest,
                });
            }
        }
        Ok(())
    }

    fn record_failure(&self, id: MessageId) {
        self.registry.record(id);
        self.emit_event(Event::MessageFailed { message_id: id });
    }
}

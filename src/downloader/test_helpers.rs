//! Shared test helpers - a scripted Message Source and downloader fixtures.

use crate::config::{Config, RetryConfig};
use crate::downloader::MediaDownloader;
use crate::error::SourceError;
use crate::source::{MessageSource, SourceResult};
use crate::types::{
    DocumentAttachment, Media, Message, MessageId, PhotoAttachment, Thumbnail, VideoAttachment,
};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tempfile::TempDir;

/// Scripted outcome for a single `download_file` call
pub(crate) enum MockOutcome {
    /// Write a small file at the destination and return its path
    Deliver,
    /// Return `Ok(None)` - soft failure
    Soft,
    /// Return the given error
    Fail(SourceError),
}

/// In-memory Message Source with per-file-id scripted download outcomes.
///
/// Unscripted downloads deliver. Call counters expose how often the
/// downloader actually hit the source.
pub(crate) struct MockSource {
    messages: Vec<Message>,
    scripted: Mutex<HashMap<String, VecDeque<MockOutcome>>>,
    download_calls: AtomicU32,
    refetch_calls: AtomicU32,
    session_log: Mutex<Vec<&'static str>>,
}

impl MockSource {
    pub(crate) fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            scripted: Mutex::new(HashMap::new()),
            download_calls: AtomicU32::new(0),
            refetch_calls: AtomicU32::new(0),
            session_log: Mutex::new(Vec::new()),
        }
    }

    /// Queue outcomes for a file id; consumed one per download call
    pub(crate) fn script(&self, file_id: &str, outcomes: Vec<MockOutcome>) {
        self.scripted
            .lock()
            .unwrap()
            .insert(file_id.to_string(), outcomes.into());
    }

    pub(crate) fn download_calls(&self) -> u32 {
        self.download_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn refetch_calls(&self) -> u32 {
        self.refetch_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn session_log(&self) -> Vec<&'static str> {
        self.session_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSource for MockSource {
    async fn start_session(&self) -> SourceResult<()> {
        self.session_log.lock().unwrap().push("start");
        Ok(())
    }

    async fn stop_session(&self) -> SourceResult<()> {
        self.session_log.lock().unwrap().push("stop");
        Ok(())
    }

    fn iter_messages<'a>(
        &'a self,
        _chat_id: &'a str,
        after: MessageId,
    ) -> BoxStream<'a, SourceResult<Message>> {
        let messages: Vec<SourceResult<Message>> = self
            .messages
            .iter()
            .filter(|m| m.id > after)
            .cloned()
            .map(Ok)
            .collect();
        Box::pin(futures::stream::iter(messages))
    }

    async fn download_file(&self, file_id: &str, dest: &Path) -> SourceResult<Option<PathBuf>> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(file_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or(MockOutcome::Deliver);
        match outcome {
            MockOutcome::Deliver => {
                std::fs::write(dest, file_id)
                    .map_err(|e| SourceError::Api(format!("mock write failed: {e}")))?;
                Ok(Some(dest.to_path_buf()))
            }
            MockOutcome::Soft => Ok(None),
            MockOutcome::Fail(err) => Err(err),
        }
    }

    async fn refetch_message(&self, _chat_id: &str, id: MessageId) -> SourceResult<Message> {
        self.refetch_calls.fetch_add(1, Ordering::SeqCst);
        self.messages
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| SourceError::Api(format!("message {id} not found")))
    }
}

/// A downloader over a temp directory with fast retries.
/// Returns the downloader and the tempdir (which must be kept alive).
pub(crate) async fn create_test_downloader(page_size: usize) -> (MediaDownloader, TempDir) {
    create_test_downloader_with(page_size, |_| {}).await
}

/// Same as [`create_test_downloader`] but with a caller-tweaked config
pub(crate) async fn create_test_downloader_with(
    page_size: usize,
    tweak: impl FnOnce(&mut Config),
) -> (MediaDownloader, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config {
        chat_id: "testchat".into(),
        download_dir: temp_dir.path().to_path_buf(),
        page_size,
        retry: RetryConfig {
            max_attempts: 3,
            retry_delay: Duration::from_millis(10),
            jitter: false,
        },
        ..Default::default()
    };
    tweak(&mut config);
    let downloader = MediaDownloader::new(config).await.unwrap();
    (downloader, temp_dir)
}

pub(crate) fn photo_message(id: i64) -> Message {
    Message::new(
        id,
        Some(Media::Photo(PhotoAttachment {
            file_id: format!("photo_fid_{id}"),
            file_unique_id: format!("photo_uid_{id}"),
            date: Some(1_700_000_000),
        })),
    )
}

pub(crate) fn document_message(id: i64, mime_type: &str) -> Message {
    Message::new(
        id,
        Some(Media::Document(DocumentAttachment {
            file_id: format!("doc_fid_{id}"),
            file_unique_id: format!("doc_uid_{id}"),
            mime_type: mime_type.into(),
            date: 1_700_000_000,
            file_name: None,
        })),
    )
}

pub(crate) fn video_message(id: i64, thumb_count: usize) -> Message {
    let thumbs = (0..thumb_count)
        .map(|i| Thumbnail {
            file_id: format!("thumb_fid_{id}_{i}"),
            file_unique_id: format!("thumb_uid_{id}_{i}"),
        })
        .collect();
    Message::new(
        id,
        Some(Media::Video(VideoAttachment {
            file_id: format!("video_fid_{id}"),
            file_unique_id: format!("video_uid_{id}"),
            mime_type: "video/mp4".into(),
            date: 1_700_000_000,
            file_name: None,
            thumbs,
        })),
    )
}

//! Configuration types for telegram-media-dl

use crate::error::{Error, Result};
use crate::types::{MediaKind, MessageId, RunReport};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for [`MediaDownloader`](crate::MediaDownloader).
///
/// Loading and persisting this value to a file is the embedder's job; the
/// library only defines the shape (serde-derived, with defaults for every
/// field except `chat_id`) and folds a finished run back into it via
/// [`Config::apply_report`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Target chat or channel identifier
    pub chat_id: String,

    /// Base directory for downloaded media (default: "./downloads").
    ///
    /// Files are placed under `<download_dir>/<chat_id>/<media-kind>/`.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Media kinds to consider for download (default: all five kinds)
    #[serde(default = "default_media_types")]
    pub media_types: Vec<MediaKind>,

    /// Per-kind format allow-lists for audio, document and video.
    ///
    /// A list whose first entry is `"all"` admits every format. A kind
    /// missing from the table also admits every format. Photo and voice have
    /// no format concept and ignore this table.
    #[serde(default = "default_file_formats")]
    pub file_formats: HashMap<MediaKind, Vec<String>>,

    /// Number of messages processed and awaited together as one page
    /// (default: 100)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Resume cursor: the last message id whose page fully completed
    /// (default: 0, i.e. start from the beginning of the chat)
    #[serde(default)]
    pub last_read_message_id: MessageId,

    /// Message ids that permanently failed in earlier runs, kept for a later
    /// retry pass. Unioned with each run's new failures by [`Config::apply_report`].
    #[serde(default)]
    pub ids_to_retry: BTreeSet<MessageId>,

    /// Retry behavior for transient and stale-reference failures
    #[serde(default)]
    pub retry: RetryConfig,

    /// Stop after the first full page (development/debug toggle)
    #[serde(default)]
    pub single_page: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chat_id: String::new(),
            download_dir: default_download_dir(),
            media_types: default_media_types(),
            file_formats: default_file_formats(),
            page_size: default_page_size(),
            last_read_message_id: MessageId::default(),
            ids_to_retry: BTreeSet::new(),
            retry: RetryConfig::default(),
            single_page: false,
        }
    }
}

impl Config {
    /// Validate the configuration, returning the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.chat_id.is_empty() {
            return Err(Error::config("chat_id must not be empty", "chat_id"));
        }
        if self.page_size == 0 {
            return Err(Error::config(
                "page_size must be greater than zero",
                "page_size",
            ));
        }
        if self.media_types.is_empty() {
            return Err(Error::config(
                "media_types must list at least one kind",
                "media_types",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::config(
                "retry.max_attempts must be at least 1",
                "retry.max_attempts",
            ));
        }
        Ok(())
    }

    /// Fold a finished run back into the configuration.
    ///
    /// Advances the resume cursor and unions the run's failed ids into
    /// `ids_to_retry` (set semantics: an id is kept at most once no matter
    /// how many runs it failed in). The embedder persists the updated value.
    pub fn apply_report(&mut self, report: &RunReport) {
        self.last_read_message_id = report.last_read_message_id;
        self.ids_to_retry.extend(report.failed_ids.iter().copied());
    }

    /// Whether a media kind is enabled for download
    pub fn is_kind_enabled(&self, kind: MediaKind) -> bool {
        self.media_types.contains(&kind)
    }
}

/// Retry configuration for the per-message download state machine
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum total attempts per message before it is recorded as a
    /// permanent failure (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay before retrying a transient failure (default: 5 seconds).
    ///
    /// Stale-reference retries re-fetch and retry without delay.
    #[serde(default = "default_retry_delay", with = "duration_serde")]
    pub retry_delay: Duration,

    /// Add random jitter (up to 100% of `retry_delay`) to transient backoff
    /// to avoid synchronized retries within a page (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay: default_retry_delay(),
            jitter: false,
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_media_types() -> Vec<MediaKind> {
    MediaKind::ALL.to_vec()
}

fn default_file_formats() -> HashMap<MediaKind, Vec<String>> {
    let mut formats = HashMap::new();
    for kind in MediaKind::ALL {
        if kind.has_format() {
            formats.insert(kind, vec![crate::filter::WILDCARD_FORMAT.to_string()]);
        }
    }
    formats
}

fn default_page_size() -> usize {
    100
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(5)
}

/// Serde support for Duration as seconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

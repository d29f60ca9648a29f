//! Core types for telegram-media-dl

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Unique identifier for a message within a chat or channel.
///
/// Message ids are assigned by the remote source and increase monotonically
/// within a chat, which is what makes them usable as a resume cursor.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl MessageId {
    /// Create a new MessageId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for MessageId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<MessageId> for i64 {
    fn from(id: MessageId) -> Self {
        id.0
    }
}

impl PartialEq<i64> for MessageId {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

impl PartialEq<MessageId> for i64 {
    fn eq(&self, other: &MessageId) -> bool {
        *self == other.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MessageId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// The five supported media attachment kinds.
///
/// Also used as the per-kind directory name in the download layout
/// (`<base>/<chat-id>/<media-kind>/`), so the serialized form and `as_str`
/// must stay in sync.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Music or other audio files
    Audio,
    /// Generic document attachments
    Document,
    /// Photos (no MIME type, always stored as JPEG)
    Photo,
    /// Video attachments (thumbnails are downloaded, not the video body)
    Video,
    /// Voice notes
    Voice,
}

impl MediaKind {
    /// All kinds, in the order they are matched against configuration
    pub const ALL: [MediaKind; 5] = [
        MediaKind::Audio,
        MediaKind::Document,
        MediaKind::Photo,
        MediaKind::Video,
        MediaKind::Voice,
    ];

    /// Lowercase name, used for directory layout and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Document => "document",
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Voice => "voice",
        }
    }

    /// Whether this kind carries a file format that the format filter applies to.
    ///
    /// Photos and voice notes have no format concept and are always admitted.
    pub fn has_format(&self) -> bool {
        matches!(
            self,
            MediaKind::Audio | MediaKind::Document | MediaKind::Video
        )
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A thumbnail image attached to a video
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    /// Downloadable file id for the thumbnail image
    pub file_id: String,
    /// Stable identifier for the thumbnail contents
    pub file_unique_id: String,
}

/// An audio attachment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioAttachment {
    /// Downloadable file id
    pub file_id: String,
    /// Stable identifier for the file contents
    pub file_unique_id: String,
    /// MIME type, e.g. `audio/mpeg`
    pub mime_type: String,
    /// Creation timestamp (Unix seconds, UTC)
    pub date: i64,
    /// Original file name hint, if the sender provided one
    pub file_name: Option<String>,
}

/// A document attachment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAttachment {
    /// Downloadable file id
    pub file_id: String,
    /// Stable identifier for the file contents
    pub file_unique_id: String,
    /// MIME type, e.g. `application/pdf`
    pub mime_type: String,
    /// Creation timestamp (Unix seconds, UTC)
    pub date: i64,
    /// Original file name hint, if the sender provided one
    pub file_name: Option<String>,
}

/// A photo attachment.
///
/// Photos carry no MIME type; the source always delivers JPEG.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoAttachment {
    /// Downloadable file id
    pub file_id: String,
    /// Stable identifier for the file contents
    pub file_unique_id: String,
    /// Creation timestamp (Unix seconds, UTC), when the source provides one
    pub date: Option<i64>,
}

/// A video attachment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoAttachment {
    /// Downloadable file id of the video body
    pub file_id: String,
    /// Stable identifier for the file contents
    pub file_unique_id: String,
    /// MIME type, e.g. `video/mp4`
    pub mime_type: String,
    /// Creation timestamp (Unix seconds, UTC)
    pub date: i64,
    /// Original file name hint, if the sender provided one
    pub file_name: Option<String>,
    /// Thumbnail images; these are what gets downloaded for videos
    pub thumbs: Vec<Thumbnail>,
}

/// A voice note attachment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceAttachment {
    /// Downloadable file id
    pub file_id: String,
    /// Stable identifier for the file contents
    pub file_unique_id: String,
    /// MIME type, e.g. `audio/ogg`
    pub mime_type: String,
    /// Creation timestamp (Unix seconds, UTC)
    pub date: i64,
}

/// A media attachment, tagged by kind.
///
/// Download handling dispatches exhaustively on this union; the variant of
/// the attachment itself decides the download path, never other message
/// attributes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Media {
    /// Audio attachment
    Audio(AudioAttachment),
    /// Document attachment
    Document(DocumentAttachment),
    /// Photo attachment
    Photo(PhotoAttachment),
    /// Video attachment
    Video(VideoAttachment),
    /// Voice note attachment
    Voice(VoiceAttachment),
}

impl Media {
    /// The kind tag of this attachment
    pub fn kind(&self) -> MediaKind {
        match self {
            Media::Audio(_) => MediaKind::Audio,
            Media::Document(_) => MediaKind::Document,
            Media::Photo(_) => MediaKind::Photo,
            Media::Video(_) => MediaKind::Video,
            Media::Voice(_) => MediaKind::Voice,
        }
    }

    /// Downloadable file id of the attachment body
    pub fn file_id(&self) -> &str {
        match self {
            Media::Audio(a) => &a.file_id,
            Media::Document(d) => &d.file_id,
            Media::Photo(p) => &p.file_id,
            Media::Video(v) => &v.file_id,
            Media::Voice(v) => &v.file_id,
        }
    }

    /// Stable identifier for the attachment contents
    pub fn file_unique_id(&self) -> &str {
        match self {
            Media::Audio(a) => &a.file_unique_id,
            Media::Document(d) => &d.file_unique_id,
            Media::Photo(p) => &p.file_unique_id,
            Media::Video(v) => &v.file_unique_id,
            Media::Voice(v) => &v.file_unique_id,
        }
    }
}

/// One unit in the ordered remote message stream
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message id, monotonically increasing within the chat
    pub id: MessageId,
    /// Media attachment, if the message carries one
    pub media: Option<Media>,
}

impl Message {
    /// Create a new message
    pub fn new(id: impl Into<MessageId>, media: Option<Media>) -> Self {
        Self {
            id: id.into(),
            media,
        }
    }
}

/// Events emitted during a download run.
///
/// Subscribe via [`MediaDownloader::subscribe`](crate::MediaDownloader::subscribe).
/// Multiple subscribers are supported; events are broadcast independently to each.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// An attachment file finished downloading
    MediaDownloaded {
        /// Message the attachment belongs to
        message_id: MessageId,
        /// Final path of the downloaded file (after duplicate reconciliation)
        path: PathBuf,
    },
    /// An attachment was rejected by the format filter
    MediaSkipped {
        /// Message the attachment belongs to
        message_id: MessageId,
        /// The resolved format that was not in the allow-list
        file_format: Option<String>,
    },
    /// A download call returned no file without raising (soft failure)
    DownloadSoftFailed {
        /// Message the attachment belongs to
        message_id: MessageId,
        /// Destination path the download was asked for
        path: PathBuf,
    },
    /// A message permanently failed and was recorded for a later retry pass
    MessageFailed {
        /// The failed message id
        message_id: MessageId,
    },
    /// A page of messages reached its join barrier and the cursor advanced
    PageCompleted {
        /// Resume cursor after the page (max message id in the page)
        cursor: MessageId,
        /// Number of messages in the page
        messages: usize,
    },
    /// The run finished and the final report is available
    RunCompleted {
        /// Final resume cursor
        last_read_message_id: MessageId,
        /// Count of ids newly recorded as permanently failed this run
        newly_failed: usize,
    },
}

/// Outcome of a completed run, to be folded back into persisted configuration
/// via [`Config::apply_report`](crate::config::Config::apply_report).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// The last message id that reached a terminal outcome
    pub last_read_message_id: MessageId,
    /// Ids that permanently failed during this run
    pub failed_ids: BTreeSet<MessageId>,
}

impl RunReport {
    /// Count of ids newly recorded as failed this run
    pub fn newly_failed(&self) -> usize {
        self.failed_ids.len()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_id_ordering_and_display() {
        let a = MessageId::new(7);
        let b = MessageId::from(42);

        assert!(a < b);
        assert_eq!(a.to_string(), "7");
        assert_eq!(b.get(), 42);
        assert_eq!(a, 7_i64);
        assert_eq!(42_i64, b);
    }

    #[test]
    fn message_id_parses_from_string() {
        let id: MessageId = "1234".parse().unwrap();
        assert_eq!(id, MessageId(1234));

        assert!("not a number".parse::<MessageId>().is_err());
    }

    #[test]
    fn media_kind_as_str_matches_serde_form() {
        for kind in MediaKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn media_kind_format_concept() {
        assert!(MediaKind::Audio.has_format());
        assert!(MediaKind::Document.has_format());
        assert!(MediaKind::Video.has_format());
        assert!(!MediaKind::Photo.has_format());
        assert!(!MediaKind::Voice.has_format());
    }

    #[test]
    fn media_kind_dispatch_is_the_attachment_variant() {
        let media = Media::Photo(PhotoAttachment {
            file_id: "f1".into(),
            file_unique_id: "u1".into(),
            date: Some(1_700_000_000),
        });

        assert_eq!(media.kind(), MediaKind::Photo);
        assert_eq!(media.file_id(), "f1");
        assert_eq!(media.file_unique_id(), "u1");
    }

    #[test]
    fn media_serde_round_trips_with_kind_tag() {
        let media = Media::Voice(VoiceAttachment {
            file_id: "vf".into(),
            file_unique_id: "vu".into(),
            mime_type: "audio/ogg".into(),
            date: 1_700_000_000,
        });

        let json = serde_json::to_string(&media).unwrap();
        assert!(json.contains("\"type\":\"voice\""));

        let back: Media = serde_json::from_str(&json).unwrap();
        assert_eq!(back, media);
    }

    #[test]
    fn run_report_counts_newly_failed() {
        let report = RunReport {
            last_read_message_id: MessageId(10),
            failed_ids: [MessageId(3), MessageId(7)].into_iter().collect(),
        };
        assert_eq!(report.newly_failed(), 2);
    }
}

//! Attachment naming — canonical file paths and format strings.
//!
//! Pure functions only; the same attachment always resolves to the same
//! path, which is what makes the duplicate resolver's existence check
//! meaningful across runs.
//!
//! Layout: `<base>/<chat-id>/<media-kind>/<computed-name>`.

use crate::types::Media;
use chrono::{TimeZone, Utc};
use std::path::{Path, PathBuf};

/// Resolved destination and format for one attachment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaMeta {
    /// Full destination path, extension included
    pub path: PathBuf,
    /// MIME-derived format string for kinds that have one (audio, document,
    /// video, voice); `None` for photos, which are not format-filtered
    pub file_format: Option<String>,
}

/// Resolve the canonical destination path and format for an attachment.
///
/// Naming rules per kind:
/// - audio / document / video: `<date>-<file-name-hint-or-file-unique-id>.<format>`
/// - voice: `voice_<ISO-8601 UTC timestamp>.<format>`
/// - photo: `<date-or-empty><file-unique-id>.jpg`, no format
pub fn resolve_media_meta(media: &Media, base: &Path, chat_id: &str) -> MediaMeta {
    let kind = media.kind();
    let dir = base.join(chat_id).join(kind.as_str());

    match media {
        Media::Audio(a) => {
            let format = mime_suffix(&a.mime_type);
            let name = dated_name(a.date, a.file_name.as_deref(), &a.file_unique_id, &format);
            MediaMeta {
                path: dir.join(name),
                file_format: Some(format),
            }
        }
        Media::Document(d) => {
            let format = mime_suffix(&d.mime_type);
            let name = dated_name(d.date, d.file_name.as_deref(), &d.file_unique_id, &format);
            MediaMeta {
                path: dir.join(name),
                file_format: Some(format),
            }
        }
        Media::Video(v) => {
            let format = mime_suffix(&v.mime_type);
            let name = dated_name(v.date, v.file_name.as_deref(), &v.file_unique_id, &format);
            MediaMeta {
                path: dir.join(name),
                file_format: Some(format),
            }
        }
        Media::Voice(v) => {
            let format = mime_suffix(&v.mime_type);
            let name = format!("voice_{}.{}", iso8601_utc(v.date), format);
            MediaMeta {
                path: dir.join(name),
                file_format: Some(format),
            }
        }
        Media::Photo(p) => {
            let date = p.date.map(|d| d.to_string()).unwrap_or_default();
            let name = format!("{}{}.jpg", date, p.file_unique_id);
            MediaMeta {
                path: dir.join(name),
                file_format: None,
            }
        }
    }
}

/// Destination path for the `index`-th thumbnail of a video.
///
/// Derived from the video's resolved path so thumbnails of different videos
/// (and multiple thumbnails of one video) never collide.
pub fn thumbnail_path(video_path: &Path, index: usize) -> PathBuf {
    let stem = video_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("thumb");
    video_path.with_file_name(format!("{stem}_thumb{index}.jpg"))
}

/// `<date>-<hint-or-unique-id>.<format>` name used for audio, document and video
fn dated_name(date: i64, file_name: Option<&str>, file_unique_id: &str, format: &str) -> String {
    let base = file_name.unwrap_or(file_unique_id);
    format!("{date}-{base}.{format}")
}

/// The substring after `/` in a MIME type (`audio/mpeg` -> `mpeg`).
/// A MIME type without a slash is returned unchanged.
fn mime_suffix(mime_type: &str) -> String {
    mime_type
        .split('/')
        .next_back()
        .unwrap_or(mime_type)
        .to_string()
}

/// ISO-8601 UTC timestamp without offset suffix (`2023-11-14T22:13:20`).
/// Falls back to the raw seconds value if the timestamp is unrepresentable.
fn iso8601_utc(unix_secs: i64) -> String {
    match Utc.timestamp_opt(unix_secs, 0).single() {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        None => unix_secs.to_string(),
    }
}

//! Format admission — per-kind allow-lists with an `all` wildcard

use crate::types::MediaKind;
use std::collections::HashMap;

/// Sentinel allow-list entry admitting every format.
///
/// Only honored in the first position of a kind's allow-list.
pub const WILDCARD_FORMAT: &str = "all";

/// Decide whether an attachment's resolved format may be downloaded.
///
/// Kinds without a format concept (photo, voice) are always admitted. For
/// audio, document and video the format must appear in the kind's allow-list
/// unless the list's first entry is [`WILDCARD_FORMAT`]. A kind missing from
/// the table admits everything.
pub fn can_download(
    kind: MediaKind,
    allow_lists: &HashMap<MediaKind, Vec<String>>,
    file_format: Option<&str>,
) -> bool {
    if !kind.has_format() {
        return true;
    }
    let Some(allowed) = allow_lists.get(&kind) else {
        return true;
    };
    if allowed.first().map(String::as_str) == Some(WILDCARD_FORMAT) {
        return true;
    }
    match file_format {
        Some(format) => allowed.iter().any(|a| a == format),
        None => false,
    }
}

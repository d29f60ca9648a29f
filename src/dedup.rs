//! Filesystem collision handling — existence checks, deterministic alternate
//! names, and byte-identical duplicate reconciliation.
//!
//! The downloader checks the canonical destination before each download; when
//! a same-named file is already present it downloads to the next available
//! alternate name and afterwards collapses the pair if the bytes turn out to
//! be identical.

use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Maximum number of rename attempts when resolving file collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// True iff a regular file (not a directory) already occupies `path`
pub fn is_existing_file(path: &Path) -> bool {
    !path.is_dir() && path.exists()
}

/// Deterministic alternate name for an occupied path.
///
/// Probes `name (1).ext`, `name (2).ext`, ... and returns the first free
/// candidate. Errors if the path cannot be decomposed or every candidate up
/// to the attempt cap is taken.
pub fn next_available_name(path: &Path) -> Result<PathBuf> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "cannot extract file stem".to_string(),
        })?;

    let extension = path.extension().and_then(|e| e.to_str());

    let parent = path.parent().ok_or_else(|| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: "cannot extract parent directory".to_string(),
    })?;

    for i in 1..=MAX_RENAME_ATTEMPTS {
        let candidate = match extension {
            Some(ext) => format!("{} ({}).{}", stem, i, ext),
            None => format!("{} ({})", stem, i),
        };
        let candidate_path = parent.join(candidate);
        if !candidate_path.exists() {
            return Ok(candidate_path);
        }
    }

    Err(Error::FileCollision {
        path: path.to_path_buf(),
        reason: format!("no free alternate name after {MAX_RENAME_ATTEMPTS} attempts"),
    })
}

/// Collapse a freshly downloaded alternate-named file into its original if
/// the two are byte-identical.
///
/// `downloaded` is expected to be a path produced by [`next_available_name`]
/// (`name (n).ext`). If the original `name.ext` exists and hashes equal, the
/// alternate copy is removed and the original path is returned; otherwise the
/// downloaded path is kept as-is. Paths without an alternate-name suffix are
/// returned unchanged.
pub fn reconcile_duplicate(downloaded: &Path) -> Result<PathBuf> {
    let Some(original) = collision_origin(downloaded) else {
        return Ok(downloaded.to_path_buf());
    };
    if is_existing_file(&original) && files_identical(&original, downloaded)? {
        std::fs::remove_file(downloaded)?;
        tracing::info!(
            kept = %original.display(),
            removed = %downloaded.display(),
            "Removed byte-identical duplicate"
        );
        return Ok(original);
    }
    Ok(downloaded.to_path_buf())
}

/// The original path a `name (n).ext` alternate was derived from, if the
/// file name carries such a suffix
fn collision_origin(path: &Path) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let open = stem.rfind(" (")?;
    let counter = &stem[open + 2..];
    if !counter.ends_with(')') || counter.len() < 2 {
        return None;
    }
    let digits = &counter[..counter.len() - 1];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let original_stem = &stem[..open];
    let original_name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{original_stem}.{ext}"),
        None => original_stem.to_string(),
    };
    Some(path.with_file_name(original_name))
}

/// Whether two files have identical contents (length check, then SHA-256)
fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    let meta_a = std::fs::metadata(a)?;
    let meta_b = std::fs::metadata(b)?;
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }
    Ok(sha256_file(a)? == sha256_file(b)?)
}

fn sha256_file(path: &Path) -> Result<[u8; 32]> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().into())
}

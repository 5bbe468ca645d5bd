//! Filesystem and formatting helpers shared by the CLI and the driver.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::voice::SUPPORTED_SAMPLE_EXTENSIONS;

/// Create `path` and its parents if missing, returning it for chaining.
pub fn ensure_dir(path: impl AsRef<Path>) -> io::Result<PathBuf> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(path.to_path_buf())
}

/// Reference sample for `character_id` inside `voices_dir`, if present.
///
/// Tries `<id>.<ext>` for every supported extension, in order.
pub fn get_voice_sample_path(voices_dir: &Path, character_id: &str) -> Option<PathBuf> {
    SUPPORTED_SAMPLE_EXTENSIONS
        .iter()
        .map(|ext| voices_dir.join(format!("{character_id}.{ext}")))
        .find(|p| p.is_file())
}

/// True when `path` is an existing file with a supported audio extension.
pub fn validate_audio_file(path: &Path) -> bool {
    path.is_file() && has_supported_extension(path)
}

pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            SUPPORTED_SAMPLE_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// `m:ss` rendering of a duration in seconds.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Replace characters that are unsafe in file names with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' | ' ' => '_',
            c => c,
        })
        .collect()
}

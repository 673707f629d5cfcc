//! Output sink: resolve where a rendered page goes and write it atomically.
//!
//! ## Atomic writes
//!
//! Bytes are written to a [`tempfile::NamedTempFile`] in the target's own
//! directory, flushed, then renamed over the target. A failure at any point
//! drops the temp file (deleting it), so callers see either the complete new
//! image, the untouched previous file, or nothing.

use crate::error::RenderError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Choose the output path for page `page_index`.
///
/// An explicit `requested` path is used verbatim. Otherwise the file is
/// `<cache_dir>/page_<index>_<unix-millis>.png`.
pub fn resolve_output_path(requested: Option<&Path>, cache_dir: &Path, page_index: usize) -> PathBuf {
    match requested {
        Some(p) => p.to_path_buf(),
        None => cache_dir.join(synthesized_file_name(page_index, unix_millis())),
    }
}

fn synthesized_file_name(page_index: usize, millis: u128) -> String {
    format!("page_{page_index}_{millis}.png")
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Write `bytes` to `target`, creating parent directories as needed.
///
/// # Errors
/// [`RenderError::WriteFailure`] for any filesystem error. No partial file is
/// left at `target`.
pub fn persist(bytes: &[u8], target: &Path) -> Result<(), RenderError> {
    let write_failure = |source: std::io::Error| RenderError::WriteFailure {
        path: target.to_path_buf(),
        source,
    };

    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(write_failure)?;

    let mut tmp = NamedTempFile::new_in(&parent).map_err(write_failure)?;
    tmp.write_all(bytes).map_err(write_failure)?;
    tmp.as_file().sync_all().map_err(write_failure)?;
    debug!("Staged {} bytes at {}", bytes.len(), tmp.path().display());

    tmp.persist(target).map_err(|e| write_failure(e.error))?;

    info!("Bitmap saved to: {}", target.display());
    Ok(())
}

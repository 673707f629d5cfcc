//! Document accessor: existence, size and read permission of a source file.
//!
//! Two entry points with deliberately different failure behaviour:
//!
//! * [`probe`] never fails. Every outcome, including a missing or unreadable
//!   file, is data on the returned [`SourceProbe`].
//! * [`open_source`] returns the open read-only handle the rest of the
//!   request uses, or the classified reason it could not be opened.
//!
//! Neither interprets file content beyond the four-byte `%PDF` header check
//! recorded by [`probe`].

use crate::error::RenderError;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Observed state of a source path. Evaluated once per request, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceProbe {
    pub path: PathBuf,
    pub exists: bool,
    /// Size in bytes. `None` when the entry does not exist.
    pub size: Option<u64>,
    /// Whether a read-only open succeeded. `None` when the entry does not exist.
    pub readable: Option<bool>,
    /// Whether the first four bytes are `%PDF`. `None` unless readable.
    pub pdf_header: Option<bool>,
}

/// Inspect `path` without opening a renderer.
pub fn probe(path: &Path) -> SourceProbe {
    let mut report = SourceProbe {
        path: path.to_path_buf(),
        exists: false,
        size: None,
        readable: None,
        pdf_header: None,
    };

    let Ok(meta) = std::fs::metadata(path) else {
        debug!("Probe: nothing at {}", path.display());
        return report;
    };
    report.exists = true;
    report.size = Some(meta.len());

    match File::open(path) {
        Ok(mut f) => {
            report.readable = Some(true);
            if meta.is_file() {
                let mut magic = [0u8; 4];
                report.pdf_header = Some(f.read_exact(&mut magic).is_ok() && &magic == PDF_MAGIC);
            }
        }
        Err(_) => report.readable = Some(false),
    }

    debug!("Probe: {:?}", report);
    report
}

/// Open `path` read-only for the duration of one request.
///
/// # Errors
/// - [`RenderError::FileNotFound`] — nothing exists at `path`
/// - [`RenderError::PermissionDenied`] — the entry exists but cannot be read
/// - [`RenderError::CorruptDocument`] — the entry is a directory
pub fn open_source(path: &Path) -> Result<File, RenderError> {
    let meta = std::fs::metadata(path).map_err(|e| classify_io(path, e))?;

    if meta.is_dir() {
        return Err(RenderError::CorruptDocument {
            path: path.to_path_buf(),
            detail: "path is a directory, not a PDF file".into(),
        });
    }

    let file = File::open(path).map_err(|e| classify_io(path, e))?;
    debug!("Opened source {} ({} bytes)", path.display(), meta.len());
    Ok(file)
}

fn classify_io(path: &Path, e: io::Error) -> RenderError {
    match e.kind() {
        // A file used as a parent directory, or a name the OS refuses, also
        // means nothing exists at `path`.
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory | io::ErrorKind::InvalidFilename => {
            RenderError::FileNotFound {
                path: path.to_path_buf(),
            }
        }
        io::ErrorKind::PermissionDenied => RenderError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => RenderError::Unexpected(format!("cannot open '{}': {}", path.display(), e)),
    }
}

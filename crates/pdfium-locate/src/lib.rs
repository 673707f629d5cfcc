//! # pdfium-locate
//!
//! Find an installed [PDFium](https://pdfium.googlesource.com/pdfium/) shared
//! library and bind `pdfium-render` to it.
//!
//! ## Search order
//!
//! 1. `PDFIUM_LIB_PATH` — a file path to the library, or a directory that
//!    contains it.
//! 2. The per-user cache directory (`~/.cache/pdf2bitmap/pdfium/` on Linux,
//!    override with `PDFIUM_CACHE_DIR`).
//! 3. The directory of the running executable, and its `libs/` child.
//! 4. The current working directory.
//! 5. The system library search path ([`Pdfium::bind_to_system_library`]).
//!
//! The first existing candidate wins; the resolved path is remembered for the
//! rest of the process so later binds skip the filesystem walk.
//!
//! ```rust,no_run
//! use pdfium_locate::bind_pdfium;
//!
//! let pdfium = bind_pdfium().expect("PDFium unavailable");
//! ```

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use pdfium_render::prelude::Pdfium;
use thiserror::Error;
use tracing::debug;

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned while locating or binding PDFium.
#[derive(Error, Debug)]
pub enum PdfiumLocateError {
    /// The current OS/architecture combination has no known library name.
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// No candidate existed and the system library could not be bound either.
    #[error(
        "PDFium library '{lib_name}' not found.\n\
         Searched: {searched:?}\n\
         Set PDFIUM_LIB_PATH=/path/to/{lib_name} or install pdfium system-wide.\n\
         System bind error: {system_error}"
    )]
    NotFound {
        lib_name: &'static str,
        searched: Vec<PathBuf>,
        system_error: String,
    },

    /// A library file was found but `libloading` / `pdfium-render` rejected it.
    #[error("Failed to bind PDFium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },
}

// ── Platform metadata ────────────────────────────────────────────────────────

/// Platform-specific file name of the PDFium shared library.
pub fn library_name() -> Result<&'static str, PdfiumLocateError> {
    match std::env::consts::OS {
        "macos" | "ios" => Ok("libpdfium.dylib"),
        "linux" | "android" | "freebsd" | "openbsd" | "netbsd" => Ok("libpdfium.so"),
        "windows" => Ok("pdfium.dll"),
        os => Err(PdfiumLocateError::UnsupportedPlatform {
            os: os.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }),
    }
}

/// Directory searched for a cached copy of the library.
///
/// Default locations:
/// - **macOS**: `~/Library/Caches/pdf2bitmap/pdfium/`
/// - **Linux**: `~/.cache/pdf2bitmap/pdfium/`
/// - **Windows**: `%LOCALAPPDATA%\pdf2bitmap\pdfium\`
///
/// Override by setting `PDFIUM_CACHE_DIR`.
pub fn pdfium_cache_dir() -> PathBuf {
    if let Ok(override_dir) = std::env::var("PDFIUM_CACHE_DIR") {
        return PathBuf::from(override_dir);
    }

    let base = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir);

    base.join("pdf2bitmap").join("pdfium")
}

/// Every path that [`locate_pdfium`] checks, in priority order.
pub fn candidate_paths(lib_name: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("PDFIUM_LIB_PATH") {
        let p = PathBuf::from(env_path);
        if p.is_dir() {
            paths.push(p.join(lib_name));
        } else {
            paths.push(p);
        }
    }

    paths.push(pdfium_cache_dir().join(lib_name));

    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            paths.push(dir.join(lib_name));
            paths.push(dir.join("libs").join(lib_name));
        }
    }

    paths.push(PathBuf::from(".").join(lib_name));
    paths
}

static RESOLVED_PATH: OnceLock<PathBuf> = OnceLock::new();

// ── Public API ───────────────────────────────────────────────────────────────

/// Returns the first existing candidate library path, or `None`.
pub fn locate_pdfium() -> Option<PathBuf> {
    if let Some(path) = RESOLVED_PATH.get() {
        return Some(path.clone());
    }

    let lib_name = library_name().ok()?;
    let found = candidate_paths(lib_name).into_iter().find(|p| p.is_file())?;
    debug!("Located pdfium at {}", found.display());

    // Best-effort cache; a concurrent winner stored the same answer.
    let _ = RESOLVED_PATH.set(found.clone());
    Some(found)
}

/// Binds to PDFium: located candidate first, system library as fallback.
pub fn bind_pdfium() -> Result<Pdfium, PdfiumLocateError> {
    if let Some(path) = locate_pdfium() {
        return bind_pdfium_from_path(&path);
    }

    let lib_name = library_name()?;
    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| PdfiumLocateError::NotFound {
            lib_name,
            searched: candidate_paths(lib_name),
            system_error: e.to_string(),
        })
}

/// Binds to a PDFium library at an explicit `path`, which may name the
/// library file or the directory containing it.
pub fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, PdfiumLocateError> {
    let path = if path.is_dir() {
        path.join(library_name()?)
    } else {
        path.to_path_buf()
    };
    debug!("Binding pdfium from {}", path.display());
    Pdfium::bind_to_library(&path)
        .map(Pdfium::new)
        .map_err(|e| PdfiumLocateError::Bind {
            path,
            reason: e.to_string(),
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

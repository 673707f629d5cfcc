//! Capability interface to the external PDF decoding/rasterisation engine.
//!
//! The pipeline never talks to pdfium directly. It sees three narrow traits:
//!
//! ```text
//! PdfEngine ──open_document(&File)──▶ EngineDocument ──open_page(i)──▶ EnginePage
//!                                     page_count()                     size(), render()
//! ```
//!
//! Lifetimes encode the release order. A document borrows the engine and the
//! caller's open file handle; a page borrows its document. The borrow checker
//! therefore forbids closing the file before the document, or the document
//! before the page, and plain scope exit performs the unwind on every path.
//!
//! [`pdfium::PdfiumEngine`] is the production implementation.

pub mod pdfium;

use crate::pipeline::surface::{PageSize, PageTransform, RasterSurface};
use std::fs::File;
use thiserror::Error;

/// Rendering quality hint passed through to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// On-screen quality. Used by page conversion.
    #[default]
    Display,
    /// Print quality.
    Print,
}

/// Errors reported by an engine implementation.
///
/// These are engine-level facts; [`crate::pipeline::session`] and
/// [`crate::pipeline::render`] classify them into [`crate::RenderError`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// The document is encrypted and no password was supplied.
    #[error("document is encrypted and requires a password")]
    PasswordRequired,

    /// The decoder refused the document (bad header, broken xref, …).
    #[error("document rejected by decoder: {0}")]
    Rejected(String),

    /// A page could not be loaded.
    #[error("page could not be loaded: {0}")]
    Page(String),

    /// Drawing the page failed.
    #[error("{0}")]
    Render(String),

    /// Reading the underlying file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Entry point of a PDF engine.
///
/// Implementations must be shareable across threads: concurrent requests
/// each open their own document through the same engine.
pub trait PdfEngine: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Decode the document readable through `file`.
    fn open_document<'a>(
        &'a self,
        file: &'a File,
    ) -> Result<Box<dyn EngineDocument + 'a>, EngineError>;
}

/// One decoded document. Dropping it releases the decode context.
pub trait EngineDocument {
    fn page_count(&self) -> usize;

    /// Load page `index`. Callers guarantee `index < page_count()`.
    fn open_page<'p>(&'p self, index: usize) -> Result<Box<dyn EnginePage + 'p>, EngineError>;
}

/// One loaded page. Dropping it closes the page.
pub trait EnginePage {
    /// Intrinsic page size in points.
    fn size(&self) -> PageSize;

    /// Draw the page into `surface`, mapping page space through `transform`.
    ///
    /// The surface is already filled with its background; implementations
    /// draw over it and must not resize it.
    fn render(
        &self,
        surface: &mut RasterSurface,
        transform: &PageTransform,
        mode: RenderMode,
    ) -> Result<(), EngineError>;
}

//! Renderer session: one decoded document bound to one open file handle.
//!
//! A session is created per request and dropped at the end of it; sessions
//! are never pooled. [`RenderSession::open_page`] takes `&mut self`, so the
//! borrow checker allows at most one open [`PageHandle`] per session, and the
//! page must be dropped before the session can be.

use crate::engine::{EngineDocument, EngineError, EnginePage, PdfEngine};
use crate::error::RenderError;
use crate::pipeline::surface::PageSize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An open decode context for one PDF document.
pub struct RenderSession<'a> {
    document: Box<dyn EngineDocument + 'a>,
    path: PathBuf,
    page_count: usize,
}

impl<'a> RenderSession<'a> {
    /// Decode the document behind `handle`.
    ///
    /// `path` is only used for error context; the bytes come from `handle`.
    ///
    /// # Errors
    /// [`RenderError::CorruptDocument`] when the engine rejects the document
    /// (unparseable, encrypted without a password);
    /// [`RenderError::PermissionDenied`] when the engine cannot read the handle.
    pub fn open(
        engine: &'a dyn PdfEngine,
        handle: &'a File,
        path: &Path,
    ) -> Result<Self, RenderError> {
        let document = engine
            .open_document(handle)
            .map_err(|e| classify_open_error(path, e))?;
        let page_count = document.page_count();
        debug!(
            "Session opened on {} via {} ({} pages)",
            path.display(),
            engine.name(),
            page_count
        );

        Ok(Self {
            document,
            path: path.to_path_buf(),
            page_count,
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Fail with [`RenderError::CorruptDocument`] when the document has no pages.
    pub fn require_pages(&self) -> Result<(), RenderError> {
        if self.page_count == 0 {
            return Err(RenderError::CorruptDocument {
                path: self.path.clone(),
                detail: "document has no pages".into(),
            });
        }
        Ok(())
    }

    /// Open page `index` (0-based).
    ///
    /// # Errors
    /// [`RenderError::PageIndexOutOfRange`] when `index < 0` or
    /// `index >= page_count()`; [`RenderError::CorruptDocument`] when the
    /// engine cannot load an in-range page.
    pub fn open_page(&mut self, index: i64) -> Result<PageHandle<'_>, RenderError> {
        let out_of_range = || RenderError::PageIndexOutOfRange {
            index,
            page_count: self.page_count,
        };
        let idx = usize::try_from(index).map_err(|_| out_of_range())?;
        if idx >= self.page_count {
            return Err(out_of_range());
        }

        let page = self
            .document
            .open_page(idx)
            .map_err(|e| RenderError::CorruptDocument {
                path: self.path.clone(),
                detail: format!("page {idx}: {e}"),
            })?;
        let size = page.size();
        debug!("Page {} opened: {}x{} pt", idx, size.width, size.height);

        Ok(PageHandle {
            index: idx,
            size,
            page,
        })
    }
}

impl Drop for RenderSession<'_> {
    fn drop(&mut self) {
        debug!("Session closed on {}", self.path.display());
    }
}

fn classify_open_error(path: &Path, e: EngineError) -> RenderError {
    match e {
        EngineError::Io(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
            RenderError::PermissionDenied {
                path: path.to_path_buf(),
            }
        }
        other => RenderError::CorruptDocument {
            path: path.to_path_buf(),
            detail: other.to_string(),
        },
    }
}

/// One open page, borrowed from its session.
pub struct PageHandle<'s> {
    index: usize,
    size: PageSize,
    page: Box<dyn EnginePage + 's>,
}

impl<'s> PageHandle<'s> {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Intrinsic size in points.
    pub fn size(&self) -> PageSize {
        self.size
    }

    pub(crate) fn engine_page(&self) -> &dyn EnginePage {
        self.page.as_ref()
    }
}

impl Drop for PageHandle<'_> {
    fn drop(&mut self) {
        debug!("Page {} closed", self.index);
    }
}

//! PDFium-backed engine via `pdfium-render`.
//!
//! ## Why load from a reader?
//!
//! The caller opens the file and keeps the handle for the whole request.
//! Loading through `load_pdf_from_reader(&File)` means pdfium reads the same
//! descriptor the accessor validated, and the document can never outlive it.
//!
//! ## Why render to a scratch bitmap and composite?
//!
//! `pdfium-render` allocates its own `FPDF_BITMAP` per render call. The
//! adapter renders at the transform's target size with an opaque-white clear
//! colour and copies the result onto the caller's surface, so the surface
//! stays the single buffer the pipeline owns.

use super::{EngineDocument, EngineError, EnginePage, PdfEngine, RenderMode};
use crate::error::RenderError;
use crate::pipeline::surface::{PageSize, PageTransform, RasterSurface};
use pdfium_render::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Production [`PdfEngine`] backed by a bound pdfium library.
pub struct PdfiumEngine {
    pdfium: Pdfium,
}

impl PdfiumEngine {
    pub fn new(pdfium: Pdfium) -> Self {
        Self { pdfium }
    }

    /// Locate and bind pdfium (see [`pdfium_locate::bind_pdfium`]).
    pub fn bind() -> Result<Self, RenderError> {
        let pdfium = pdfium_locate::bind_pdfium()
            .map_err(|e| RenderError::Unexpected(format!("Failed to bind pdfium: {e}")))?;
        info!("pdfium engine bound");
        Ok(Self::new(pdfium))
    }

    /// Bind pdfium from an explicit library path.
    pub fn bind_from_path(path: &Path) -> Result<Self, RenderError> {
        let pdfium = pdfium_locate::bind_pdfium_from_path(path)
            .map_err(|e| RenderError::Unexpected(format!("Failed to bind pdfium: {e}")))?;
        info!("pdfium engine bound from {}", path.display());
        Ok(Self::new(pdfium))
    }
}

impl PdfEngine for PdfiumEngine {
    fn name(&self) -> &str {
        "pdfium"
    }

    fn open_document<'a>(
        &'a self,
        file: &'a File,
    ) -> Result<Box<dyn EngineDocument + 'a>, EngineError> {
        let document = self
            .pdfium
            .load_pdf_from_reader(file, None)
            .map_err(classify_load_error)?;
        Ok(Box::new(PdfiumDocument { document }))
    }
}

fn classify_load_error(e: PdfiumError) -> EngineError {
    let detail = format!("{:?}", e);
    if detail.contains("Password") || detail.contains("password") {
        EngineError::PasswordRequired
    } else {
        EngineError::Rejected(detail)
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl<'a> EngineDocument for PdfiumDocument<'a> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn open_page<'p>(&'p self, index: usize) -> Result<Box<dyn EnginePage + 'p>, EngineError> {
        let page_index = index
            .try_into()
            .map_err(|_| EngineError::Page(format!("index {index} exceeds pdfium's page range")))?;
        let page = self
            .document
            .pages()
            .get(page_index)
            .map_err(|e| EngineError::Page(format!("{:?}", e)))?;
        Ok(Box::new(PdfiumPage { page }))
    }
}

struct PdfiumPage<'a> {
    page: PdfPage<'a>,
}

impl<'a> EnginePage for PdfiumPage<'a> {
    fn size(&self) -> PageSize {
        PageSize::new(self.page.width().value, self.page.height().value)
    }

    fn render(
        &self,
        surface: &mut RasterSurface,
        transform: &PageTransform,
        mode: RenderMode,
    ) -> Result<(), EngineError> {
        let size = self.size();
        let (sx, sy) = transform.scale_factors();
        let target_width = (size.width * sx) as i32;
        let target_height = (size.height * sy) as i32;

        let render_config = PdfRenderConfig::new()
            .set_target_size(target_width, target_height)
            .rotate_if_landscape(PdfPageRenderRotation::None, false)
            .set_clear_color(PdfColor::WHITE)
            .render_form_data(true)
            .use_print_quality(mode == RenderMode::Print);

        let bitmap = self
            .page
            .render_with_config(&render_config)
            .map_err(|e| EngineError::Render(format!("{:?}", e)))?;

        let rendered = bitmap.as_image().into_rgba8();
        debug!(
            "pdfium rendered {}x{} px onto {}x{} surface",
            rendered.width(),
            rendered.height(),
            surface.width(),
            surface.height()
        );

        let (dx, dy) = transform.apply(0.0, 0.0);
        image::imageops::overlay(surface.image_mut(), &rendered, dx as i64, dy as i64);
        Ok(())
    }
}

//! Orchestrating operations: page conversion, page count, access probe and
//! the plain diagnostic surface.
//!
//! These are synchronous and CPU-bound. [`crate::service::Pdf2BitmapService`]
//! wraps them in `spawn_blocking` for async callers.
//!
//! ## Resource release
//!
//! Every native resource is a value with a scope:
//!
//! ```text
//! source file ─┐
//!   session ───┤  released here, innermost first, before encoding starts
//!     page ────┘
//! surface ──────── released after encoding
//! ```
//!
//! A `?` anywhere returns through the same scope exits, so a failed request
//! releases exactly what it acquired, in the same order as a successful one.

use crate::config::ServiceConfig;
use crate::engine::PdfEngine;
use crate::error::RenderError;
use crate::output::{AccessReport, PlainSurface, RenderResult};
use crate::pipeline::surface::{PixelDimensions, RasterSurface, SurfacePlan};
use crate::pipeline::{encode, input, render, session::RenderSession, sink};
use crate::request::{ConvertRequest, PlainSurfaceRequest};
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Progress of one conversion. `Done` and a returned error are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Validated,
    SessionOpen,
    PageOpen,
    SurfaceBuilt,
    Rendered,
    Encoded,
    Persisted,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Convert one page of a PDF to a PNG file.
///
/// # Errors
/// Any of the classified [`RenderError`] kinds; see the variant docs. On
/// error no output file exists at the target path (or the previous file is
/// untouched) and every handle opened for the request has been released.
pub fn convert_page(
    engine: &dyn PdfEngine,
    config: &ServiceConfig,
    request: &ConvertRequest,
) -> Result<RenderResult, RenderError> {
    let start = Instant::now();
    info!(
        "Converting PDF: {}, page: {}, dpi: {}, scale: {}",
        request.file_path.display(),
        request.page_index,
        request.dpi,
        request.scale_factor
    );

    let mut stage = Stage::Idle;
    let result = run_conversion(engine, config, request, &mut stage);

    match &result {
        Ok(r) => info!(
            "Converted page {} → {} ({}x{}) in {}ms",
            r.page_index,
            r.output_path.display(),
            r.width,
            r.height,
            start.elapsed().as_millis()
        ),
        Err(e) => warn!(
            "Conversion of {} failed after stage {} [{}]: {}",
            request.file_path.display(),
            stage,
            e.kind(),
            e
        ),
    }
    result
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!("stage {} → {}", stage, next);
    *stage = next;
}

fn run_conversion(
    engine: &dyn PdfEngine,
    config: &ServiceConfig,
    request: &ConvertRequest,
    stage: &mut Stage,
) -> Result<RenderResult, RenderError> {
    request.validate()?;
    let source = input::open_source(&request.file_path)?;
    advance(stage, Stage::Validated);

    let (surface, page_index, page_count) = {
        let mut session = RenderSession::open(engine, &source, &request.file_path)?;
        session.require_pages()?;
        let page_count = session.page_count();
        advance(stage, Stage::SessionOpen);

        let page = session.open_page(request.page_index)?;
        advance(stage, Stage::PageOpen);

        let plan = SurfacePlan::for_page(page.size(), request.scale_factor);
        let mut surface = RasterSurface::allocate(plan.dimensions, config.max_surface_pixels)?;
        advance(stage, Stage::SurfaceBuilt);

        render::rasterize(&page, &mut surface, &plan.transform, config.render_mode)?;
        advance(stage, Stage::Rendered);

        let page_index = page.index();
        (surface, page_index, page_count)
        // page, then session, dropped here
    };
    drop(source);

    let png = encode::encode_png(&surface)?;
    let PixelDimensions { width, height } = surface.dimensions();
    drop(surface);
    advance(stage, Stage::Encoded);

    let target = sink::resolve_output_path(
        request.output_path.as_deref(),
        &config.cache_dir,
        page_index,
    );
    sink::persist(&png, &target)?;
    advance(stage, Stage::Persisted);

    advance(stage, Stage::Done);
    Ok(RenderResult {
        output_path: target,
        original_path: request.file_path.clone(),
        width,
        height,
        page_count,
        page_index,
        dpi: request.dpi,
    })
}

/// Number of pages in the document at `path`.
///
/// # Errors
/// `FileNotFound`, `PermissionDenied` or `CorruptDocument`.
pub fn page_count(engine: &dyn PdfEngine, path: &Path) -> Result<usize, RenderError> {
    info!("Getting page count for: {}", path.display());
    let source = input::open_source(path)?;
    let session = RenderSession::open(engine, &source, path)?;
    let count = session.page_count();
    Ok(count)
}

/// Probe how far the document at `path` gets: existence, readability, open
/// handle, open renderer, page count.
///
/// Never fails. Each failed step is recorded on the report and stops the
/// steps that depend on it.
pub fn test_access(engine: &dyn PdfEngine, path: &Path) -> AccessReport {
    let probe = input::probe(path);
    let mut report = AccessReport {
        file_exists: probe.exists,
        ..Default::default()
    };
    if !probe.exists {
        return report;
    }
    report.file_size = probe.size;
    report.can_read = probe.readable;
    report.pdf_header = probe.pdf_header;

    let handle = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            report.can_open_handle = Some(false);
            report.handle_error = Some(e.to_string());
            return report;
        }
    };
    report.can_open_handle = Some(true);

    match RenderSession::open(engine, &handle, path) {
        Ok(session) => {
            report.can_open_renderer = Some(true);
            report.page_count = Some(session.page_count());
        }
        Err(e) => {
            report.can_open_renderer = Some(false);
            report.renderer_error = Some(e.to_string());
        }
    }

    debug!("Access report for {}: {:?}", path.display(), report);
    report
}

/// Render a plain opaque-white surface and return it as inline base64 PNG.
/// No PDF is involved; this isolates the surface and encoder from the engine.
pub fn render_plain_surface(
    config: &ServiceConfig,
    request: PlainSurfaceRequest,
) -> Result<PlainSurface, RenderError> {
    request.validate()?;
    let dims = PixelDimensions {
        width: request.width,
        height: request.height,
    };
    let surface = RasterSurface::allocate(dims, config.max_surface_pixels)?;
    let png = encode::encode_png(&surface)?;

    Ok(PlainSurface {
        base64_image: encode::to_base64(&png),
        width: request.width,
        height: request.height,
    })
}

//! Rasterisation: draw an open page into a prepared surface.
//!
//! This is the only place the pipeline asks the engine to draw. Everything
//! the engine needs (surface, transform, mode) has been decided upstream;
//! this stage invokes the engine exactly once and classifies the outcome.

use crate::engine::RenderMode;
use crate::error::RenderError;
use crate::pipeline::session::PageHandle;
use crate::pipeline::surface::{PageTransform, RasterSurface};
use std::time::Instant;
use tracing::debug;

/// Render `page` into `surface` through `transform`.
///
/// # Errors
/// [`RenderError::RenderFailure`] when the engine reports an error, or when
/// it changed the surface's dimensions.
pub fn rasterize(
    page: &PageHandle<'_>,
    surface: &mut RasterSurface,
    transform: &PageTransform,
    mode: RenderMode,
) -> Result<(), RenderError> {
    let start = Instant::now();
    let before = surface.dimensions();

    page.engine_page()
        .render(surface, transform, mode)
        .map_err(|e| RenderError::RenderFailure {
            index: page.index(),
            detail: e.to_string(),
        })?;

    if surface.dimensions() != before {
        return Err(RenderError::RenderFailure {
            index: page.index(),
            detail: format!(
                "engine resized the surface from {}x{} to {}x{}",
                before.width,
                before.height,
                surface.width(),
                surface.height()
            ),
        });
    }

    debug!(
        "Rendered page {} → {}x{} px in {}ms ({:?})",
        page.index(),
        surface.width(),
        surface.height(),
        start.elapsed().as_millis(),
        mode
    );
    Ok(())
}

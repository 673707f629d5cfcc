//! Image encoding: `RasterSurface` → PNG bytes, optionally base64-wrapped.
//!
//! PNG is lossless, so text edges survive unchanged. Compression is set to
//! `Best` with adaptive filtering: output size matters more than encode time
//! for single-page conversions, and pixel data is identical at every level.

use crate::error::RenderError;
use crate::pipeline::surface::RasterSurface;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use tracing::debug;

/// Encode the surface as an RGBA8 PNG.
pub fn encode_png(surface: &RasterSurface) -> Result<Vec<u8>, RenderError> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
    encoder
        .write_image(
            surface.image().as_raw(),
            surface.width(),
            surface.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(RenderError::EncodeFailure)?;

    debug!(
        "Encoded {}x{} surface → {} bytes PNG",
        surface.width(),
        surface.height(),
        buf.len()
    );
    Ok(buf)
}

/// Standard-alphabet base64 without line breaks.
pub fn to_base64(png: &[u8]) -> String {
    STANDARD.encode(png)
}

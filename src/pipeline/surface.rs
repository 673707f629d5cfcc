//! Page surface construction: pixel dimensions, page→surface transform, and
//! the white-filled RGBA8 buffer pages are drawn into.
//!
//! ## Truncation, not rounding
//!
//! Pixel dimensions are `(points × scale) as u32`, i.e. truncated toward
//! zero. A 612 pt page at scale 1.5 becomes 918 px; at scale 0.333 it becomes
//! 203 px (203.796 truncated). Callers comparing against a rounded value will
//! see an off-by-one on non-integral products.

use crate::error::RenderError;
use image::{Rgba, RgbaImage};
use tracing::debug;

/// Intrinsic page size in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Integer pixel size of a raster surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelDimensions {
    pub width: u32,
    pub height: u32,
}

impl PixelDimensions {
    /// Pixel size of `page` at `scale`, truncated on both axes.
    pub fn for_page(page: PageSize, scale: f32) -> Self {
        Self {
            width: truncate_to_pixels(page.width * scale),
            height: truncate_to_pixels(page.height * scale),
        }
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

fn truncate_to_pixels(v: f32) -> u32 {
    // `as` saturates: NaN → 0, negatives → 0, overflow → u32::MAX.
    v as u32
}

/// Affine transform from page space to surface space.
///
/// Stored as the six coefficients of
/// `[a c e]`
/// `[b d f]`
/// so that `x' = a·x + c·y + e` and `y' = b·x + d·y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageTransform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl PageTransform {
    pub const IDENTITY: PageTransform = PageTransform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Uniform scale, no rotation, no translation: the page origin maps to
    /// the surface origin.
    pub fn scale(factor: f32) -> Self {
        Self {
            a: factor,
            d: factor,
            ..Self::IDENTITY
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Horizontal and vertical scale factors, assuming no rotation or skew.
    pub fn scale_factors(&self) -> (f32, f32) {
        (self.a, self.d)
    }
}

/// Dimensions and transform computed for one page before allocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePlan {
    pub page_size: PageSize,
    pub dimensions: PixelDimensions,
    pub transform: PageTransform,
}

impl SurfacePlan {
    pub fn for_page(page_size: PageSize, scale: f32) -> Self {
        let plan = Self {
            page_size,
            dimensions: PixelDimensions::for_page(page_size, scale),
            transform: PageTransform::scale(scale),
        };
        debug!(
            "Surface plan: {}x{} pt × {} → {}x{} px",
            page_size.width,
            page_size.height,
            scale,
            plan.dimensions.width,
            plan.dimensions.height
        );
        plan
    }
}

/// Opaque white.
pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// An RGBA8 pixel buffer, exclusively owned by one rendering operation.
///
/// Every pixel is opaque white at allocation, so pages with transparent
/// regions come out on a deterministic background.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    /// Allocate a white surface of `dims`.
    ///
    /// Fails with [`RenderError::InvalidDimensions`] when either side is zero,
    /// when `width × height` exceeds `max_pixels`, or when the buffer cannot
    /// be reserved.
    pub fn allocate(dims: PixelDimensions, max_pixels: u64) -> Result<Self, RenderError> {
        let invalid = |reason: String| RenderError::InvalidDimensions {
            width: dims.width,
            height: dims.height,
            reason,
        };

        if dims.width == 0 || dims.height == 0 {
            return Err(invalid("surface must be at least 1x1 pixels".into()));
        }
        if dims.pixel_count() > max_pixels {
            return Err(invalid(format!(
                "{} pixels exceeds the limit of {max_pixels}",
                dims.pixel_count()
            )));
        }

        let len = (dims.width as usize)
            .checked_mul(dims.height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| invalid("buffer size overflows usize".into()))?;

        let mut buf: Vec<u8> = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|e| invalid(format!("cannot allocate {len} bytes: {e}")))?;
        // 0xFF in every channel is opaque white.
        buf.resize(len, 0xFF);

        let image = RgbaImage::from_raw(dims.width, dims.height, buf)
            .ok_or_else(|| invalid("buffer does not match dimensions".into()))?;

        debug!("Allocated {}x{} surface", dims.width, dims.height);
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> PixelDimensions {
        PixelDimensions {
            width: self.width(),
            height: self.height(),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Mutable pixel access for the engine drawing into this surface.
    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };

    #[test]
    fn dimensions_truncate_instead_of_rounding() {
        let d = PixelDimensions::for_page(PageSize::new(100.0, 100.0), 1.999);
        // 199.9 truncated
        assert_eq!(d, PixelDimensions { width: 199, height: 199 });

        let d = PixelDimensions::for_page(LETTER, 2.0);
        assert_eq!(d, PixelDimensions { width: 1224, height: 1584 });
    }

    #[test]
    fn dimensions_match_floor_for_many_scales() {
        for scale in [0.1_f32, 0.5, 0.75, 1.0, 1.25, 1.333, 2.0, 3.7, 4.16] {
            let d = PixelDimensions::for_page(LETTER, scale);
            assert_eq!(d.width, (LETTER.width * scale).floor() as u32, "scale {scale}");
            assert_eq!(d.height, (LETTER.height * scale).floor() as u32, "scale {scale}");
        }
    }

    #[test]
    fn transform_is_pure_scale() {
        let t = PageTransform::scale(2.5);
        assert_eq!(t.apply(0.0, 0.0), (0.0, 0.0));
        assert_eq!(t.apply(10.0, 4.0), (25.0, 10.0));
        assert_eq!((t.b, t.c, t.e, t.f), (0.0, 0.0, 0.0, 0.0));
        assert_eq!(t.scale_factors(), (2.5, 2.5));
    }

    #[test]
    fn plan_pairs_dimensions_with_transform() {
        let plan = SurfacePlan::for_page(LETTER, 0.5);
        assert_eq!(plan.dimensions, PixelDimensions { width: 306, height: 396 });
        assert_eq!(plan.transform, PageTransform::scale(0.5));
    }

    #[test]
    fn allocated_surface_is_opaque_white() {
        let s = RasterSurface::allocate(PixelDimensions { width: 7, height: 3 }, u64::MAX).unwrap();
        assert_eq!((s.width(), s.height()), (7, 3));
        assert!(s.image().pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn zero_sized_surface_is_rejected() {
        let zero = PixelDimensions::for_page(PageSize::new(0.0, 792.0), 2.0);
        let err = RasterSurface::allocate(zero, u64::MAX).unwrap_err();
        assert!(matches!(err, RenderError::InvalidDimensions { width: 0, .. }), "{err}");
    }

    #[test]
    fn pixel_cap_is_enforced() {
        let dims = PixelDimensions { width: 1000, height: 1000 };
        let err = RasterSurface::allocate(dims, 999_999).unwrap_err();
        assert!(err.to_string().contains("exceeds the limit"), "{err}");
        assert!(RasterSurface::allocate(dims, 1_000_000).is_ok());
    }

    #[test]
    fn nan_scale_yields_zero_dimensions() {
        let d = PixelDimensions::for_page(LETTER, f32::NAN);
        assert_eq!(d, PixelDimensions { width: 0, height: 0 });
    }
}

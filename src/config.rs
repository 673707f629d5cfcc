//! Service configuration.
//!
//! Per-request knobs (page, scale, output path) live in
//! [`crate::request`]; this module holds what is fixed for the lifetime of a
//! [`crate::service::Pdf2BitmapService`]: where synthesized output files go,
//! how large a surface may get, and the engine render mode.
//!
//! Built via [`ServiceConfig::builder()`] or [`ServiceConfig::default()`].

use crate::engine::RenderMode;
use crate::error::RenderError;
use std::path::PathBuf;

/// Default cap on `width × height` of a raster surface (≈ 400 MB of RGBA).
pub const DEFAULT_MAX_SURFACE_PIXELS: u64 = 100_000_000;

/// Configuration for a [`crate::service::Pdf2BitmapService`].
///
/// # Example
/// ```rust
/// use pdf2bitmap::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .cache_dir("/tmp/pdf2bitmap")
///     .max_surface_pixels(50_000_000)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_surface_pixels, 50_000_000);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Directory for output files when the request names none.
    ///
    /// Default: `$PDF2BITMAP_CACHE_DIR`, else the platform cache directory
    /// joined with `pdf2bitmap`, else `<temp>/pdf2bitmap`.
    pub cache_dir: PathBuf,

    /// Largest surface, in pixels, that a conversion may allocate. Default: 100 M.
    ///
    /// A 14 400 pt poster at scale 4 would otherwise ask for several
    /// gigabytes. Requests above the cap fail with `InvalidDimensions`.
    pub max_surface_pixels: u64,

    /// Engine render mode. Default: [`RenderMode::Display`].
    pub render_mode: RenderMode,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            max_surface_pixels: DEFAULT_MAX_SURFACE_PIXELS,
            render_mode: RenderMode::default(),
        }
    }
}

/// Resolve the default output directory.
pub fn default_cache_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PDF2BITMAP_CACHE_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("pdf2bitmap")
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_dir = dir.into();
        self
    }

    pub fn max_surface_pixels(mut self, px: u64) -> Self {
        self.config.max_surface_pixels = px;
        self
    }

    pub fn render_mode(mut self, mode: RenderMode) -> Self {
        self.config.render_mode = mode;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, RenderError> {
        let c = &self.config;
        if c.max_surface_pixels == 0 {
            return Err(RenderError::invalid_argument(
                "max_surface_pixels must be ≥ 1",
            ));
        }
        if c.cache_dir.as_os_str().is_empty() {
            return Err(RenderError::invalid_argument("cache_dir cannot be empty"));
        }
        Ok(self.config)
    }
}

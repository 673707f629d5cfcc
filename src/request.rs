//! Request types and their defaulting rules.
//!
//! Each operation has two shapes:
//!
//! * an `*Args` struct mirroring the loosely typed argument mapping a
//!   transport hands over (every field optional, camelCase keys, legacy
//!   aliases accepted), and
//! * a validated request struct the pipeline consumes.
//!
//! `Args::into_request` is the only place defaults are applied and inputs
//! are checked, so nothing downstream sees a missing path or a bad scale.

use crate::error::RenderError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PAGE_INDEX: i64 = 0;
pub const DEFAULT_DPI: u32 = 300;
pub const DEFAULT_SCALE_FACTOR: f32 = 2.0;
pub const DEFAULT_PLAIN_SIZE: u32 = 300;

fn require_path(file_path: Option<String>) -> Result<PathBuf, RenderError> {
    match file_path {
        Some(p) if !p.is_empty() => Ok(PathBuf::from(p)),
        _ => Err(RenderError::invalid_argument("File path cannot be null")),
    }
}

// ── convertPage ──────────────────────────────────────────────────────────

/// Arguments of `convertPage` as received from a caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertArgs {
    pub file_path: Option<String>,
    #[serde(alias = "pageNumber")]
    pub page_index: Option<i64>,
    pub dpi: Option<u32>,
    pub scale_factor: Option<f64>,
    #[serde(alias = "savePath")]
    pub output_path: Option<String>,
}

impl ConvertArgs {
    pub fn into_request(self) -> Result<ConvertRequest, RenderError> {
        let mut req = ConvertRequest::new(require_path(self.file_path)?);
        if let Some(i) = self.page_index {
            req.page_index = i;
        }
        if let Some(dpi) = self.dpi {
            req.dpi = dpi;
        }
        if let Some(s) = self.scale_factor {
            req.scale_factor = s as f32;
        }
        req.output_path = self.output_path.filter(|p| !p.is_empty()).map(PathBuf::from);
        req.validate()?;
        Ok(req)
    }
}

/// A validated page-conversion request.
///
/// # Example
/// ```rust
/// use pdf2bitmap::ConvertRequest;
///
/// let req = ConvertRequest::new("doc.pdf")
///     .page_index(2)
///     .scale_factor(1.5)
///     .output_path("out/page3.png");
/// assert!(req.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    pub file_path: PathBuf,
    /// 0-based. Negative values are accepted here and rejected against the
    /// page count with `PageIndexOutOfRange`.
    pub page_index: i64,
    /// Advisory only; reported back, never used for sizing.
    pub dpi: u32,
    pub scale_factor: f32,
    pub output_path: Option<PathBuf>,
}

impl ConvertRequest {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            page_index: DEFAULT_PAGE_INDEX,
            dpi: DEFAULT_DPI,
            scale_factor: DEFAULT_SCALE_FACTOR,
            output_path: None,
        }
    }

    pub fn page_index(mut self, index: i64) -> Self {
        self.page_index = index;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn scale_factor(mut self, scale: f32) -> Self {
        self.scale_factor = scale;
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if self.file_path.as_os_str().is_empty() {
            return Err(RenderError::invalid_argument("File path cannot be null"));
        }
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(RenderError::invalid_argument(format!(
                "Scale factor must be a positive number, got {}",
                self.scale_factor
            )));
        }
        Ok(())
    }
}

// ── testAccess / getPageCount ────────────────────────────────────────────

/// Arguments of `testAccess` and `getPageCount`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathArgs {
    pub file_path: Option<String>,
}

impl PathArgs {
    pub fn into_path(self) -> Result<PathBuf, RenderError> {
        require_path(self.file_path)
    }
}

impl From<&Path> for PathArgs {
    fn from(p: &Path) -> Self {
        Self {
            file_path: Some(p.to_string_lossy().into_owned()),
        }
    }
}

// ── renderPlainSurface ───────────────────────────────────────────────────

/// Arguments of `renderPlainSurface`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlainSurfaceArgs {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl PlainSurfaceArgs {
    pub fn into_request(self) -> Result<PlainSurfaceRequest, RenderError> {
        let req = PlainSurfaceRequest {
            width: self.width.unwrap_or(DEFAULT_PLAIN_SIZE),
            height: self.height.unwrap_or(DEFAULT_PLAIN_SIZE),
        };
        req.validate()?;
        Ok(req)
    }
}

/// Size of a diagnostic plain white surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainSurfaceRequest {
    pub width: u32,
    pub height: u32,
}

impl Default for PlainSurfaceRequest {
    fn default() -> Self {
        Self {
            width: DEFAULT_PLAIN_SIZE,
            height: DEFAULT_PLAIN_SIZE,
        }
    }
}

impl PlainSurfaceRequest {
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::invalid_argument(format!(
                "Width and height must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

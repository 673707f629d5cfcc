//! Result types returned by the public operations.
//!
//! All serialise with camelCase keys so a transport can forward them as-is.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of a successful page conversion. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResult {
    /// Where the PNG was written.
    pub output_path: PathBuf,
    /// The source PDF.
    pub original_path: PathBuf,
    /// Pixel width of the image.
    pub width: u32,
    /// Pixel height of the image.
    pub height: u32,
    /// Total pages in the source document.
    pub page_count: usize,
    /// 0-based index of the converted page.
    pub page_index: usize,
    /// DPI the caller asked for; metadata only.
    pub dpi: u32,
}

/// A plain white diagnostic surface, encoded inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainSurface {
    /// Standard base64 of the PNG bytes, no line breaks.
    pub base64_image: String,
    pub width: u32,
    pub height: u32,
}

/// Diagnostic report of `testAccess`.
///
/// Fields are filled in as each probing step runs; a step that was never
/// reached stays `None` and is omitted from the serialised mapping. A failed
/// step records `false` plus its error message instead of failing the call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessReport {
    pub file_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_read: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_header: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_open_handle: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_open_renderer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renderer_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
}

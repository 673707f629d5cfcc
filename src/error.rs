//! Error types for the pdf2bitmap library.
//!
//! Two shapes of the same information:
//!
//! * [`RenderError`] — the Rust error returned by every fallible operation.
//!   One variant per failure kind, each carrying the context a caller needs
//!   (path, requested page index, page count, underlying source).
//!
//! * [`ErrorPayload`] — the serialisable form handed to a transport layer:
//!   a stable [`ErrorKind`] tag, a human-readable message and an optional
//!   details string. Built from a `RenderError` via `From`.
//!
//! Callers that branch programmatically should match on
//! [`RenderError::kind`] rather than on message text.

use serde::{Deserialize, Serialize};
use std::error::Error as _;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2bitmap library.
#[derive(Debug, Error)]
pub enum RenderError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// A required argument is missing or a value is outside its domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No filesystem entry exists at the given path.
    #[error("PDF file not found at path: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The entry exists but the process may not read it.
    #[error("Cannot read file (permission denied): '{path}'")]
    PermissionDenied { path: PathBuf },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The file is readable but the decoder rejected it.
    #[error("PDF '{path}' could not be opened: {detail}")]
    CorruptDocument { path: PathBuf, detail: String },

    /// Requested page index is negative or past the last page.
    #[error("Invalid page index {index}, total pages: {page_count}")]
    PageIndexOutOfRange { index: i64, page_count: usize },

    /// Computed surface size is zero, overflows, or exceeds the pixel cap.
    #[error("Invalid surface dimensions {width}x{height}: {reason}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        reason: String,
    },

    /// The PDF engine reported an error while drawing the page.
    #[error("Rendering failed for page {index}: {detail}")]
    RenderFailure { index: usize, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// PNG encoding of the finished surface failed.
    #[error("PNG encoding failed: {0}")]
    EncodeFailure(#[source] image::ImageError),

    /// Could not create directories for, or write, the output image.
    #[error("Failed to write output file '{path}': {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Anything not classified above. Always carries the underlying cause.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl RenderError {
    /// Stable tag for programmatic branching.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            RenderError::FileNotFound { .. } => ErrorKind::FileNotFound,
            RenderError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            RenderError::CorruptDocument { .. } => ErrorKind::CorruptDocument,
            RenderError::PageIndexOutOfRange { .. } => ErrorKind::PageIndexOutOfRange,
            RenderError::InvalidDimensions { .. } => ErrorKind::InvalidDimensions,
            RenderError::RenderFailure { .. } => ErrorKind::RenderFailure,
            RenderError::EncodeFailure(_) => ErrorKind::EncodeFailure,
            RenderError::WriteFailure { .. } => ErrorKind::WriteFailure,
            RenderError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        RenderError::InvalidArgument(msg.into())
    }
}

/// Stable error kind tag.
///
/// Serialises as the variant name (`"FileNotFound"`, …). `NotImplemented` is
/// only produced by [`crate::dispatch`] for unknown method names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidArgument,
    FileNotFound,
    PermissionDenied,
    CorruptDocument,
    PageIndexOutOfRange,
    InvalidDimensions,
    RenderFailure,
    EncodeFailure,
    WriteFailure,
    Unexpected,
    NotImplemented,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::FileNotFound => "FileNotFound",
            ErrorKind::PermissionDenied => "PermissionDenied",
            ErrorKind::CorruptDocument => "CorruptDocument",
            ErrorKind::PageIndexOutOfRange => "PageIndexOutOfRange",
            ErrorKind::InvalidDimensions => "InvalidDimensions",
            ErrorKind::RenderFailure => "RenderFailure",
            ErrorKind::EncodeFailure => "EncodeFailure",
            ErrorKind::WriteFailure => "WriteFailure",
            ErrorKind::Unexpected => "Unexpected",
            ErrorKind::NotImplemented => "NotImplemented",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error shape returned to a transport layer instead of a success result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorPayload {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<&RenderError> for ErrorPayload {
    fn from(err: &RenderError) -> Self {
        let payload = ErrorPayload::new(err.kind(), err.to_string());

        let details = match err {
            RenderError::PageIndexOutOfRange { index, page_count } => {
                Some(format!("requestedIndex={index}, pageCount={page_count}"))
            }
            _ => {
                // Walk the source chain; the top-level message is already in `message`.
                let mut chain = Vec::new();
                let mut source = err.source();
                while let Some(s) = source {
                    chain.push(s.to_string());
                    source = s.source();
                }
                (!chain.is_empty()).then(|| chain.join("\ncaused by: "))
            }
        };

        match details {
            Some(d) => payload.with_details(d),
            None => payload,
        }
    }
}

impl From<RenderError> for ErrorPayload {
    fn from(err: RenderError) -> Self {
        ErrorPayload::from(&err)
    }
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

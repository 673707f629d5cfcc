//! # pdf2bitmap
//!
//! Rasterise a single page of a local PDF into an RGBA PNG bitmap, with
//! every native handle released on every exit path.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF path
//!  │
//!  ├─ 1. Input    validate the path, open one read handle
//!  ├─ 2. Session  decode the document through the engine, count pages
//!  ├─ 3. Page     range-check the index, open the page
//!  ├─ 4. Surface  size = ⌊points × scale⌋, opaque white fill
//!  ├─ 5. Render   one engine draw call, identity·scale transform
//!  ├─ 6. Encode   lossless PNG (or base64 for inline results)
//!  └─ 7. Sink     atomic write to the requested or synthesized path
//! ```
//!
//! The engine sits behind the [`PdfEngine`] trait; [`PdfiumEngine`] is the
//! production implementation over `pdfium-render`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2bitmap::{ConvertRequest, Pdf2BitmapService, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = Pdf2BitmapService::with_pdfium(ServiceConfig::default())?;
//!     let pages = service.page_count("document.pdf").await?;
//!     let result = service
//!         .convert_page(ConvertRequest::new("document.pdf").page_index(pages as i64 - 1))
//!         .await?;
//!     println!("{}", result.output_path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2bitmap` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2bitmap = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod request;
pub mod service;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use convert::{convert_page, page_count, render_plain_surface, test_access, Stage};
pub use dispatch::{dispatch, Method};
pub use engine::pdfium::PdfiumEngine;
pub use engine::{EngineDocument, EngineError, EnginePage, PdfEngine, RenderMode};
pub use error::{ErrorKind, ErrorPayload, RenderError};
pub use output::{AccessReport, PlainSurface, RenderResult};
pub use pipeline::surface::{PageSize, PageTransform, PixelDimensions, RasterSurface};
pub use request::{ConvertArgs, ConvertRequest, PathArgs, PlainSurfaceArgs, PlainSurfaceRequest};
pub use service::Pdf2BitmapService;

//! The service object a host constructs at startup and disposes at shutdown.
//!
//! It owns the engine and the configuration and nothing else: no session,
//! page or surface outlives a single call, so one service can serve any
//! number of concurrent requests without locking.
//!
//! ## Why spawn_blocking?
//!
//! Rendering is CPU-bound and pdfium calls block. The async methods move each
//! request onto Tokio's blocking pool so worker threads never stall. A panic
//! inside a request surfaces as [`RenderError::Unexpected`] rather than
//! unwinding into the caller.

use crate::config::ServiceConfig;
use crate::convert;
use crate::engine::pdfium::PdfiumEngine;
use crate::engine::PdfEngine;
use crate::error::RenderError;
use crate::output::{AccessReport, PlainSurface, RenderResult};
use crate::request::{ConvertRequest, PlainSurfaceRequest};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Page-rasterisation service.
///
/// # Example
/// ```rust,no_run
/// use pdf2bitmap::{ConvertRequest, Pdf2BitmapService, ServiceConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let service = Pdf2BitmapService::with_pdfium(ServiceConfig::default())?;
///     let result = service
///         .convert_page(ConvertRequest::new("document.pdf").scale_factor(1.5))
///         .await?;
///     println!("{} ({}x{})", result.output_path.display(), result.width, result.height);
///     service.shutdown();
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Pdf2BitmapService {
    engine: Arc<dyn PdfEngine>,
    config: Arc<ServiceConfig>,
}

impl std::fmt::Debug for Pdf2BitmapService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pdf2BitmapService")
            .field("engine", &self.engine.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Pdf2BitmapService {
    pub fn new(engine: Arc<dyn PdfEngine>, config: ServiceConfig) -> Self {
        info!(
            "pdf2bitmap service started (engine: {}, cache: {})",
            engine.name(),
            config.cache_dir.display()
        );
        Self {
            engine,
            config: Arc::new(config),
        }
    }

    /// Construct with a pdfium engine located by [`PdfiumEngine::bind`].
    pub fn with_pdfium(config: ServiceConfig) -> Result<Self, RenderError> {
        Ok(Self::new(Arc::new(PdfiumEngine::bind()?), config))
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn engine(&self) -> &dyn PdfEngine {
        self.engine.as_ref()
    }

    /// Release the service. Any in-flight requests keep their own clone of
    /// the engine until they finish.
    pub fn shutdown(self) {
        info!("pdf2bitmap service stopped (engine: {})", self.engine.name());
    }

    // ── Blocking entry points ────────────────────────────────────────────

    pub fn convert_page_blocking(&self, request: &ConvertRequest) -> Result<RenderResult, RenderError> {
        convert::convert_page(self.engine.as_ref(), &self.config, request)
    }

    pub fn page_count_blocking(&self, path: &Path) -> Result<usize, RenderError> {
        convert::page_count(self.engine.as_ref(), path)
    }

    pub fn test_access_blocking(&self, path: &Path) -> AccessReport {
        convert::test_access(self.engine.as_ref(), path)
    }

    pub fn render_plain_surface_blocking(
        &self,
        request: PlainSurfaceRequest,
    ) -> Result<PlainSurface, RenderError> {
        convert::render_plain_surface(&self.config, request)
    }

    // ── Async entry points ───────────────────────────────────────────────

    pub async fn convert_page(&self, request: ConvertRequest) -> Result<RenderResult, RenderError> {
        let this = self.clone();
        run_blocking("convertPage", move || this.convert_page_blocking(&request)).await?
    }

    pub async fn page_count(&self, path: impl Into<PathBuf>) -> Result<usize, RenderError> {
        let this = self.clone();
        let path = path.into();
        run_blocking("getPageCount", move || this.page_count_blocking(&path)).await?
    }

    pub async fn test_access(&self, path: impl Into<PathBuf>) -> Result<AccessReport, RenderError> {
        let this = self.clone();
        let path = path.into();
        run_blocking("testAccess", move || this.test_access_blocking(&path)).await
    }

    pub async fn render_plain_surface(
        &self,
        request: PlainSurfaceRequest,
    ) -> Result<PlainSurface, RenderError> {
        let this = self.clone();
        run_blocking("renderPlainSurface", move || {
            this.render_plain_surface_blocking(request)
        })
        .await?
    }
}

/// Run `f` on the blocking pool; a panic becomes `Unexpected`.
async fn run_blocking<T, F>(operation: &'static str, f: F) -> Result<T, RenderError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        let cause = if e.is_panic() {
            let panic = e.into_panic();
            panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string())
        } else {
            e.to_string()
        };
        RenderError::Unexpected(format!("{operation} task panicked: {cause}"))
    })
}

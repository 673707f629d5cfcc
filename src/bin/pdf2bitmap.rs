//! CLI binary for pdf2bitmap.
//!
//! A thin shim over the library crate: each subcommand maps its flags onto
//! one public operation and prints the result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdf2bitmap::pipeline::{encode, sink};
use pdf2bitmap::{
    dispatch, render_plain_surface, AccessReport, ConvertRequest, ErrorPayload,
    Pdf2BitmapService, PdfiumEngine, PixelDimensions, PlainSurfaceRequest, RasterSurface,
    RenderError, ServiceConfig,
};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Can this file be opened at all?
  pdf2bitmap access document.pdf

  # How many pages?
  pdf2bitmap count document.pdf

  # First page at 2x, written to the cache directory
  pdf2bitmap convert document.pdf

  # Third page at 1.5x to a chosen file
  pdf2bitmap convert document.pdf --page 2 --scale 1.5 -o page3.png

  # Plain white 300x300 surface (no PDF engine involved)
  pdf2bitmap plain -o blank.png

  # Call a method the way a host transport would
  pdf2bitmap call convertPage --args '{"filePath":"document.pdf","pageIndex":1}'

ENVIRONMENT VARIABLES:
  PDF2BITMAP_CACHE_DIR    Directory for synthesized output files
  PDFIUM_LIB_PATH         Path to libpdfium (file or containing directory)
  PDFIUM_CACHE_DIR        Extra directory searched for libpdfium
  RUST_LOG                Overrides the log filter (e.g. pdf2bitmap=debug)
"#;

/// Rasterise single PDF pages to PNG bitmaps.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2bitmap",
    version,
    about = "Rasterise single PDF pages to PNG bitmaps",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print results (and errors) as JSON on stdout.
    #[arg(long, global = true, env = "PDF2BITMAP_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDF2BITMAP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDF2BITMAP_QUIET")]
    quiet: bool,

    /// Directory for output files when no explicit path is given.
    #[arg(long, global = true, env = "PDF2BITMAP_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Explicit path to the pdfium shared library.
    #[arg(long, global = true, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report how far the file gets: exists, readable, opens, page count.
    Access {
        file: PathBuf,
    },

    /// Render a plain white surface (diagnostic, no PDF involved).
    Plain {
        #[arg(long, default_value_t = 300)]
        width: u32,
        #[arg(long, default_value_t = 300)]
        height: u32,
        /// Write the PNG here instead of printing base64.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert one page to PNG.
    Convert {
        file: PathBuf,
        /// 0-based page index.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        page: i64,
        /// Reported back in the result; does not affect size.
        #[arg(long, default_value_t = 300)]
        dpi: u32,
        /// Pixels per PDF point.
        #[arg(long, default_value_t = 2.0)]
        scale: f32,
        /// Output file. Default: <cache-dir>/page_<index>_<millis>.png
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the number of pages.
    Count {
        file: PathBuf,
    },

    /// Invoke a named method with a JSON argument mapping.
    Call {
        /// testAccess, renderPlainSurface, convertPage, getPageCount, getPlatformVersion
        method: String,
        /// Argument mapping as a JSON object.
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner provides the feedback that matters during a conversion,
    // so INFO-level library logs are suppressed while it is shown.
    let show_progress = !cli.quiet && !cli.json && matches!(cli.command, Command::Convert { .. });
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let mut builder = ServiceConfig::builder();
    if let Some(ref dir) = cli.cache_dir {
        builder = builder.cache_dir(dir);
    }
    let config = builder.build().map_err(|e| fail(cli.json, e))?;

    if let Command::Plain {
        width,
        height,
        output,
    } = &cli.command
    {
        let request = PlainSurfaceRequest {
            width: *width,
            height: *height,
        };

        if let Some(path) = output {
            write_plain_surface(&config, request, path).map_err(|e| fail(cli.json, e))?;
            if cli.json {
                print_json(&serde_json::json!({
                    "outputPath": path,
                    "width": request.width,
                    "height": request.height,
                }))?;
            } else if !cli.quiet {
                eprintln!(
                    "{} {}x{} → {}",
                    green("✔"),
                    request.width,
                    request.height,
                    bold(&path.display().to_string())
                );
            }
        } else {
            let surface =
                render_plain_surface(&config, request).map_err(|e| fail(cli.json, e))?;
            if cli.json {
                print_json(&surface)?;
            } else {
                println!("{}", surface.base64_image);
            }
        }
        return Ok(());
    }

    // ── Every remaining command needs the PDF engine ─────────────────────
    let engine = match cli.pdfium_lib {
        Some(ref path) => PdfiumEngine::bind_from_path(path),
        None => PdfiumEngine::bind(),
    }
    .map_err(|e| fail(cli.json, e))?;
    let service = Pdf2BitmapService::new(Arc::new(engine), config);

    let outcome = run(&cli, &service, show_progress).await;
    service.shutdown();
    outcome
}

async fn run(cli: &Cli, service: &Pdf2BitmapService, show_progress: bool) -> Result<()> {
    match &cli.command {
        Command::Access { file } => {
            let report = service
                .test_access(file.clone())
                .await
                .map_err(|e| fail(cli.json, e))?;
            if cli.json {
                print_json(&report)?;
            } else {
                print_access_report(file, &report);
            }
        }

        Command::Count { file } => {
            let count = service
                .page_count(file.clone())
                .await
                .map_err(|e| fail(cli.json, e))?;
            if cli.json {
                print_json(&serde_json::json!({ "pageCount": count }))?;
            } else {
                println!("{count}");
            }
        }

        Command::Convert {
            file,
            page,
            dpi,
            scale,
            output,
        } => {
            let mut request = ConvertRequest::new(file)
                .page_index(*page)
                .dpi(*dpi)
                .scale_factor(*scale);
            if let Some(path) = output {
                request = request.output_path(path);
            }

            let spinner = show_progress.then(|| spinner(file, *page));
            let start = Instant::now();
            let result = service.convert_page(request).await;
            if let Some(ref bar) = spinner {
                bar.finish_and_clear();
            }
            let result = result.map_err(|e| fail(cli.json, e))?;

            if cli.json {
                print_json(&result)?;
            } else {
                println!("{}", result.output_path.display());
                if !cli.quiet {
                    eprintln!(
                        "{} page {}/{}  {}x{}  {}",
                        green("✔"),
                        result.page_index + 1,
                        result.page_count,
                        result.width,
                        result.height,
                        dim(&format!("{}ms", start.elapsed().as_millis())),
                    );
                }
            }
        }

        Command::Call { method, args } => {
            let args: serde_json::Value = serde_json::from_str(args)
                .with_context(|| format!("--args is not valid JSON: {args}"))?;
            let value = dispatch(service, method, args)
                .await
                .map_err(|p| fail(true, p))?;
            print_json(&value)?;
        }

        // Handled before the engine is bound.
        Command::Plain { .. } => {}
    }
    Ok(())
}

/// Write a plain white surface through the same encoder and atomic sink
/// that page conversion uses.
fn write_plain_surface(
    config: &ServiceConfig,
    request: PlainSurfaceRequest,
    path: &Path,
) -> Result<(), RenderError> {
    request.validate()?;
    let dims = PixelDimensions {
        width: request.width,
        height: request.height,
    };
    let surface = RasterSurface::allocate(dims, config.max_surface_pixels)?;
    let png = encode::encode_png(&surface)?;
    sink::persist(&png, path)
}

fn spinner(file: &Path, page: i64) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Rendering");
    bar.set_message(format!("{} page {}", file.display(), page));
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn print_access_report(file: &Path, report: &AccessReport) {
    let yes_no = |v: Option<bool>| match v {
        Some(true) => green("yes"),
        Some(false) => red("no"),
        None => dim("-"),
    };

    println!("File:            {}", file.display());
    println!("Exists:          {}", yes_no(Some(report.file_exists)));
    if let Some(size) = report.file_size {
        println!("Size:            {size} bytes");
    }
    println!("Readable:        {}", yes_no(report.can_read));
    println!("PDF header:      {}", yes_no(report.pdf_header));
    println!("Handle opens:    {}", yes_no(report.can_open_handle));
    if let Some(ref e) = report.handle_error {
        println!("  {}", red(e));
    }
    println!("Renderer opens:  {}", yes_no(report.can_open_renderer));
    if let Some(ref e) = report.renderer_error {
        println!("  {}", red(e));
    }
    if let Some(n) = report.page_count {
        println!("Pages:           {n}");
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialise output")?
    );
    Ok(())
}

/// Turn a library failure into the process error, printing the payload on
/// stdout first in JSON mode.
fn fail(json: bool, err: impl Into<ErrorPayload>) -> anyhow::Error {
    let payload: ErrorPayload = err.into();
    if json {
        if let Ok(s) = serde_json::to_string_pretty(&payload) {
            println!("{s}");
        }
    }
    match payload.details {
        Some(ref d) => anyhow::anyhow!("{payload}\n{d}"),
        None => anyhow::anyhow!("{payload}"),
    }
}

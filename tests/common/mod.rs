//! Scripted in-process engine for integration tests.
//!
//! Documents are small text files:
//!
//! ```text
//! %PDF-FAKE
//! page 612 792
//! page 300 200 fail      # render returns an error
//! page 300 200 broken    # open_page returns an error
//! page 300 200 resize    # render swaps the surface for a smaller one
//! encrypted              # open_document reports PasswordRequired
//! ```
//!
//! The engine counts live documents and pages so tests can assert that every
//! handle opened for a request has been released when the request returns.

#![allow(dead_code)]

use image::Rgba;
use pdf2bitmap::{
    EngineDocument, EngineError, EnginePage, PageSize, PageTransform, PdfEngine, RasterSurface,
    RenderMode,
};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageBehaviour {
    Normal,
    Fail,
    Broken,
    Resize,
}

#[derive(Debug, Clone)]
struct FakePage {
    width: f32,
    height: f32,
    behaviour: PageBehaviour,
}

/// Live-handle counters shared between the engine and the test.
#[derive(Debug, Default)]
pub struct Counters {
    pub open_documents: AtomicUsize,
    pub open_pages: AtomicUsize,
    pub documents_opened: AtomicUsize,
    pub renders: AtomicUsize,
}

impl Counters {
    pub fn live_documents(&self) -> usize {
        self.open_documents.load(Ordering::SeqCst)
    }

    pub fn live_pages(&self) -> usize {
        self.open_pages.load(Ordering::SeqCst)
    }

    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn assert_released(&self) {
        assert_eq!(self.live_pages(), 0, "page handles leaked");
        assert_eq!(self.live_documents(), 0, "document handles leaked");
    }
}

#[derive(Debug, Default)]
pub struct ScriptedEngine {
    pub counters: Arc<Counters>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        init_tracing();
        Self::default()
    }
}

/// Route library logs through the test harness; `RUST_LOG=pdf2bitmap=debug`
/// shows stage transitions and handle releases for a failing test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

impl PdfEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    fn open_document<'a>(
        &'a self,
        file: &'a File,
    ) -> Result<Box<dyn EngineDocument + 'a>, EngineError> {
        let mut text = String::new();
        let mut reader: &File = file;
        reader.read_to_string(&mut text)?;

        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        if lines.next() != Some("%PDF-FAKE") {
            return Err(EngineError::Rejected("missing %PDF-FAKE header".into()));
        }

        let mut pages = Vec::new();
        for line in lines {
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                ["encrypted"] => return Err(EngineError::PasswordRequired),
                ["page", w, h, rest @ ..] => {
                    let parse = |s: &str| {
                        s.parse::<f32>()
                            .map_err(|e| EngineError::Rejected(format!("bad page size {s}: {e}")))
                    };
                    let behaviour = match rest.first() {
                        None => PageBehaviour::Normal,
                        Some(&"fail") => PageBehaviour::Fail,
                        Some(&"broken") => PageBehaviour::Broken,
                        Some(&"resize") => PageBehaviour::Resize,
                        Some(other) => {
                            return Err(EngineError::Rejected(format!("unknown flag {other}")))
                        }
                    };
                    pages.push(FakePage {
                        width: parse(w)?,
                        height: parse(h)?,
                        behaviour,
                    });
                }
                _ => return Err(EngineError::Rejected(format!("bad line: {line}"))),
            }
        }

        self.counters.open_documents.fetch_add(1, Ordering::SeqCst);
        self.counters.documents_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedDocument {
            pages,
            counters: Arc::clone(&self.counters),
        }))
    }
}

struct ScriptedDocument {
    pages: Vec<FakePage>,
    counters: Arc<Counters>,
}

impl Drop for ScriptedDocument {
    fn drop(&mut self) {
        self.counters.open_documents.fetch_sub(1, Ordering::SeqCst);
    }
}

impl EngineDocument for ScriptedDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn open_page<'p>(&'p self, index: usize) -> Result<Box<dyn EnginePage + 'p>, EngineError> {
        let page = self
            .pages
            .get(index)
            .ok_or_else(|| EngineError::Page(format!("no page {index}")))?;
        if page.behaviour == PageBehaviour::Broken {
            return Err(EngineError::Page(format!("page {index} object is damaged")));
        }
        self.counters.open_pages.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedPage {
            page,
            counters: &self.counters,
        }))
    }
}

struct ScriptedPage<'p> {
    page: &'p FakePage,
    counters: &'p Counters,
}

impl Drop for ScriptedPage<'_> {
    fn drop(&mut self) {
        self.counters.open_pages.fetch_sub(1, Ordering::SeqCst);
    }
}

impl EnginePage for ScriptedPage<'_> {
    fn size(&self) -> PageSize {
        PageSize::new(self.page.width, self.page.height)
    }

    /// Paints the top-left quarter of the page (in page space) with [`INK`].
    fn render(
        &self,
        surface: &mut RasterSurface,
        transform: &PageTransform,
        _mode: RenderMode,
    ) -> Result<(), EngineError> {
        self.counters.renders.fetch_add(1, Ordering::SeqCst);
        match self.page.behaviour {
            PageBehaviour::Fail => return Err(EngineError::Render("scripted failure".into())),
            PageBehaviour::Resize => {
                *surface.image_mut() = image::RgbaImage::new(1, 1);
                return Ok(());
            }
            _ => {}
        }

        let (x1, y1) = transform.apply(self.page.width / 2.0, self.page.height / 2.0);
        let (x1, y1) = (
            (x1 as u32).min(surface.width()),
            (y1 as u32).min(surface.height()),
        );
        let img = surface.image_mut();
        for y in 0..y1 {
            for x in 0..x1 {
                img.put_pixel(x, y, INK);
            }
        }
        Ok(())
    }
}

/// Write a scripted document into `dir` and return its path.
pub fn write_doc(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut body = String::from("%PDF-FAKE\n");
    for line in lines {
        body.push_str(line);
        body.push('\n');
    }
    std::fs::write(&path, body).expect("write scripted document");
    path
}

/// A three-page letter/A4/landscape document.
pub fn three_page_doc(dir: &Path) -> PathBuf {
    write_doc(
        dir,
        "three.pdf",
        &["page 612 792", "page 595 842", "page 792 612"],
    )
}

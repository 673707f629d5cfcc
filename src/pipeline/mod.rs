//! Pipeline stages for single-page rasterisation.
//!
//! Each submodule implements one step; [`crate::convert`] strings them
//! together and owns the scopes that release what each step acquires.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ session ──▶ surface ──▶ render ──▶ encode ──▶ sink
//! (File)    (doc/page)  (RGBA buf)  (engine)   (PNG)      (atomic write)
//! ```
//!
//! 1. [`input`]   — probe and open the source file, classify OS errors
//! 2. [`session`] — decode the document, range-check and open one page
//! 3. [`surface`] — compute pixel dimensions and allocate the white surface
//! 4. [`render`]  — one engine draw call onto the surface
//! 5. [`encode`]  — PNG-encode the surface, base64 for inline results
//! 6. [`sink`]    — resolve the output path and write it atomically

pub mod encode;
pub mod input;
pub mod render;
pub mod session;
pub mod sink;
pub mod surface;

//! # img2pptx
//!
//! Turn a batch of images and PDFs into a PowerPoint deck: one slide per
//! image or PDF page, each picture centred and letterboxed on a black 16:9
//! canvas.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload batch
//!  │
//!  ├─ 1. Input      dispatch by extension (image / pdf / ignored)
//!  ├─ 2. Render     PDF pages → rasters via pdfium (150 DPI)
//!  ├─ 3. Normalise  EXIF orientation, cap at 1920×1080, lossless PNG
//!  ├─ 4. Compose    one centred picture per slide
//!  └─ 5. Package    PresentationML zip → bytes
//! ```
//!
//! A file that cannot be decoded is skipped and reported in
//! [`DeckOutput::skipped`]; the request fails only when nothing at all could
//! be turned into a slide.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use img2pptx::{build_deck, DeckConfig, UploadedFile};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let files = vec![
//!         UploadedFile::new("cover.jpg", std::fs::read("cover.jpg")?),
//!         UploadedFile::new("handout.pdf", std::fs::read("handout.pdf")?),
//!     ];
//!     let output = build_deck(files, &DeckConfig::default())?;
//!     std::fs::write("presentation.pptx", &output.bytes)?;
//!     eprintln!("{} slides", output.stats.slide_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | The axum upload service in [`server`] |
//! | `cli`    | on      | The `img2pptx` binary (clap + anyhow + tracing-subscriber + indicatif); implies `server` |
//!
//! Disable both when using only the library:
//! ```toml
//! img2pptx = { version = "0.1", default-features = false }
//! ```
//!
//! ## PDF support
//!
//! PDF pages are rendered with pdfium, bound at runtime. Set
//! `PDFIUM_LIB_PATH` to the shared library (or its directory) if it is not
//! installed system-wide. Without pdfium, images still work and every PDF is
//! reported as [`FileError::PdfOpenFailed`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod pptx;
pub mod progress;
#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DeckConfig, DeckConfigBuilder, RgbColor, EMU_PER_INCH};
pub use convert::{build_deck, build_deck_from_paths, write_deck_to_file};
pub use error::{DeckError, FileError};
pub use output::{DeckOutput, DeckStats};
pub use pipeline::input::{FileKind, UploadedFile, SUPPORTED_EXTENSIONS};
pub use pipeline::normalize::NormalizedRaster;
pub use pptx::{Presentation, PPTX_MIME_TYPE};
pub use progress::{DeckProgressCallback, NoopProgressCallback, ProgressCallback};

//! Error types for the img2pptx library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`DeckError`] — **Fatal**: no deck can be produced for the request
//!   (nothing uploaded, nothing usable, serialisation broke). Returned as
//!   `Err(DeckError)` from the top-level `build_deck*` functions.
//!
//! * [`FileError`] — **Non-fatal**: a single file or PDF page could not be
//!   turned into a slide, but the rest of the batch is fine. Collected in
//!   [`crate::output::DeckOutput::skipped`] so callers can report partial
//!   success instead of losing the whole deck to one corrupt upload.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the img2pptx library.
///
/// File-level failures use [`FileError`] and are collected in
/// [`crate::output::DeckOutput`] rather than propagated here.
#[derive(Debug, Error)]
pub enum DeckError {
    // ── Request errors ────────────────────────────────────────────────────
    /// The batch was empty or every entry had an empty filename / body.
    #[error("No files selected")]
    NoFilesSelected,

    /// Files were received but none of them yielded a usable image.
    #[error("No valid images or PDF pages found or processed ({received} file(s) received)")]
    NothingProcessed { received: usize },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Writing the presentation package failed.
    #[error("Failed to serialise presentation: {0}")]
    SerializeFailed(String),

    /// Could not create or write the output `.pptx` file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeckError {
    /// `true` when the request itself was at fault (HTTP 4xx), `false` for
    /// failures on our side (HTTP 5xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DeckError::NoFilesSelected | DeckError::NothingProcessed { .. }
        )
    }
}

impl From<zip::result::ZipError> for DeckError {
    fn from(e: zip::result::ZipError) -> Self {
        DeckError::SerializeFailed(e.to_string())
    }
}

/// A non-fatal error for a single uploaded file or PDF page.
///
/// The batch continues unless every file fails.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// The image bytes could not be decoded.
    #[error("{file}: image decoding failed: {detail}")]
    DecodeFailed { file: String, detail: String },

    /// The normalised raster could not be PNG-encoded.
    #[error("{file}: PNG encoding failed: {detail}")]
    EncodeFailed { file: String, detail: String },

    /// The PDF could not be opened at all (corrupt, encrypted, no pdfium).
    #[error("{file}: PDF could not be opened: {detail}")]
    PdfOpenFailed { file: String, detail: String },

    /// One page of an otherwise readable PDF failed to rasterise.
    #[error("{file}: page {page} failed: {detail}")]
    PageFailed {
        file: String,
        page: usize,
        detail: String,
    },

    /// A local input file could not be read (CLI only).
    #[error("{file}: could not be read: {detail}")]
    ReadFailed { file: String, detail: String },

    /// The extension is not one of the supported types.
    #[error("{file}: unsupported file type")]
    Unsupported { file: String },
}

impl FileError {
    /// Name of the file this error belongs to.
    pub fn file(&self) -> &str {
        match self {
            FileError::DecodeFailed { file, .. }
            | FileError::EncodeFailed { file, .. }
            | FileError::PdfOpenFailed { file, .. }
            | FileError::PageFailed { file, .. }
            | FileError::ReadFailed { file, .. }
            | FileError::Unsupported { file } => file,
        }
    }
}

//! Ingestion: uploaded blobs and the extension-based dispatch table.
//!
//! The filename is only ever used to pick a decoder family. Images are then
//! decoded by content (magic bytes), so a PNG saved as `.jpg` still works,
//! while anything whose extension is not on the list is skipped unopened.

use crate::error::FileError;
use std::path::Path;
use tracing::debug;

/// Extensions accepted by the upload form, lower-case with the leading dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".tiff", ".tif", ".pdf",
];

/// One file of an upload batch, fully read into memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied filename, kept verbatim for logs and error messages.
    pub filename: String,
    /// Raw file contents.
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }

    /// Which pipeline branch this file goes down.
    pub fn kind(&self) -> FileKind {
        FileKind::from_filename(&self.filename)
    }

    /// An entry with no name and no bytes, as browsers send for an empty
    /// `<input type="file">`.
    pub fn is_blank(&self) -> bool {
        self.filename.trim().is_empty() && self.data.is_empty()
    }
}

/// Pipeline branch chosen from the filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// png / jpg / jpeg / gif / bmp / tiff / tif
    Image,
    /// pdf
    Pdf,
    /// Anything else; skipped.
    Unsupported,
}

impl FileKind {
    /// Classify a filename case-insensitively by its extension.
    pub fn from_filename(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            FileKind::Pdf
        } else if SUPPORTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            FileKind::Image
        } else {
            FileKind::Unsupported
        }
    }
}

/// Read local files into an upload batch, in the order given.
///
/// Unreadable paths do not abort the batch; they come back as
/// [`FileError::ReadFailed`] next to the files that were read.
pub fn read_local_files<P: AsRef<Path>>(paths: &[P]) -> (Vec<UploadedFile>, Vec<FileError>) {
    let mut files = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match std::fs::read(path) {
            Ok(data) => {
                debug!("Read {} ({} bytes)", path.display(), data.len());
                files.push(UploadedFile::new(name, data));
            }
            Err(e) => failures.push(FileError::ReadFailed {
                file: name,
                detail: e.to_string(),
            }),
        }
    }

    (files, failures)
}

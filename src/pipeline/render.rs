//! PDF rasterisation: every page of an uploaded PDF → one normalised raster.
//!
//! ## Blocking
//!
//! `pdfium-render` wraps the pdfium C++ library, which is not async-aware.
//! Everything in this module is synchronous; the server calls it from
//! `tokio::task::spawn_blocking` so Tokio worker threads never stall on a
//! long render.
//!
//! ## Resolution
//!
//! Pages are rendered at `DeckConfig::pdf_dpi` (default 150): the page size in
//! PDF points times `dpi / 72`. The normaliser then caps the result like any
//! other image, so an A0 poster ends up no larger than a phone photo.

use crate::config::DeckConfig;
use crate::error::{DeckError, FileError};
use crate::pipeline::normalize::{normalize_image, NormalizedRaster};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming a pdfium shared library (or its directory).
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to a pdfium library.
///
/// `PDFIUM_LIB_PATH` wins when set: it may point at the library file itself
/// or at the directory holding it. Otherwise the system library is used.
pub fn bind_pdfium() -> Result<Pdfium, DeckError> {
    let bindings = match std::env::var_os(PDFIUM_LIB_PATH_ENV) {
        Some(raw) => {
            let path = library_path(Path::new(&raw));
            debug!("Binding pdfium from {}", path.display());
            Pdfium::bind_to_library(&path)
                .map_err(|e| DeckError::PdfiumBindingFailed(format!("{}: {}", path.display(), e)))?
        }
        None => Pdfium::bind_to_system_library()
            .map_err(|e| DeckError::PdfiumBindingFailed(e.to_string()))?,
    };
    Ok(Pdfium::new(bindings))
}

/// Resolve a `PDFIUM_LIB_PATH` value to a library file.
fn library_path(raw: &Path) -> PathBuf {
    if raw.is_dir() {
        raw.join(Pdfium::pdfium_platform_library_name())
    } else {
        raw.to_path_buf()
    }
}

/// Rasterise every page of `bytes`, in page order, through the normaliser.
///
/// A page that fails is recorded in the returned failure list and the next
/// page is tried. A document that cannot be opened at all yields
/// [`FileError::PdfOpenFailed`].
pub fn render_pdf(
    filename: &str,
    bytes: &[u8],
    config: &DeckConfig,
) -> Result<(Vec<NormalizedRaster>, Vec<FileError>), FileError> {
    let open_failed = |detail: String| FileError::PdfOpenFailed {
        file: filename.to_string(),
        detail,
    };

    let pdfium = bind_pdfium().map_err(|e| open_failed(e.to_string()))?;
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| open_failed(format!("{:?}", e)))?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("{}: {} pages", filename, total_pages);

    let render_config = PdfRenderConfig::new().scale_page_by_factor(config.pdf_scale());

    let mut rasters = Vec::with_capacity(total_pages);
    let mut failures = Vec::new();

    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;
        let label = format!("{}#{}", filename, page_num);

        let rendered = page
            .render_with_config(&render_config)
            .map_err(|e| format!("{:?}", e))
            .and_then(|bitmap| {
                let image = bitmap.as_image();
                debug!(
                    "Rendered page {} → {}x{} px",
                    page_num,
                    image.width(),
                    image.height()
                );
                // The bitmap is released here; only the decoded copy travels on.
                normalize_image(&label, image, config).map_err(|e| e.to_string())
            });

        match rendered {
            Ok(raster) => rasters.push(raster),
            Err(detail) => {
                warn!("{}: page {} skipped: {}", filename, page_num, detail);
                failures.push(FileError::PageFailed {
                    file: filename.to_string(),
                    page: page_num,
                    detail,
                });
            }
        }
    }

    Ok((rasters, failures))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_path_keeps_explicit_files() {
        let p = library_path(Path::new("/opt/pdfium/lib/libpdfium.so"));
        assert_eq!(p, PathBuf::from("/opt/pdfium/lib/libpdfium.so"));
    }

    #[test]
    fn library_path_expands_directories() {
        let dir = tempfile::tempdir().unwrap();
        let p = library_path(dir.path());
        assert!(p.starts_with(dir.path()));
        assert!(p.to_string_lossy().contains("pdfium"));
    }

    #[test]
    fn garbage_is_not_a_pdf() {
        // Holds whether or not a pdfium library is installed: either the
        // bind or the parse fails, and both map to PdfOpenFailed.
        let err = render_pdf("junk.pdf", b"%PDF-nope", &DeckConfig::default()).unwrap_err();
        assert!(matches!(err, FileError::PdfOpenFailed { ref file, .. } if file == "junk.pdf"));
    }
}

//! Deck-building entry points.
//!
//! Everything here is synchronous and CPU-bound (image decoding, pdfium,
//! zip deflate). Async callers run it on a blocking thread; the HTTP server
//! does exactly that with `tokio::task::spawn_blocking`.

use crate::config::DeckConfig;
use crate::error::{DeckError, FileError};
use crate::output::{DeckOutput, DeckStats};
use crate::pipeline::input::{read_local_files, FileKind, UploadedFile};
use crate::pipeline::normalize::{normalize_bytes, NormalizedRaster};
use crate::pipeline::{compose, render};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Build a presentation from an upload batch.
///
/// Files are processed in batch order and each contributes its slides in
/// place: one for an image, one per page for a PDF.
///
/// # Returns
/// `Ok(DeckOutput)` as soon as at least one slide exists, even if other
/// files failed (see `output.skipped`).
///
/// # Errors
/// - [`DeckError::NoFilesSelected`] when the batch is empty or all blank
/// - [`DeckError::NothingProcessed`] when no file yielded a raster
/// - [`DeckError::SerializeFailed`] when packaging fails
pub fn build_deck(
    files: Vec<UploadedFile>,
    config: &DeckConfig,
) -> Result<DeckOutput, DeckError> {
    let total_start = Instant::now();

    let files: Vec<UploadedFile> = files.into_iter().filter(|f| !f.is_blank()).collect();
    if files.is_empty() {
        return Err(DeckError::NoFilesSelected);
    }

    let total = files.len();
    info!("Building deck from {} file(s)", total);
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    // ── Step 1: Decode / rasterise / normalise ───────────────────────────
    let mut stats = DeckStats {
        files_received: total,
        ..Default::default()
    };
    let mut rasters: Vec<NormalizedRaster> = Vec::with_capacity(total);
    let mut skipped: Vec<FileError> = Vec::new();

    let process_start = Instant::now();
    for (i, file) in files.into_iter().enumerate() {
        let index = i + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_start(index, total, &file.filename);
        }

        let before = rasters.len();
        let outcome = match file.kind() {
            FileKind::Image => normalize_bytes(&file.filename, &file.data, config)
                .map(|raster| rasters.push(raster)),
            FileKind::Pdf => {
                render::render_pdf(&file.filename, &file.data, config).map(|(pages, failed)| {
                    stats.pages_rendered += pages.len();
                    rasters.extend(pages);
                    skipped.extend(failed);
                })
            }
            FileKind::Unsupported => {
                debug!("Ignoring unsupported file: {}", file.filename);
                stats.files_unsupported += 1;
                Err(FileError::Unsupported {
                    file: file.filename.clone(),
                })
            }
        };
        let produced = rasters.len() - before;

        match outcome {
            Ok(()) if produced > 0 => {
                stats.files_used += 1;
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_complete(index, total, &file.filename, produced);
                }
            }
            Ok(()) => {
                // A readable PDF whose pages all failed (or that has none).
                warn!("{}: no usable pages", file.filename);
                stats.files_failed += 1;
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_skipped(index, total, &file.filename, "no usable pages");
                }
            }
            Err(e) => {
                if !matches!(e, FileError::Unsupported { .. }) {
                    warn!("Skipping {}", e);
                    stats.files_failed += 1;
                }
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_skipped(index, total, &file.filename, &e.to_string());
                }
                skipped.push(e);
            }
        }
        // `file` and its raw bytes are dropped here.
    }
    stats.process_duration_ms = process_start.elapsed().as_millis() as u64;

    if rasters.is_empty() {
        return Err(DeckError::NothingProcessed { received: total });
    }

    // ── Step 2: Compose and package ──────────────────────────────────────
    let serialize_start = Instant::now();
    let deck = compose::compose(rasters, config);
    stats.slide_count = deck.slide_count();
    let bytes = deck.to_bytes()?;
    drop(deck);
    stats.serialize_duration_ms = serialize_start.elapsed().as_millis() as u64;
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Deck complete: {} slide(s) from {}/{} file(s), {} bytes, {}ms total",
        stats.slide_count,
        stats.files_used,
        stats.files_received,
        bytes.len(),
        stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(stats.slide_count);
    }

    Ok(DeckOutput {
        bytes,
        stats,
        skipped,
    })
}

/// Build a presentation from files on disk.
///
/// Unreadable paths are reported in `output.skipped` like any other
/// per-file failure.
pub fn build_deck_from_paths<P: AsRef<Path>>(
    paths: &[P],
    config: &DeckConfig,
) -> Result<DeckOutput, DeckError> {
    let (files, read_failures) = read_local_files(paths);
    for failure in &read_failures {
        warn!("Skipping {}", failure);
    }

    if files.is_empty() && !read_failures.is_empty() {
        return Err(DeckError::NothingProcessed {
            received: read_failures.len(),
        });
    }

    let mut output = build_deck(files, config)?;
    output.stats.files_received += read_failures.len();
    output.stats.files_failed += read_failures.len();
    output.skipped.extend(read_failures);
    Ok(output)
}

/// Write a finished deck to `path`.
///
/// Uses an atomic write (temp file in the same directory + rename) so a
/// crash never leaves a truncated `.pptx` behind.
pub fn write_deck_to_file(output: &DeckOutput, path: impl AsRef<Path>) -> Result<(), DeckError> {
    let path = path.as_ref();
    let write_failed = |source: std::io::Error| DeckError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_failed)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_failed)?;
    tmp.write_all(&output.bytes).map_err(write_failed)?;
    tmp.persist(path).map_err(|e| write_failed(e.error))?;

    info!("Wrote {} ({} bytes)", path.display(), output.bytes.len());
    Ok(())
}

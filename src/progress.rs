//! Progress-callback trait for per-file deck-building events.
//!
//! Inject an [`Arc<dyn DeckProgressCallback>`] via
//! [`crate::config::DeckConfigBuilder::progress_callback`] to receive events
//! as the pipeline works through an upload batch. The CLI uses it to drive a
//! terminal progress bar; the HTTP server runs without one.
//!
//! # Example
//!
//! ```rust
//! use img2pptx::{DeckConfig, DeckProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct SlideCounter {
//!     slides: AtomicUsize,
//! }
//!
//! impl DeckProgressCallback for SlideCounter {
//!     fn on_file_complete(&self, _index: usize, _total: usize, _name: &str, rasters: usize) {
//!         self.slides.fetch_add(rasters, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(SlideCounter { slides: AtomicUsize::new(0) });
//! let config = DeckConfig::builder()
//!     .progress_callback(counter as Arc<dyn DeckProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as it processes each file of a batch.
///
/// Every method has a no-op default so implementors only override what they
/// care about. Events for one batch arrive from a single thread, in batch
/// order, but different batches may run on different threads.
pub trait DeckProgressCallback: Send + Sync {
    /// Called once before the first file is touched.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before a file is decoded or rasterised.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position in the batch
    /// * `total` — batch size
    /// * `name`  — the uploaded filename
    fn on_file_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when a file produced at least one raster.
    ///
    /// `rasters` is 1 for an image and the number of usable pages for a PDF.
    fn on_file_complete(&self, index: usize, total: usize, name: &str, rasters: usize) {
        let _ = (index, total, name, rasters);
    }

    /// Called when a file contributed nothing (unsupported, corrupt, empty PDF).
    fn on_file_skipped(&self, index: usize, total: usize, name: &str, reason: &str) {
        let _ = (index, total, name, reason);
    }

    /// Called once after composition with the final slide count.
    fn on_batch_complete(&self, slide_count: usize) {
        let _ = slide_count;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl DeckProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::DeckConfig`].
pub type ProgressCallback = Arc<dyn DeckProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        total: AtomicUsize,
        starts: AtomicUsize,
        rasters: AtomicUsize,
        skipped: AtomicUsize,
        slides: AtomicUsize,
    }

    impl DeckProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total_files: usize) {
            self.total.store(total_files, Ordering::SeqCst);
        }

        fn on_file_start(&self, _index: usize, _total: usize, _name: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_complete(&self, _index: usize, _total: usize, _name: &str, rasters: usize) {
            self.rasters.fetch_add(rasters, Ordering::SeqCst);
        }

        fn on_file_skipped(&self, _index: usize, _total: usize, _name: &str, _reason: &str) {
            self.skipped.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, slide_count: usize) {
            self.slides.store(slide_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_file_start(1, 2, "a.png");
        cb.on_file_complete(1, 2, "a.png", 1);
        cb.on_file_skipped(2, 2, "b.txt", "unsupported");
        cb.on_batch_complete(1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_batch_start(3);
        tracker.on_file_start(1, 3, "cover.jpg");
        tracker.on_file_complete(1, 3, "cover.jpg", 1);
        tracker.on_file_start(2, 3, "slides.pdf");
        tracker.on_file_complete(2, 3, "slides.pdf", 12);
        tracker.on_file_start(3, 3, "broken.png");
        tracker.on_file_skipped(3, 3, "broken.png", "decode failed");
        tracker.on_batch_complete(13);

        assert_eq!(tracker.total.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.rasters.load(Ordering::SeqCst), 13);
        assert_eq!(tracker.skipped.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.slides.load(Ordering::SeqCst), 13);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_batch_start(10);
        cb.on_file_start(1, 10, "x.gif");
    }
}

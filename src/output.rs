//! Result types returned by the deck builders.

use crate::error::FileError;
use serde::{Deserialize, Serialize};

/// A finished deck plus what happened along the way.
#[derive(Debug, Clone)]
pub struct DeckOutput {
    /// The serialised `.pptx` package.
    pub bytes: Vec<u8>,

    /// Batch statistics.
    pub stats: DeckStats,

    /// Files and pages that contributed no slide, in batch order.
    ///
    /// Non-empty on partial success: the deck was built from what remained.
    pub skipped: Vec<FileError>,
}

/// Statistics for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckStats {
    /// Non-blank files submitted.
    pub files_received: usize,
    /// Files that yielded at least one slide.
    pub files_used: usize,
    /// Files that yielded nothing despite a supported extension.
    pub files_failed: usize,
    /// Files ignored because of their extension.
    pub files_unsupported: usize,
    /// PDF pages rasterised successfully, across all PDFs.
    pub pages_rendered: usize,
    /// Slides in the deck.
    pub slide_count: usize,
    /// Decoding, rendering and normalisation.
    pub process_duration_ms: u64,
    /// Composition and packaging.
    pub serialize_duration_ms: u64,
    pub total_duration_ms: u64,
}

impl DeckOutput {
    /// `true` when every submitted file made it into the deck.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_serialise_with_field_names() {
        let stats = DeckStats {
            files_received: 3,
            files_used: 2,
            slide_count: 4,
            ..Default::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["files_received"], 3);
        assert_eq!(json["slide_count"], 4);
        assert_eq!(json["pages_rendered"], 0);
    }

    #[test]
    fn completeness_tracks_skips() {
        let mut out = DeckOutput {
            bytes: Vec::new(),
            stats: DeckStats::default(),
            skipped: Vec::new(),
        };
        assert!(out.is_complete());
        out.skipped.push(FileError::Unsupported {
            file: "notes.txt".into(),
        });
        assert!(!out.is_complete());
    }
}

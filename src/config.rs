//! Configuration types for deck building.
//!
//! Everything the pipeline needs to know is carried by one immutable
//! [`DeckConfig`], built once at startup and shared (behind an `Arc` in the
//! server) by every request. No module-level globals.

use crate::error::DeckError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// English Metric Units per inch, the unit of every OOXML coordinate.
pub const EMU_PER_INCH: i64 = 914_400;

/// Configuration for building a slide deck.
///
/// Built via [`DeckConfig::builder()`] or using [`DeckConfig::default()`].
///
/// # Example
/// ```rust
/// use img2pptx::DeckConfig;
///
/// let config = DeckConfig::builder()
///     .pdf_dpi(110)
///     .max_image_size(1280, 720)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_image_width, 1280);
/// ```
#[derive(Clone)]
pub struct DeckConfig {
    /// Slide width in EMU. Default: 9 144 000 (10 in).
    pub slide_width_emu: i64,

    /// Slide height in EMU. Default: 5 143 500 (5.625 in, i.e. 16:9).
    pub slide_height_emu: i64,

    /// Largest raster width kept after normalisation, in pixels. Default: 1920.
    ///
    /// Anything wider is downscaled (aspect ratio preserved) before it is
    /// embedded; a slide never needs more than a full-HD bitmap.
    pub max_image_width: u32,

    /// Largest raster height kept after normalisation, in pixels. Default: 1080.
    pub max_image_height: u32,

    /// Resolution used when rasterising PDF pages. Range: 36–600. Default: 150.
    ///
    /// A US-letter page at 150 DPI is 1275 × 1650 px, already above the
    /// raster cap, so higher values only cost memory.
    pub pdf_dpi: u32,

    /// Ceiling on the whole multipart request body, in bytes. Default: 200 MiB.
    pub max_upload_bytes: usize,

    /// Slide background fill. Default: black.
    pub background: RgbColor,

    /// Optional per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            slide_width_emu: 9_144_000,
            slide_height_emu: 5_143_500,
            max_image_width: 1920,
            max_image_height: 1080,
            pdf_dpi: 150,
            max_upload_bytes: 200 * 1024 * 1024,
            background: RgbColor::BLACK,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for DeckConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeckConfig")
            .field("slide_width_emu", &self.slide_width_emu)
            .field("slide_height_emu", &self.slide_height_emu)
            .field("max_image_width", &self.max_image_width)
            .field("max_image_height", &self.max_image_height)
            .field("pdf_dpi", &self.pdf_dpi)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("background", &self.background)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn DeckProgressCallback>"),
            )
            .finish()
    }
}

impl DeckConfig {
    /// Create a new builder for `DeckConfig`.
    pub fn builder() -> DeckConfigBuilder {
        DeckConfigBuilder {
            config: Self::default(),
        }
    }

    /// PDF points (1/72 in) to pixels at the configured DPI.
    pub fn pdf_scale(&self) -> f32 {
        self.pdf_dpi as f32 / 72.0
    }
}

/// Builder for [`DeckConfig`].
#[derive(Debug)]
pub struct DeckConfigBuilder {
    config: DeckConfig,
}

impl DeckConfigBuilder {
    /// Slide canvas size in EMU.
    pub fn slide_size_emu(mut self, width: i64, height: i64) -> Self {
        self.config.slide_width_emu = width;
        self.config.slide_height_emu = height;
        self
    }

    /// Slide canvas size in inches.
    pub fn slide_size_inches(self, width: f64, height: f64) -> Self {
        self.slide_size_emu(
            (width * EMU_PER_INCH as f64).round() as i64,
            (height * EMU_PER_INCH as f64).round() as i64,
        )
    }

    pub fn max_image_size(mut self, width: u32, height: u32) -> Self {
        self.config.max_image_width = width.max(1);
        self.config.max_image_height = height.max(1);
        self
    }

    pub fn pdf_dpi(mut self, dpi: u32) -> Self {
        self.config.pdf_dpi = dpi.clamp(36, 600);
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn background(mut self, color: RgbColor) -> Self {
        self.config.background = color;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<DeckConfig, DeckError> {
        let c = &self.config;
        if c.slide_width_emu <= 0 || c.slide_height_emu <= 0 {
            return Err(DeckError::InvalidConfig(format!(
                "Slide size must be positive, got {}x{} EMU",
                c.slide_width_emu, c.slide_height_emu
            )));
        }
        // PresentationML caps sldSz at 51 206 400 EMU (56 in) per side.
        if c.slide_width_emu > 51_206_400 || c.slide_height_emu > 51_206_400 {
            return Err(DeckError::InvalidConfig(format!(
                "Slide size exceeds 56in, got {}x{} EMU",
                c.slide_width_emu, c.slide_height_emu
            )));
        }
        if c.max_upload_bytes == 0 {
            return Err(DeckError::InvalidConfig(
                "Upload limit must be > 0 bytes".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Colours ──────────────────────────────────────────────────────────────

/// A 24-bit sRGB colour as used by DrawingML `<a:srgbClr>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbColor(pub u8, pub u8, pub u8);

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor(0, 0, 0);
    pub const RED: RgbColor = RgbColor(255, 0, 0);

    /// Upper-case hex form, e.g. `FF0000`.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl Default for RgbColor {
    fn default() -> Self {
        RgbColor::BLACK
    }
}

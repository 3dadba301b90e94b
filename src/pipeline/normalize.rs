//! Normalisation: any decodable raster → upright, size-capped PNG.
//!
//! Every slide picture goes through here exactly once, whether it came from
//! an uploaded photo or a rendered PDF page:
//!
//! 1. decode by content (the extension only chose this branch);
//! 2. apply the EXIF orientation so "up" in the pixels is "up" on screen;
//! 3. downscale into the configured box with Lanczos3 if either side is over;
//! 4. re-encode as PNG, which is lossless, so nothing degrades twice.

use crate::config::DeckConfig;
use crate::error::FileError;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, ImageResult};
use std::io::Cursor;
use tracing::debug;

/// A slide-ready raster: PNG bytes plus a label naming where it came from.
#[derive(Clone)]
pub struct NormalizedRaster {
    /// `photo.jpg` for images, `report.pdf#3` for PDF pages.
    pub label: String,
    png: Vec<u8>,
}

impl NormalizedRaster {
    /// Wrap already-encoded PNG bytes. No validation happens here; a raster
    /// whose header cannot be read is caught at placement time.
    pub fn from_png(label: impl Into<String>, png: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            png,
        }
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn into_png(self) -> Vec<u8> {
        self.png
    }

    /// Pixel size read from the PNG header, without decoding pixel data.
    pub fn dimensions(&self) -> ImageResult<(u32, u32)> {
        ImageReader::with_format(Cursor::new(&self.png), ImageFormat::Png).into_dimensions()
    }
}

impl std::fmt::Debug for NormalizedRaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizedRaster")
            .field("label", &self.label)
            .field("png_bytes", &self.png.len())
            .finish()
    }
}

/// Decode an uploaded image and normalise it.
///
/// # Errors
/// [`FileError::DecodeFailed`] when the bytes are not a decodable image;
/// the caller skips the file.
pub fn normalize_bytes(
    label: &str,
    bytes: &[u8],
    config: &DeckConfig,
) -> Result<NormalizedRaster, FileError> {
    let image = decode_upright(bytes).map_err(|e| FileError::DecodeFailed {
        file: label.to_string(),
        detail: e.to_string(),
    })?;
    normalize_image(label, image, config)
}

/// Normalise an already-decoded raster (a rendered PDF page).
pub fn normalize_image(
    label: &str,
    image: DynamicImage,
    config: &DeckConfig,
) -> Result<NormalizedRaster, FileError> {
    let (width, height) = (image.width(), image.height());
    let (target_w, target_h) = fit_within(
        width,
        height,
        config.max_image_width,
        config.max_image_height,
    );

    let image = if (target_w, target_h) != (width, height) {
        debug!(
            "{}: downscaling {}x{} → {}x{}",
            label, width, height, target_w, target_h
        );
        image.resize_exact(target_w, target_h, FilterType::Lanczos3)
    } else {
        image
    };

    // The PNG encoder has no floating-point colour types.
    let image = match image {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            DynamicImage::ImageRgba8(image.to_rgba8())
        }
        other => other,
    };

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| FileError::EncodeFailed {
            file: label.to_string(),
            detail: e.to_string(),
        })?;
    debug!("{}: normalised to {} PNG bytes", label, png.len());

    Ok(NormalizedRaster::from_png(label, png))
}

/// Size that fits `width × height` inside `max_w × max_h` with the aspect
/// ratio preserved. Sizes already inside the box are returned unchanged;
/// nothing is ever upscaled.
///
/// The constraining axis lands exactly on its cap; the other is rounded to
/// the nearest pixel and never drops below 1.
pub fn fit_within(width: u32, height: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    // A zero cap can only come from a hand-built config; treat it as 1.
    let (max_w, max_h) = (max_w.max(1), max_h.max(1));
    if width <= max_w && height <= max_h {
        return (width, height);
    }
    let ratio = f64::min(
        max_w as f64 / width as f64,
        max_h as f64 / height as f64,
    );
    let w = ((width as f64 * ratio).round() as u32).clamp(1, max_w);
    let h = ((height as f64 * ratio).round() as u32).clamp(1, max_h);
    (w, h)
}

/// Decode with the stored orientation applied.
fn decode_upright(bytes: &[u8]) -> ImageResult<DynamicImage> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_decoder()?;
    // Broken EXIF is common in phone photos and must not cost the picture.
    let orientation = decoder.orientation().unwrap_or_else(|e| {
        debug!("Ignoring unreadable orientation metadata: {}", e);
        Orientation::NoTransforms
    });
    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn png_of(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([10, 20, 30])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn fit_within_keeps_small_sizes() {
        assert_eq!(fit_within(800, 600, 1920, 1080), (800, 600));
        assert_eq!(fit_within(1920, 1080, 1920, 1080), (1920, 1080));
        assert_eq!(fit_within(1, 1, 1920, 1080), (1, 1));
    }

    #[test]
    fn fit_within_caps_the_constraining_axis() {
        assert_eq!(fit_within(3840, 2160, 1920, 1080), (1920, 1080));
        assert_eq!(fit_within(2000, 500, 1920, 1080), (1920, 480));
        assert_eq!(fit_within(1000, 1500, 1920, 1080), (720, 1080));
        assert_eq!(fit_within(3000, 1999, 1920, 1080), (1621, 1080));
    }

    #[test]
    fn fit_within_never_collapses_to_zero() {
        assert_eq!(fit_within(100_000, 1, 1920, 1080), (1920, 1));
        assert_eq!(fit_within(1, 100_000, 1920, 1080), (1, 1080));
    }

    #[test]
    fn fit_within_tolerates_zero_caps() {
        assert_eq!(fit_within(4000, 10, 0, 1080), (1, 1));
        assert_eq!(fit_within(10, 4000, 1920, 0), (1, 1));
        assert_eq!(fit_within(0, 0, 0, 0), (0, 0));
    }

    #[test]
    fn zero_cap_in_a_literal_config_does_not_panic() {
        let cfg = DeckConfig {
            max_image_width: 0,
            ..DeckConfig::default()
        };
        let raster = normalize_bytes("strip.png", &png_of(4000, 10), &cfg).unwrap();
        assert_eq!(raster.dimensions().unwrap(), (1, 1));
    }

    #[test]
    fn fit_within_preserves_aspect_ratio() {
        for &(w, h) in &[(4000u32, 3000u32), (2500, 1100), (1921, 1081), (7000, 333)] {
            let (nw, nh) = fit_within(w, h, 1920, 1080);
            assert!(nw <= 1920 && nh <= 1080);
            assert!(nw == 1920 || nh == 1080, "{w}x{h} → {nw}x{nh}");
            let expected_h = nw as f64 * h as f64 / w as f64;
            assert!((nh as f64 - expected_h).abs() <= 1.0, "{w}x{h} → {nw}x{nh}");
        }
    }

    #[test]
    fn small_image_keeps_its_size() {
        let cfg = DeckConfig::default();
        let raster = normalize_bytes("small.png", &png_of(800, 600), &cfg).unwrap();
        assert_eq!(raster.dimensions().unwrap(), (800, 600));
        assert_eq!(raster.label, "small.png");
    }

    #[test]
    fn oversized_image_is_downscaled() {
        let cfg = DeckConfig::default();
        let raster = normalize_bytes("wide.png", &png_of(2000, 500), &cfg).unwrap();
        assert_eq!(raster.dimensions().unwrap(), (1920, 480));
    }

    #[test]
    fn custom_cap_is_honoured() {
        let cfg = DeckConfig::builder().max_image_size(64, 64).build().unwrap();
        let raster = normalize_bytes("tall.png", &png_of(50, 200), &cfg).unwrap();
        assert_eq!(raster.dimensions().unwrap(), (16, 64));
    }

    #[test]
    fn jpeg_content_is_detected_regardless_of_label() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([200, 0, 0])));
        let mut jpeg = Vec::new();
        img.write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();
        let raster = normalize_bytes("mislabelled.png", &jpeg, &DeckConfig::default()).unwrap();
        assert_eq!(raster.dimensions().unwrap(), (40, 30));
        assert_eq!(&raster.png()[..4], b"\x89PNG");
    }

    #[test]
    fn corrupt_bytes_fail_to_decode() {
        let err = normalize_bytes("broken.jpg", b"definitely not an image", &DeckConfig::default())
            .unwrap_err();
        assert!(matches!(err, FileError::DecodeFailed { ref file, .. } if file == "broken.jpg"));
    }

    #[test]
    fn float_rasters_are_encoded_as_eight_bit() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255])));
        let float = DynamicImage::ImageRgba32F(img.to_rgba32f());
        let raster = normalize_image("hdr.tiff", float, &DeckConfig::default()).unwrap();
        assert_eq!(raster.dimensions().unwrap(), (3, 2));
    }

    // ── EXIF orientation ────────────────────────────────────────────────

    fn crc32(bytes: &[u8]) -> u32 {
        let mut crc = 0xFFFF_FFFFu32;
        for &b in bytes {
            crc ^= b as u32;
            for _ in 0..8 {
                let mask = (crc & 1).wrapping_neg();
                crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
            }
        }
        !crc
    }

    /// A PNG carrying an `eXIf` chunk with the given orientation tag.
    fn png_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
        let plain = png_of(width, height);

        // Big-endian TIFF header, one IFD entry: 0x0112 SHORT 1 = orientation.
        let mut exif = b"MM\x00\x2a\x00\x00\x00\x08".to_vec();
        exif.extend_from_slice(&1u16.to_be_bytes());
        exif.extend_from_slice(&0x0112u16.to_be_bytes());
        exif.extend_from_slice(&3u16.to_be_bytes());
        exif.extend_from_slice(&1u32.to_be_bytes());
        exif.extend_from_slice(&orientation.to_be_bytes());
        exif.extend_from_slice(&[0, 0]);
        exif.extend_from_slice(&0u32.to_be_bytes());

        let mut chunk = Vec::new();
        chunk.extend_from_slice(&(exif.len() as u32).to_be_bytes());
        let mut body = b"eXIf".to_vec();
        body.extend_from_slice(&exif);
        chunk.extend_from_slice(&body);
        chunk.extend_from_slice(&crc32(&body).to_be_bytes());

        // Signature (8) + IHDR (4 len + 4 type + 13 data + 4 crc) = 33.
        let mut out = plain[..33].to_vec();
        out.extend_from_slice(&chunk);
        out.extend_from_slice(&plain[33..]);
        out
    }

    #[test]
    fn exif_rotation_swaps_axes() {
        let bytes = png_with_orientation(4, 2, 6);
        let raster = normalize_bytes("phone.png", &bytes, &DeckConfig::default()).unwrap();
        assert_eq!(raster.dimensions().unwrap(), (2, 4));
    }

    #[test]
    fn exif_identity_keeps_axes() {
        let bytes = png_with_orientation(4, 2, 1);
        let raster = normalize_bytes("scan.png", &bytes, &DeckConfig::default()).unwrap();
        assert_eq!(raster.dimensions().unwrap(), (4, 2));
    }
}

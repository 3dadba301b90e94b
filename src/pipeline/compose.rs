//! Slide composition: one raster → one letterboxed slide.
//!
//! Each picture is scaled by `min(canvas_w / w, canvas_h / h)` so it touches
//! two opposite edges of the canvas and is centred along the other axis. The
//! slide background shows through the margins.

use crate::config::{DeckConfig, RgbColor, EMU_PER_INCH};
use crate::pipeline::normalize::NormalizedRaster;
use crate::pptx::{Presentation, Rect};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a raster could not be placed on its slide.
#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("cannot read image size: {0}")]
    Unreadable(String),

    #[error("image has no area ({0}x{1})")]
    Empty(u32, u32),
}

/// Centred, aspect-preserving frame for an `img_w × img_h` picture.
///
/// Sizes are rounded to the nearest EMU; offsets are
/// `(canvas - size) / 2` rounded down, so both margins differ by at most 1 EMU.
pub fn fit_centered(
    canvas_w: i64,
    canvas_h: i64,
    img_w: u32,
    img_h: u32,
) -> Result<Rect, PlacementError> {
    if img_w == 0 || img_h == 0 {
        return Err(PlacementError::Empty(img_w, img_h));
    }
    let scale = f64::min(
        canvas_w as f64 / img_w as f64,
        canvas_h as f64 / img_h as f64,
    );
    let cx = ((img_w as f64 * scale).round() as i64).min(canvas_w);
    let cy = ((img_h as f64 * scale).round() as i64).min(canvas_h);
    Ok(Rect::new((canvas_w - cx) / 2, (canvas_h - cy) / 2, cx, cy))
}

/// Where the placement-failure notice goes: 1 in from the top-left corner,
/// 8 in wide and 1 in tall.
pub fn notice_frame() -> Rect {
    Rect::new(EMU_PER_INCH, EMU_PER_INCH, 8 * EMU_PER_INCH, EMU_PER_INCH)
}

/// Text of the placement-failure notice.
pub fn notice_text(error: &PlacementError) -> String {
    format!("Error loading/placing image:\n{}", error)
}

fn place(raster: &NormalizedRaster, config: &DeckConfig) -> Result<Rect, PlacementError> {
    let (w, h) = raster
        .dimensions()
        .map_err(|e| PlacementError::Unreadable(e.to_string()))?;
    fit_centered(config.slide_width_emu, config.slide_height_emu, w, h)
}

/// Build a presentation with one slide per raster, in order.
///
/// A raster that cannot be placed still gets its slide, carrying a red
/// notice instead of the picture, so slide numbers stay aligned with inputs.
pub fn compose(rasters: Vec<NormalizedRaster>, config: &DeckConfig) -> Presentation {
    let mut deck = Presentation::new(config.slide_width_emu, config.slide_height_emu);

    for raster in rasters {
        let slide = deck.add_slide(config.background);
        match place(&raster, config) {
            Ok(frame) => {
                debug!(
                    "{}: placed at ({}, {}) size {}x{} EMU",
                    raster.label, frame.x, frame.y, frame.cx, frame.cy
                );
                let label = raster.label.clone();
                slide.add_picture(raster.into_png(), frame, label);
            }
            Err(e) => {
                warn!("{}: {}", raster.label, e);
                slide.add_text_box(notice_text(&e), notice_frame(), RgbColor::RED);
            }
        }
    }

    deck
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::Shape;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    const W: i64 = 9_144_000;
    const H: i64 = 5_143_500;

    fn raster(label: &str, width: u32, height: u32) -> NormalizedRaster {
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        NormalizedRaster::from_png(label, png)
    }

    #[test]
    fn four_by_three_is_pillarboxed() {
        let r = fit_centered(W, H, 800, 600).unwrap();
        assert_eq!(r, Rect::new(1_143_000, 0, 6_858_000, 5_143_500));
        // Equal left and right margins.
        assert_eq!(r.x, W - (r.x + r.cx));
    }

    #[test]
    fn wide_image_is_letterboxed() {
        let r = fit_centered(W, H, 2000, 500).unwrap();
        assert_eq!(r.cx, W);
        assert_eq!(r.x, 0);
        assert_eq!(r.cy, 2_286_000);
        assert_eq!(r.y, (H - 2_286_000) / 2);
    }

    #[test]
    fn matching_aspect_fills_the_canvas() {
        let r = fit_centered(W, H, 1920, 1080).unwrap();
        assert_eq!(r, Rect::new(0, 0, W, H));
    }

    #[test]
    fn frame_always_fits_and_is_centred() {
        for &(w, h) in &[(1u32, 1u32), (1921, 7), (3, 1999), (1080, 1920), (640, 480)] {
            let r = fit_centered(W, H, w, h).unwrap();
            assert!(r.x >= 0 && r.y >= 0);
            assert!(r.x + r.cx <= W && r.y + r.cy <= H, "{w}x{h}");
            assert!(r.cx == W || r.cy == H, "{w}x{h} touches no edge");
            let (left, right) = (r.x, W - r.x - r.cx);
            let (top, bottom) = (r.y, H - r.y - r.cy);
            assert!((left - right).abs() <= 1 && (top - bottom).abs() <= 1);
        }
    }

    #[test]
    fn zero_area_is_rejected() {
        assert!(matches!(
            fit_centered(W, H, 0, 10),
            Err(PlacementError::Empty(0, 10))
        ));
    }

    #[test]
    fn compose_keeps_order_and_background() {
        let deck = compose(
            vec![raster("a.png", 800, 600), raster("b.pdf#1", 100, 200)],
            &DeckConfig::default(),
        );
        assert_eq!(deck.slide_count(), 2);
        for slide in deck.slides() {
            assert_eq!(slide.background(), RgbColor::BLACK);
            assert_eq!(slide.shapes().len(), 1);
        }
        match &deck.slides()[1].shapes()[0] {
            Shape::Picture { description, .. } => assert_eq!(description, "b.pdf#1"),
            other => panic!("expected picture, got {other:?}"),
        }
    }

    #[test]
    fn unplaceable_raster_gets_a_red_notice() {
        let broken = NormalizedRaster::from_png("bad.png", b"not a png".to_vec());
        let deck = compose(vec![broken], &DeckConfig::default());

        assert_eq!(deck.slide_count(), 1);
        match &deck.slides()[0].shapes()[0] {
            Shape::TextBox { text, frame, color } => {
                assert!(text.starts_with("Error loading/placing image:\n"));
                assert!(text.len() > "Error loading/placing image:\n".len());
                assert_eq!(*frame, notice_frame());
                assert_eq!(*color, RgbColor::RED);
            }
            other => panic!("expected text box, got {other:?}"),
        }
    }

    #[test]
    fn notice_frame_is_one_inch_in() {
        assert_eq!(notice_frame(), Rect::new(914_400, 914_400, 7_315_200, 914_400));
    }
}

//! Minimal PresentationML (`.pptx`) writer.
//!
//! Only what a picture deck needs: slides with a solid background, pictures
//! and plain text boxes, on a single blank layout. Coordinates are EMU
//! (914 400 per inch) throughout.
//!
//! ```rust
//! use img2pptx::pptx::{Presentation, Rect};
//! use img2pptx::RgbColor;
//!
//! let mut deck = Presentation::new(9_144_000, 5_143_500);
//! deck.add_slide(RgbColor::BLACK)
//!     .add_text_box("hello", Rect::new(914_400, 914_400, 7_315_200, 914_400), RgbColor::RED);
//! let bytes = deck.to_bytes().unwrap();
//! assert_eq!(&bytes[..2], b"PK");
//! ```

mod package;
mod parts;
mod slide;

pub use slide::{Shape, Slide};

use crate::config::RgbColor;
use crate::error::DeckError;
use std::fmt::Write as FmtWrite;

/// MIME type of a `.pptx` file.
pub const PPTX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// A rectangle on the slide, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }
}

/// An in-memory presentation, serialised with [`Presentation::to_bytes`].
#[derive(Debug)]
pub struct Presentation {
    slide_width: i64,
    slide_height: i64,
    slides: Vec<Slide>,
}

impl Presentation {
    /// Create an empty presentation with the given canvas size in EMU.
    pub fn new(slide_width: i64, slide_height: i64) -> Self {
        Self {
            slide_width,
            slide_height,
            slides: Vec::new(),
        }
    }

    /// Append a slide with a solid background and return it for filling.
    pub fn add_slide(&mut self, background: RgbColor) -> &mut Slide {
        self.slides.push(Slide::new(background));
        let last = self.slides.len() - 1;
        &mut self.slides[last]
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Canvas size `(width, height)` in EMU.
    pub fn slide_size(&self) -> (i64, i64) {
        (self.slide_width, self.slide_height)
    }

    /// Serialise the whole package into a `.pptx` byte buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DeckError> {
        package::write_package(self)
    }

    /// `ppt/presentation.xml`.
    pub(crate) fn presentation_xml(&self) -> Result<String, std::fmt::Error> {
        let mut xml = String::with_capacity(1024);
        xml.push_str(parts::XML_DECLARATION);
        write!(
            xml,
            r#"<p:presentation {} saveSubsetFonts="1">"#,
            parts::NS_PRESENTATION
        )?;
        xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);

        // sldIdLst may not be empty when present.
        if !self.slides.is_empty() {
            xml.push_str("<p:sldIdLst>");
            for index in 0..self.slides.len() {
                write!(
                    xml,
                    r#"<p:sldId id="{}" r:id="{}"/>"#,
                    256 + index,
                    package::slide_rel_id(index)
                )?;
            }
            xml.push_str("</p:sldIdLst>");
        }

        write!(
            xml,
            r#"<p:sldSz cx="{}" cy="{}"/>"#,
            self.slide_width, self.slide_height
        )?;
        xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
        xml.push_str("</p:presentation>");
        Ok(xml)
    }
}

/// Escape text for use in XML content or attribute values.
pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Control characters other than tab/newline are illegal in XML 1.0.
            c if (c as u32) < 0x20 && c != '\t' && c != '\n' && c != '\r' => {}
            c => out.push(c),
        }
    }
    out
}

//! Slides and the shapes placed on them.

use super::{escape_xml, parts, Rect};
use crate::config::RgbColor;
use std::fmt::Write as FmtWrite;

/// Something drawn on a slide.
#[derive(Debug, Clone)]
pub enum Shape {
    /// An embedded PNG stretched to `frame`.
    Picture {
        png: Vec<u8>,
        frame: Rect,
        description: String,
    },
    /// Word-wrapped text in a single colour. Each `\n` starts a new paragraph.
    TextBox {
        text: String,
        frame: Rect,
        color: RgbColor,
    },
}

/// One slide: a solid background and its shapes, in z-order.
#[derive(Debug, Clone)]
pub struct Slide {
    background: RgbColor,
    shapes: Vec<Shape>,
}

impl Slide {
    pub(crate) fn new(background: RgbColor) -> Self {
        Self {
            background,
            shapes: Vec::new(),
        }
    }

    pub fn background(&self) -> RgbColor {
        self.background
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Place a PNG picture. `description` becomes the alt text.
    pub fn add_picture(
        &mut self,
        png: Vec<u8>,
        frame: Rect,
        description: impl Into<String>,
    ) -> &mut Self {
        self.shapes.push(Shape::Picture {
            png,
            frame,
            description: description.into(),
        });
        self
    }

    pub fn add_text_box(
        &mut self,
        text: impl Into<String>,
        frame: Rect,
        color: RgbColor,
    ) -> &mut Self {
        self.shapes.push(Shape::TextBox {
            text: text.into(),
            frame,
            color,
        });
        self
    }

    /// PNG payloads of this slide's pictures, in shape order.
    pub(crate) fn pictures(&self) -> impl Iterator<Item = &[u8]> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Picture { png, .. } => Some(png.as_slice()),
            Shape::TextBox { .. } => None,
        })
    }

    /// `ppt/slides/slideN.xml`. Picture `k` on this slide refers to
    /// relationship `rId{k + 2}` (`rId1` is the layout).
    pub(crate) fn to_xml(&self) -> Result<String, std::fmt::Error> {
        let mut xml = String::with_capacity(2048);
        xml.push_str(parts::XML_DECLARATION);
        write!(xml, "<p:sld {}><p:cSld>", parts::NS_PRESENTATION)?;

        // Background must come before spTree.
        write!(
            xml,
            r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
            self.background.to_hex()
        )?;

        xml.push_str("<p:spTree>");
        xml.push_str(parts::GROUP_SHAPE_PROPERTIES);

        let mut picture_index = 0;
        for (i, shape) in self.shapes.iter().enumerate() {
            // id 1 is the group itself.
            let shape_id = i + 2;
            match shape {
                Shape::Picture {
                    frame, description, ..
                } => {
                    picture_index += 1;
                    write_picture(&mut xml, shape_id, picture_index, frame, description)?;
                }
                Shape::TextBox { text, frame, color } => {
                    write_text_box(&mut xml, shape_id, frame, text, *color)?;
                }
            }
        }

        xml.push_str("</p:spTree>");
        xml.push_str("</p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");
        Ok(xml)
    }
}

fn write_frame(xml: &mut String, frame: &Rect) -> std::fmt::Result {
    write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        frame.x, frame.y, frame.cx, frame.cy
    )
}

fn write_picture(
    xml: &mut String,
    shape_id: usize,
    picture_index: usize,
    frame: &Rect,
    description: &str,
) -> std::fmt::Result {
    xml.push_str("<p:pic><p:nvPicPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
        shape_id,
        picture_index,
        escape_xml(description)
    )?;
    xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#);
    write!(
        xml,
        r#"<p:blipFill><a:blip r:embed="rId{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
        picture_index + 1
    )?;
    xml.push_str("<p:spPr>");
    write_frame(xml, frame)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
    Ok(())
}

fn write_text_box(
    xml: &mut String,
    shape_id: usize,
    frame: &Rect,
    text: &str,
    color: RgbColor,
) -> std::fmt::Result {
    xml.push_str("<p:sp><p:nvSpPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="TextBox {}"/>"#,
        shape_id, shape_id
    )?;
    xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#);
    xml.push_str("<p:spPr>");
    write_frame(xml, frame)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#);
    xml.push_str(r#"<p:txBody><a:bodyPr wrap="square" rtlCol="0"><a:spAutoFit/></a:bodyPr><a:lstStyle/>"#);

    let color = color.to_hex();
    for line in text.split('\n') {
        if line.is_empty() {
            xml.push_str("<a:p/>");
            continue;
        }
        write!(
            xml,
            r#"<a:p><a:r><a:rPr lang="en-US" dirty="0"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:rPr><a:t>{}</a:t></a:r></a:p>"#,
            color,
            escape_xml(line)
        )?;
    }

    xml.push_str("</p:txBody></p:sp>");
    Ok(())
}

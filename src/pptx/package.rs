//! OPC packaging: lay the parts out in a zip container.
//!
//! Part layout:
//!
//! ```text
//! [Content_Types].xml
//! _rels/.rels
//! docProps/core.xml, docProps/app.xml
//! ppt/presentation.xml            rId1 master, rId2 theme, rId3.. slides
//! ppt/slideMasters/slideMaster1.xml
//! ppt/slideLayouts/slideLayout1.xml
//! ppt/theme/theme1.xml
//! ppt/slides/slideN.xml           rId1 layout, rId2.. pictures
//! ppt/media/imageN.png            numbered across the whole deck
//! ```

use super::{parts, Presentation};
use crate::error::DeckError;
use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

/// Relationship id of slide `index` (0-based) in `presentation.xml.rels`.
pub(crate) fn slide_rel_id(index: usize) -> String {
    format!("rId{}", index + 3)
}

/// Relationship list builder for `*.rels` parts.
#[derive(Default)]
struct Relationships {
    entries: Vec<(String, &'static str, String)>,
}

impl Relationships {
    fn add(&mut self, id: impl Into<String>, rel_type: &'static str, target: impl Into<String>) {
        self.entries.push((id.into(), rel_type, target.into()));
    }

    fn to_xml(&self) -> Result<String, std::fmt::Error> {
        let mut xml = String::with_capacity(256 + self.entries.len() * 160);
        xml.push_str(parts::XML_DECLARATION);
        write!(xml, r#"<Relationships xmlns="{}">"#, parts::NS_RELATIONSHIPS)?;
        for (id, rel_type, target) in &self.entries {
            write!(
                xml,
                r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                id, rel_type, target
            )?;
        }
        xml.push_str("</Relationships>");
        Ok(xml)
    }
}

struct PackageWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl PackageWriter {
    fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// XML parts compress well; PNG media is already compressed and is
    /// stored as-is.
    fn add_part(&mut self, path: &str, content: &[u8], compress: bool) -> Result<(), DeckError> {
        let options = if compress {
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated)
        } else {
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored)
        };
        self.zip.start_file(path, options)?;
        self.zip
            .write_all(content)
            .map_err(|e| DeckError::SerializeFailed(format!("{}: {}", path, e)))
    }

    fn add_xml(&mut self, path: &str, xml: &str) -> Result<(), DeckError> {
        self.add_part(path, xml.as_bytes(), true)
    }

    fn finish(self) -> Result<Vec<u8>, DeckError> {
        Ok(self.zip.finish()?.into_inner())
    }
}

fn fmt_failed(part: &str) -> impl Fn(std::fmt::Error) -> DeckError + '_ {
    move |_| DeckError::SerializeFailed(format!("could not format {}", part))
}

pub(crate) fn write_package(deck: &Presentation) -> Result<Vec<u8>, DeckError> {
    let slide_count = deck.slide_count();
    let mut pkg = PackageWriter::new();

    // [Content_Types].xml goes first so sniffers see it immediately.
    let mut content_types = String::with_capacity(2048 + slide_count * 160);
    content_types.push_str(parts::XML_DECLARATION);
    content_types.push_str(parts::CONTENT_TYPES_HEAD);
    for n in 1..=slide_count {
        write!(
            content_types,
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="{}"/>"#,
            n,
            parts::CT_SLIDE
        )
        .map_err(fmt_failed("[Content_Types].xml"))?;
    }
    content_types.push_str("</Types>");
    pkg.add_xml("[Content_Types].xml", &content_types)?;

    let mut root_rels = Relationships::default();
    root_rels.add("rId1", parts::REL_OFFICE_DOCUMENT, "ppt/presentation.xml");
    root_rels.add("rId2", parts::REL_CORE_PROPERTIES, "docProps/core.xml");
    root_rels.add("rId3", parts::REL_EXTENDED_PROPERTIES, "docProps/app.xml");
    pkg.add_xml(
        "_rels/.rels",
        &root_rels.to_xml().map_err(fmt_failed("_rels/.rels"))?,
    )?;

    pkg.add_xml("docProps/core.xml", parts::CORE_PROPERTIES)?;
    pkg.add_xml("docProps/app.xml", &app_properties(slide_count))?;

    pkg.add_xml(
        "ppt/presentation.xml",
        &deck
            .presentation_xml()
            .map_err(fmt_failed("ppt/presentation.xml"))?,
    )?;

    let mut pres_rels = Relationships::default();
    pres_rels.add("rId1", parts::REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml");
    pres_rels.add("rId2", parts::REL_THEME, "theme/theme1.xml");
    for index in 0..slide_count {
        pres_rels.add(
            slide_rel_id(index),
            parts::REL_SLIDE,
            format!("slides/slide{}.xml", index + 1),
        );
    }
    pkg.add_xml(
        "ppt/_rels/presentation.xml.rels",
        &pres_rels
            .to_xml()
            .map_err(fmt_failed("ppt/_rels/presentation.xml.rels"))?,
    )?;

    let mut master_rels = Relationships::default();
    master_rels.add("rId1", parts::REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
    master_rels.add("rId2", parts::REL_THEME, "../theme/theme1.xml");
    pkg.add_xml("ppt/slideMasters/slideMaster1.xml", parts::SLIDE_MASTER)?;
    pkg.add_xml(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        &master_rels.to_xml().map_err(fmt_failed("slideMaster1.xml.rels"))?,
    )?;

    let mut layout_rels = Relationships::default();
    layout_rels.add("rId1", parts::REL_SLIDE_MASTER, "../slideMasters/slideMaster1.xml");
    pkg.add_xml("ppt/slideLayouts/slideLayout1.xml", parts::SLIDE_LAYOUT)?;
    pkg.add_xml(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        &layout_rels.to_xml().map_err(fmt_failed("slideLayout1.xml.rels"))?,
    )?;

    pkg.add_xml("ppt/theme/theme1.xml", parts::THEME)?;

    let mut media_index = 0;
    for (index, slide) in deck.slides().iter().enumerate() {
        let n = index + 1;
        let slide_path = format!("ppt/slides/slide{}.xml", n);
        pkg.add_xml(&slide_path, &slide.to_xml().map_err(fmt_failed(&slide_path))?)?;

        let mut slide_rels = Relationships::default();
        slide_rels.add("rId1", parts::REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
        for (k, png) in slide.pictures().enumerate() {
            media_index += 1;
            slide_rels.add(
                format!("rId{}", k + 2),
                parts::REL_IMAGE,
                format!("../media/image{}.png", media_index),
            );
            pkg.add_part(&format!("ppt/media/image{}.png", media_index), png, false)?;
        }
        let rels_path = format!("ppt/slides/_rels/slide{}.xml.rels", n);
        pkg.add_xml(&rels_path, &slide_rels.to_xml().map_err(fmt_failed(&rels_path))?)?;
    }

    pkg.finish()
}

fn app_properties(slide_count: usize) -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n",
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
            "<Application>img2pptx</Application>",
            "<Slides>{}</Slides>",
            "</Properties>"
        ),
        slide_count
    )
}

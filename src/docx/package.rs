//! The OPC container: fixed parts, relationships, styles and numbering.

use super::xml::{document_xml, xml_escape_text};
use super::{Document, StyleDefaults};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn content_types_xml(has_numbering: bool, has_media: bool) -> String {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    out.push('\n');
    out.push_str(
        r#"  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    );
    out.push('\n');
    out.push_str(r#"  <Default Extension="xml" ContentType="application/xml"/>"#);
    out.push('\n');
    if has_media {
        out.push_str(r#"  <Default Extension="png" ContentType="image/png"/>"#);
        out.push('\n');
    }
    out.push_str(r#"  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#);
    out.push('\n');
    out.push_str(r#"  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#);
    out.push('\n');
    if has_numbering {
        out.push_str(r#"  <Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>"#);
        out.push('\n');
    }
    out.push_str("</Types>");
    out
}

fn rels_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#
}

fn document_rels_xml(doc: &Document, has_numbering: bool) -> String {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    out.push('\n');
    out.push_str(r#"  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#);
    out.push('\n');
    if has_numbering {
        out.push_str(r#"  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>"#);
        out.push('\n');
    }
    for (href, rid) in doc.hyperlinks() {
        out.push_str(&format!(
            r#"  <Relationship Id="{rid}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="{href}" TargetMode="External"/>"#,
            rid = rid,
            href = xml_escape_text(href),
        ));
        out.push('\n');
    }
    for media in doc.media() {
        out.push_str(&format!(
            r#"  <Relationship Id="{rid}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/{name}"/>"#,
            rid = media.rel_id,
            name = media.file_name,
        ));
        out.push('\n');
    }
    out.push_str("</Relationships>");
    out
}

fn heading_style_xml(level: usize, before: u32, after: u32) -> String {
    format!(
        r#"  <w:style w:type="paragraph" w:styleId="Heading{n}">
    <w:name w:val="heading {n}"/>
    <w:basedOn w:val="Normal"/>
    <w:next w:val="Normal"/>
    <w:uiPriority w:val="9"/>
    <w:qFormat/>
    <w:pPr>
      <w:keepNext/>
      <w:spacing w:before="{before}" w:after="{after}"/>
      <w:outlineLvl w:val="{lvl}"/>
    </w:pPr>
  </w:style>
"#,
        n = level + 1,
        lvl = level,
        before = before,
        after = after,
    )
}

fn list_style_xml(id: &str, name: &str) -> String {
    format!(
        r#"  <w:style w:type="paragraph" w:styleId="{id}">
    <w:name w:val="{name}"/>
    <w:basedOn w:val="Normal"/>
    <w:uiPriority w:val="99"/>
    <w:qFormat/>
  </w:style>
"#
    )
}

fn styles_xml(s: &StyleDefaults) -> String {
    let font = xml_escape_text(&s.font);
    let mut out = String::new();
    out.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
    <w:name w:val="Normal"/>
    <w:qFormat/>
    <w:pPr>
      <w:spacing w:before="{before}" w:after="0" w:line="{line}" w:lineRule="auto"/>
    </w:pPr>
    <w:rPr>
      <w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/>
      <w:sz w:val="{size}"/>
      <w:szCs w:val="{size}"/>
    </w:rPr>
  </w:style>
"#,
        before = s.space_before,
        line = s.line,
        font = font,
        size = s.size,
    ));
    for (level, (before, after)) in s.headings.iter().enumerate() {
        out.push_str(&heading_style_xml(level, *before, *after));
    }
    out.push_str(&list_style_xml("ListBullet", "List Bullet"));
    out.push_str(&list_style_xml("ListNumber", "List Number"));
    out.push_str("</w:styles>");
    out
}

const BULLET_ABSTRACT: u32 = 1;
const DECIMAL_ABSTRACT: u32 = 2;

fn abstract_num_xml(id: u32, bullet: bool) -> String {
    let mut out = format!(
        "  <w:abstractNum w:abstractNumId=\"{id}\">\n    <w:multiLevelType w:val=\"hybridMultilevel\"/>\n"
    );
    for ilvl in 0..9u32 {
        let (fmt, text) = if bullet {
            ("bullet", "•".to_string())
        } else {
            ("decimal", format!("%{}.", ilvl + 1))
        };
        let left = 720 * (ilvl + 1);
        out.push_str(&format!(
            "    <w:lvl w:ilvl=\"{ilvl}\"><w:start w:val=\"1\"/><w:numFmt w:val=\"{fmt}\"/><w:lvlText w:val=\"{text}\"/><w:lvlJc w:val=\"left\"/><w:pPr><w:ind w:left=\"{left}\" w:hanging=\"360\"/></w:pPr></w:lvl>\n"
        ));
    }
    out.push_str("  </w:abstractNum>\n");
    out
}

fn numbering_xml(doc: &Document) -> String {
    let mut out = String::new();
    out.push_str(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
"#,
    );
    out.push_str(&abstract_num_xml(BULLET_ABSTRACT, true));
    out.push_str(&abstract_num_xml(DECIMAL_ABSTRACT, false));
    for n in doc.numbering() {
        if n.ordered {
            out.push_str(&format!(
                "  <w:num w:numId=\"{}\"><w:abstractNumId w:val=\"{DECIMAL_ABSTRACT}\"/><w:lvlOverride w:ilvl=\"{}\"><w:startOverride w:val=\"{}\"/></w:lvlOverride></w:num>\n",
                n.num_id, n.level, n.start
            ));
        } else {
            out.push_str(&format!(
                "  <w:num w:numId=\"{}\"><w:abstractNumId w:val=\"{BULLET_ABSTRACT}\"/></w:num>\n",
                n.num_id
            ));
        }
    }
    out.push_str("</w:numbering>");
    out
}

/// Writes the complete package into `writer` and hands it back.
pub fn write_package<W: Write + Seek>(writer: W, doc: &Document) -> Result<W> {
    let has_numbering = doc.uses_numbering();
    let has_media = !doc.media().is_empty();
    let mut zip = ZipWriter::new(writer);
    let opts = SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", opts)?;
    zip.write_all(content_types_xml(has_numbering, has_media).as_bytes())?;

    zip.start_file("_rels/.rels", opts)?;
    zip.write_all(rels_xml().as_bytes())?;

    zip.start_file("word/document.xml", opts)?;
    zip.write_all(document_xml(doc).as_bytes())?;

    zip.start_file("word/styles.xml", opts)?;
    zip.write_all(styles_xml(&doc.styles).as_bytes())?;

    if has_numbering {
        zip.start_file("word/numbering.xml", opts)?;
        zip.write_all(numbering_xml(doc).as_bytes())?;
    }

    for media in doc.media() {
        zip.start_file(format!("word/media/{}", media.file_name), opts)?;
        zip.write_all(&media.bytes)?;
    }

    zip.start_file("word/_rels/document.xml.rels", opts)?;
    zip.write_all(document_rels_xml(doc, has_numbering).as_bytes())?;

    Ok(zip.finish()?)
}

pub fn write_docx(out_path: &Path, doc: &Document) -> Result<()> {
    let f = File::create(out_path).with_context(|| format!("create {}", out_path.display()))?;
    let f = write_package(f, doc).with_context(|| format!("write {}", out_path.display()))?;
    if let Ok(meta) = f.metadata() {
        log::info!("wrote {} bytes to {}", meta.len(), out_path.display());
    }
    Ok(())
}

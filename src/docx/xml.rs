//! WordprocessingML serialization of the document body.

use super::{
    Block, Border, Cell, Document, Inline, Justification, Paragraph, ParagraphBorders, Picture,
    Run, RunItem, Section, Table,
};

pub(crate) fn xml_escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn border_xml(tag: &str, b: &Border) -> String {
    format!(
        "<w:{tag} w:val=\"{}\" w:sz=\"{}\" w:space=\"{}\" w:color=\"{}\"/>",
        b.line, b.size, b.space, b.color
    )
}

fn jc_val(j: Justification) -> &'static str {
    match j {
        Justification::Left => "left",
        Justification::Center => "center",
        Justification::Right => "right",
        Justification::Both => "both",
    }
}

fn paragraph_borders_xml(b: &ParagraphBorders) -> String {
    let mut out = String::new();
    for (tag, side) in [("top", &b.top), ("left", &b.left), ("bottom", &b.bottom), ("right", &b.right)] {
        if let Some(side) = side {
            out.push_str(&border_xml(tag, side));
        }
    }
    if out.is_empty() {
        return out;
    }
    format!("<w:pBdr>{out}</w:pBdr>")
}

fn picture_xml(p: &Picture) -> String {
    let name = xml_escape_text(&p.name);
    let descr = xml_escape_text(&p.description);
    format!(
        concat!(
            "<w:drawing><wp:inline distT=\"0\" distB=\"0\" distL=\"0\" distR=\"0\">",
            "<wp:extent cx=\"{cx}\" cy=\"{cy}\"/>",
            "<wp:docPr id=\"{id}\" name=\"{name}\" descr=\"{descr}\"/>",
            "<wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" noChangeAspect=\"1\"/></wp:cNvGraphicFramePr>",
            "<a:graphic xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\">",
            "<a:graphicData uri=\"http://schemas.openxmlformats.org/drawingml/2006/picture\">",
            "<pic:pic xmlns:pic=\"http://schemas.openxmlformats.org/drawingml/2006/picture\">",
            "<pic:nvPicPr><pic:cNvPr id=\"{id}\" name=\"{name}\"/><pic:cNvPicPr/></pic:nvPicPr>",
            "<pic:blipFill><a:blip r:embed=\"{rid}\"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>",
            "<pic:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>",
            "<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></pic:spPr>",
            "</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing>"
        ),
        cx = p.width,
        cy = p.height,
        id = p.id,
        name = name,
        descr = descr,
        rid = p.rel_id,
    )
}

fn run_xml(run: &Run) -> String {
    if run.items.is_empty() {
        return String::new();
    }
    let props = &run.props;
    let mut out = String::new();
    out.push_str("<w:r>");
    let mut rpr = String::new();
    if let Some(font) = &props.font {
        let font = xml_escape_text(font);
        rpr.push_str(&format!(
            "<w:rFonts w:ascii=\"{font}\" w:hAnsi=\"{font}\" w:cs=\"{font}\"/>"
        ));
    }
    if props.bold {
        rpr.push_str("<w:b/>");
    }
    if props.italic {
        rpr.push_str("<w:i/>");
    }
    if let Some(color) = &props.color {
        rpr.push_str(&format!("<w:color w:val=\"{color}\"/>"));
    }
    if let Some(sz) = props.size {
        rpr.push_str(&format!("<w:sz w:val=\"{sz}\"/><w:szCs w:val=\"{sz}\"/>"));
    }
    if props.underline {
        rpr.push_str("<w:u w:val=\"single\"/>");
    }
    if !rpr.is_empty() {
        out.push_str("<w:rPr>");
        out.push_str(&rpr);
        out.push_str("</w:rPr>");
    }
    for item in &run.items {
        match item {
            RunItem::Text(t) => {
                out.push_str("<w:t xml:space=\"preserve\">");
                out.push_str(&xml_escape_text(t));
                out.push_str("</w:t>");
            }
            RunItem::Break => out.push_str("<w:br/>"),
            RunItem::Tab => out.push_str("<w:tab/>"),
            RunItem::Picture(p) => out.push_str(&picture_xml(p)),
        }
    }
    out.push_str("</w:r>");
    out
}

pub fn paragraph_xml(p: &Paragraph) -> String {
    let props = &p.props;
    let mut ppr = String::new();
    if let Some(style) = &props.style {
        ppr.push_str(&format!("<w:pStyle w:val=\"{}\"/>", xml_escape_text(style)));
    }
    if let Some(num) = props.numbering {
        ppr.push_str("<w:numPr>");
        ppr.push_str(&format!("<w:ilvl w:val=\"{}\"/>", num.ilvl));
        ppr.push_str(&format!("<w:numId w:val=\"{}\"/>", num.num_id));
        ppr.push_str("</w:numPr>");
    }
    if let Some(b) = &props.borders {
        ppr.push_str(&paragraph_borders_xml(b));
    }
    if let Some(s) = props.spacing {
        ppr.push_str("<w:spacing");
        if let Some(before) = s.before {
            ppr.push_str(&format!(" w:before=\"{before}\""));
        }
        if let Some(after) = s.after {
            ppr.push_str(&format!(" w:after=\"{after}\""));
        }
        ppr.push_str("/>");
    }
    if let Some(j) = props.justification {
        ppr.push_str(&format!("<w:jc w:val=\"{}\"/>", jc_val(j)));
    }

    let mut out = String::new();
    out.push_str("<w:p>");
    if !ppr.is_empty() {
        out.push_str("<w:pPr>");
        out.push_str(&ppr);
        out.push_str("</w:pPr>");
    }
    for inline in &p.content {
        match inline {
            Inline::Run(r) => out.push_str(&run_xml(r)),
            Inline::Hyperlink { rel_id, runs } => {
                out.push_str(&format!("<w:hyperlink r:id=\"{rel_id}\" w:history=\"1\">"));
                for r in runs {
                    out.push_str(&run_xml(r));
                }
                out.push_str("</w:hyperlink>");
            }
        }
    }
    out.push_str("</w:p>");
    out
}

fn cell_xml(cell: &Cell) -> String {
    let props = &cell.props;
    let mut out = String::new();
    out.push_str("<w:tc><w:tcPr>");
    match props.width {
        Some(w) => out.push_str(&format!("<w:tcW w:w=\"{w}\" w:type=\"dxa\"/>")),
        None => out.push_str("<w:tcW w:w=\"0\" w:type=\"auto\"/>"),
    }
    if props.grid_span > 1 {
        out.push_str(&format!("<w:gridSpan w:val=\"{}\"/>", props.grid_span));
    }
    if props.borders.top.is_some() || props.borders.bottom.is_some() {
        out.push_str("<w:tcBorders>");
        if let Some(b) = &props.borders.top {
            out.push_str(&border_xml("top", b));
        }
        if let Some(b) = &props.borders.bottom {
            out.push_str(&border_xml("bottom", b));
        }
        out.push_str("</w:tcBorders>");
    }
    if let Some(fill) = &props.shading {
        out.push_str(&format!(
            "<w:shd w:val=\"clear\" w:color=\"auto\" w:fill=\"{fill}\"/>"
        ));
    }
    out.push_str("</w:tcPr>");
    for p in &cell.paragraphs {
        out.push_str(&paragraph_xml(p));
    }
    out.push_str("</w:tc>");
    out
}

pub fn table_xml(t: &Table) -> String {
    let mut out = String::new();
    out.push_str("<w:tbl>");
    out.push_str("<w:tblPr>");
    out.push_str("<w:tblW w:w=\"0\" w:type=\"auto\"/>");
    if t.collapsed {
        out.push_str("<w:tblBorders>");
        for side in ["top", "left", "bottom", "right", "insideH", "insideV"] {
            out.push_str(&format!(
                "<w:{side} w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"D9D9D9\"/>"
            ));
        }
        out.push_str("</w:tblBorders>");
    }
    out.push_str(if t.autofit {
        "<w:tblLayout w:type=\"autofit\"/>"
    } else {
        "<w:tblLayout w:type=\"fixed\"/>"
    });
    out.push_str("</w:tblPr>");

    out.push_str("<w:tblGrid>");
    for col in &t.columns {
        match col {
            Some(w) => out.push_str(&format!("<w:gridCol w:w=\"{w}\"/>")),
            None => out.push_str("<w:gridCol/>"),
        }
    }
    out.push_str("</w:tblGrid>");

    for row in &t.rows {
        out.push_str("<w:tr>");
        for cell in &row.cells {
            out.push_str(&cell_xml(cell));
        }
        out.push_str("</w:tr>");
    }
    out.push_str("</w:tbl>");
    out
}

fn section_xml(s: &Section) -> String {
    format!(
        r#"<w:sectPr>
      <w:pgSz w:w="{w}" w:h="{h}"/>
      <w:pgMar w:top="{top}" w:right="{right}" w:bottom="{bottom}" w:left="{left}" w:header="708" w:footer="708" w:gutter="0"/>
      <w:cols w:space="708"/>
      <w:docGrid w:linePitch="360"/>
    </w:sectPr>"#,
        w = s.width,
        h = s.height,
        top = s.top,
        right = s.right,
        bottom = s.bottom,
        left = s.left,
    )
}

pub fn document_xml(doc: &Document) -> String {
    let mut body = String::new();
    for b in &doc.blocks {
        match b {
            Block::Paragraph(p) => body.push_str(&paragraph_xml(p)),
            Block::Table(t) => body.push_str(&table_xml(t)),
        }
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:wpc="http://schemas.microsoft.com/office/word/2010/wordprocessingCanvas"
 xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006"
 xmlns:o="urn:schemas-microsoft-com:office:office"
 xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
 xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math"
 xmlns:v="urn:schemas-microsoft-com:vml"
 xmlns:wp14="http://schemas.microsoft.com/office/word/2010/wordprocessingDrawing"
 xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing"
 xmlns:w10="urn:schemas-microsoft-com:office:word"
 xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
 xmlns:w14="http://schemas.microsoft.com/office/word/2010/wordprocessingml"
 xmlns:w15="http://schemas.microsoft.com/office/word/2012/wordprocessingml"
 xmlns:wpg="http://schemas.microsoft.com/office/word/2010/wordprocessingGroup"
 xmlns:wpi="http://schemas.microsoft.com/office/word/2010/wordprocessingInk"
 xmlns:wne="http://schemas.microsoft.com/office/word/2006/wordml"
 xmlns:wps="http://schemas.microsoft.com/office/word/2010/wordprocessingShape"
 mc:Ignorable="w14 w15 wp14">
  <w:body>
    {body}
    {section}
  </w:body>
</w:document>"#,
        body = body,
        section = section_xml(&doc.section),
    )
}

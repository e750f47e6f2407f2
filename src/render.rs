//! Walks the annotated tree and builds the document.
//!
//! Block elements become paragraphs and tables; everything below a block is
//! rendered as runs into the paragraph it belongs to. Formatting comes from
//! each node's effective style, except bold and italic, which also follow the
//! `strong`/`em` elements currently on the traversal stack.

use crate::docx::{
    self, Block, Border, Document, Inline, Justification, Numbering, Paragraph, ParagraphBorders,
    ParagraphProps, Run, RunItem, RunProps, Spacing, Table, BULLET_NUM_ID,
};
use crate::dom::{Data, NodeId, Tree};
use crate::error::InputError;
use crate::picture;
use crate::style::{self, effective_style, Align, BorderSpec, Declaration, Property};
use crate::theme::HouseStyle;
use anyhow::{Context, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Heading(u8),
    Paragraph,
    Table,
    CodeBlock,
    List { ordered: bool },
    Hyperlink,
    Image,
    Break,
    Text,
    /// Inline formatting wrapper such as `strong` or `span`.
    Inline,
    /// Anything else: rendered through its children.
    Container,
}

impl NodeKind {
    fn of(tree: &Tree, id: NodeId) -> Self {
        let name = match tree.data(id) {
            Data::Root => return NodeKind::Container,
            Data::Text(_) => return NodeKind::Text,
            Data::Element { name, .. } => name.as_str(),
        };
        match name {
            "h1" => NodeKind::Heading(1),
            "h2" => NodeKind::Heading(2),
            "h3" => NodeKind::Heading(3),
            "h4" => NodeKind::Heading(4),
            "p" | "h5" | "h6" => NodeKind::Paragraph,
            "table" => NodeKind::Table,
            "pre" => NodeKind::CodeBlock,
            "ul" => NodeKind::List { ordered: false },
            "ol" => NodeKind::List { ordered: true },
            "a" => NodeKind::Hyperlink,
            "img" => NodeKind::Image,
            "br" => NodeKind::Break,
            "strong" | "b" | "em" | "i" | "code" | "span" | "u" | "s" | "del" | "ins" | "sub"
            | "sup" | "small" | "mark" | "kbd" | "abbr" | "cite" | "q" | "var" | "samp"
            | "label" | "font" => NodeKind::Inline,
            _ => NodeKind::Container,
        }
    }

    fn is_inline(self) -> bool {
        matches!(
            self,
            NodeKind::Hyperlink
                | NodeKind::Image
                | NodeKind::Break
                | NodeKind::Text
                | NodeKind::Inline
        )
    }
}

fn sanitize_href(href: &str) -> Option<String> {
    let h = href.trim();
    if h.is_empty() {
        return None;
    }
    let low = h.to_ascii_lowercase();
    if low.starts_with("javascript:") || low.starts_with("data:") || low.starts_with("vbscript:") {
        return None;
    }
    Some(h.to_string())
}

fn collapse_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_ws = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !in_ws {
                out.push(' ');
                in_ws = true;
            }
        } else {
            out.push(ch);
            in_ws = false;
        }
    }
    out
}

fn border(spec: BorderSpec, space: u32) -> Border {
    Border {
        line: spec.line,
        size: spec.eighths(),
        space,
        color: spec.color.hex(),
    }
}

fn style_border(style: &Declaration, p: Property) -> Option<BorderSpec> {
    let value = style.get(p)?;
    let spec = BorderSpec::parse(value);
    if spec.is_none() {
        log::debug!("ignoring {}: {value:?}", p.name());
    }
    spec
}

fn block_props(style: &Declaration) -> ParagraphProps {
    let mut props = ParagraphProps::default();
    if let Some(v) = style.get(Property::TextAlign) {
        props.justification = match Align::parse(v) {
            Some(Align::Left) => Some(Justification::Left),
            Some(Align::Center) => Some(Justification::Center),
            Some(Align::Right) => Some(Justification::Right),
            Some(Align::Justify) => Some(Justification::Both),
            None => {
                log::debug!("ignoring text-align: {v:?}");
                None
            }
        };
    }
    if let Some(spec) = style_border(style, Property::Border) {
        let side = || Some(border(spec, 4));
        props.borders = Some(ParagraphBorders {
            top: side(),
            left: side(),
            bottom: side(),
            right: side(),
        });
    }
    props
}

fn apply_cell_style(cell: &mut docx::Cell, style: &Declaration) {
    if let Some(v) = style.get(Property::BackgroundColor) {
        match style::color(v) {
            Some(rgb) => cell.props.shading = Some(rgb.hex()),
            None => log::debug!("ignoring background-color: {v:?}"),
        }
    }
    if let Some(spec) = style_border(style, Property::BorderTop) {
        cell.props.borders.top = Some(border(spec, 0));
    }
    if let Some(spec) = style_border(style, Property::BorderBottom) {
        cell.props.borders.bottom = Some(border(spec, 0));
    }
}

fn row_cells(tree: &Tree, tr: NodeId) -> Vec<NodeId> {
    tree.element_children(tr)
        .into_iter()
        .filter(|c| matches!(tree.name(*c), Some("th" | "td")))
        .collect()
}

struct Renderer<'a> {
    tree: &'a Tree,
    theme: &'a HouseStyle,
    base_dir: &'a Path,
    doc: Document,
    /// Blocks of the flow being filled: the body, or a table cell.
    out: Vec<Block>,
    /// Elements entered and not yet left.
    stack: Vec<NodeId>,
    list_depth: u32,
    /// Inside a code block: whitespace is kept as written.
    preserve_space: bool,
    /// Text leaf that loses one trailing newline.
    trim_leaf: Option<NodeId>,
}

/// Renders the annotated `tree` into a new document laid out per `theme`.
/// Relative image sources are read from `base_dir`.
pub fn render(tree: &Tree, theme: &HouseStyle, base_dir: &Path) -> Result<Document> {
    let mut r = Renderer {
        tree,
        theme,
        base_dir,
        doc: Document::new(theme),
        out: Vec::new(),
        stack: Vec::new(),
        list_depth: 0,
        preserve_space: false,
        trim_leaf: None,
    };
    r.render_node(tree.root())?;
    let mut doc = r.doc;
    doc.blocks = r.out;
    log::info!(
        "rendered {} blocks ({} hyperlinks, {} pictures)",
        doc.blocks.len(),
        doc.hyperlinks().len(),
        doc.media().len()
    );
    Ok(doc)
}

impl Renderer<'_> {
    fn render_node(&mut self, id: NodeId) -> Result<()> {
        let kind = NodeKind::of(self.tree, id);
        if kind.is_inline() {
            let mut p = self.anonymous_paragraph(self.tree.parent(id).unwrap_or(id));
            self.render_inline(id, &mut p)?;
            self.flush(p);
            return Ok(());
        }

        self.stack.push(id);
        let result = match kind {
            NodeKind::Heading(level) => self.render_heading(id, level),
            NodeKind::Paragraph => self.render_paragraph(id),
            NodeKind::Table => self.render_table(id),
            NodeKind::CodeBlock => self.render_code(id),
            NodeKind::List { ordered } => self.render_list(id, ordered),
            NodeKind::Container => self.render_flow(id),
            NodeKind::Hyperlink
            | NodeKind::Image
            | NodeKind::Break
            | NodeKind::Text
            | NodeKind::Inline => Ok(()),
        };
        self.stack.pop();
        result
    }

    /// Renders the children of `owner`: block children on their own, runs of
    /// inline children gathered into paragraphs styled after `owner`.
    fn render_flow(&mut self, owner: NodeId) -> Result<()> {
        let tree = self.tree;
        let mut pending: Option<Paragraph> = None;
        for &child in tree.children(owner) {
            if NodeKind::of(tree, child).is_inline() {
                if pending.is_none() {
                    pending = Some(self.anonymous_paragraph(owner));
                }
                if let Some(p) = pending.as_mut() {
                    self.render_inline(child, p)?;
                }
                continue;
            }
            if let Some(p) = pending.take() {
                self.flush(p);
            }
            self.render_node(child)?;
        }
        if let Some(p) = pending.take() {
            self.flush(p);
        }
        Ok(())
    }

    fn anonymous_paragraph(&self, owner: NodeId) -> Paragraph {
        Paragraph {
            props: block_props(&effective_style(self.tree, owner)),
            content: Vec::new(),
        }
    }

    /// Keeps `p` if it has anything visible in it.
    fn flush(&mut self, mut p: Paragraph) {
        p.trim_trailing_whitespace();
        if p.has_visible_content() {
            self.out.push(Block::Paragraph(p));
        }
    }

    fn render_heading(&mut self, id: NodeId, level: u8) -> Result<()> {
        let mut p = Paragraph {
            props: block_props(&effective_style(self.tree, id)),
            content: Vec::new(),
        };
        p.props.style = Some(format!("Heading{level}"));
        self.render_children_inline(id, &mut p)?;
        p.trim_trailing_whitespace();
        let spacing = self.theme.heading_spacing(level);
        p.props.spacing = Some(Spacing {
            before: Some(docx::twips(spacing.before_pt)),
            after: Some(docx::twips(spacing.after_pt)),
        });
        self.out.push(Block::Paragraph(p));
        Ok(())
    }

    /// A paragraph's pictures are placed first, then its remaining content.
    fn render_paragraph(&mut self, id: NodeId) -> Result<()> {
        let mut p = Paragraph {
            props: block_props(&effective_style(self.tree, id)),
            content: Vec::new(),
        };
        let images: Vec<NodeId> = self
            .tree
            .children(id)
            .iter()
            .copied()
            .filter(|c| self.tree.is(*c, "img"))
            .collect();
        for &img in &images {
            let run = self.picture_run(img)?;
            p.add_run(run);
        }
        let tree = self.tree;
        for &child in tree.children(id) {
            if images.contains(&child) {
                continue;
            }
            self.render_inline(child, &mut p)?;
        }
        self.flush(p);
        Ok(())
    }

    fn render_code(&mut self, pre: NodeId) -> Result<()> {
        let Some(code) = self.tree.descendants_named(pre, "code").into_iter().next() else {
            return Err(InputError::PreWithoutCode)
                .with_context(|| format!("code block in {}", self.tree.describe_location(pre)));
        };
        let mut p = Paragraph {
            props: block_props(&effective_style(self.tree, code)),
            content: Vec::new(),
        };

        self.preserve_space = true;
        self.trim_leaf = self.tree.last_text_descendant(code);
        self.stack.push(code);
        let result = self.render_children_inline(code, &mut p);
        self.stack.pop();
        self.preserve_space = false;
        self.trim_leaf = None;
        result?;

        self.out.push(Block::Paragraph(p));
        Ok(())
    }

    fn render_list(&mut self, id: NodeId, ordered: bool) -> Result<()> {
        let num_id = if ordered {
            let start = self
                .tree
                .attr(id, "start")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(1);
            self.doc.add_ordered_list(start, self.list_depth)
        } else {
            BULLET_NUM_ID
        };
        let style = if ordered { "ListNumber" } else { "ListBullet" };
        let numbering = Numbering {
            num_id,
            ilvl: self.list_depth,
        };

        self.list_depth += 1;
        let result = self.render_items(id, style, numbering);
        self.list_depth -= 1;
        result
    }

    fn render_items(&mut self, list: NodeId, style: &str, numbering: Numbering) -> Result<()> {
        for li in self.tree.element_children(list) {
            if !self.tree.is(li, "li") {
                continue;
            }
            let first = self.out.len();
            self.stack.push(li);
            let result = self.render_flow(li);
            self.stack.pop();
            result?;

            // The item's first paragraph carries the marker.
            match self.out.get_mut(first) {
                Some(Block::Paragraph(p))
                    if p.props.style.is_none() && p.props.numbering.is_none() =>
                {
                    p.props.style = Some(style.to_string());
                    p.props.numbering = Some(numbering);
                }
                _ => {
                    let mut p = Paragraph::with_style(style);
                    p.props.numbering = Some(numbering);
                    self.out.insert(first, Block::Paragraph(p));
                }
            }
        }
        Ok(())
    }

    fn render_table(&mut self, id: NodeId) -> Result<()> {
        let tree = self.tree;
        let rows: Vec<NodeId> = tree
            .descendants_named(id, "tr")
            .into_iter()
            .filter(|tr| tree.ancestors(*tr).into_iter().find(|a| tree.is(*a, "table")) == Some(id))
            .collect();
        let cells: Vec<Vec<NodeId>> = rows.iter().map(|tr| row_cells(tree, *tr)).collect();
        let cols = cells.iter().map(Vec::len).max().unwrap_or(0);
        if cols == 0 {
            log::debug!("skipping empty table in {}", tree.describe_location(id));
            return Ok(());
        }
        for (r, row) in cells.iter().enumerate() {
            if row.len() < cols {
                return Err(InputError::RaggedTable {
                    row: r + 1,
                    found: row.len(),
                    expected: cols,
                })
                .with_context(|| format!("table in {}", tree.describe_location(id)));
            }
        }

        let mut table = Table::new(rows.len(), cols);
        let style = effective_style(tree, id);
        if style.get(Property::BorderCollapse) == Some("collapse") {
            table.collapsed = true;
            table.autofit = true;
        }

        for (r, row) in cells.iter().enumerate() {
            self.stack.push(rows[r]);
            for (c, &cell_id) in row.iter().enumerate() {
                let paragraphs = self.render_cell(cell_id)?;
                let cell = table.cell_mut(r, c);
                if !paragraphs.is_empty() {
                    cell.paragraphs = paragraphs;
                }
                apply_cell_style(cell, &effective_style(tree, cell_id));
            }
            self.stack.pop();
        }

        // One sample per column: the first body cell in that position.
        for c in 0..cols {
            let sample = cells
                .iter()
                .find_map(|row| row.get(c).copied().filter(|n| tree.is(*n, "td")));
            let width = sample.and_then(|n| {
                effective_style(tree, n)
                    .get(Property::Width)
                    .and_then(style::points)
            });
            if let Some(w) = width {
                table.set_column_width(c, docx::twips(w));
            }
        }

        if tree.has_class(id, "reqres") && tree.first_child_named(id, "thead").is_some() {
            table.merge_row(0);
            table.cell_mut(0, 0).strip_blank_runs();
        }

        self.out.push(Block::Table(table));
        Ok(())
    }

    fn render_cell(&mut self, cell: NodeId) -> Result<Vec<Paragraph>> {
        let outer = std::mem::take(&mut self.out);
        self.stack.push(cell);
        let result = self.render_flow(cell);
        self.stack.pop();
        let blocks = std::mem::replace(&mut self.out, outer);
        result?;

        let mut paragraphs = Vec::with_capacity(blocks.len());
        for b in blocks {
            match b {
                Block::Paragraph(p) => paragraphs.push(p),
                Block::Table(_) => log::warn!(
                    "dropping table nested in a cell in {}",
                    self.tree.describe_location(cell)
                ),
            }
        }
        Ok(paragraphs)
    }

    fn render_children_inline(&mut self, id: NodeId, p: &mut Paragraph) -> Result<()> {
        let tree = self.tree;
        for &child in tree.children(id) {
            self.render_inline(child, p)?;
        }
        Ok(())
    }

    fn render_inline(&mut self, id: NodeId, p: &mut Paragraph) -> Result<()> {
        match NodeKind::of(self.tree, id) {
            NodeKind::Text => {
                self.emit_text(id, p);
                Ok(())
            }
            NodeKind::Break => {
                p.add_run(Run {
                    props: self.run_props(id),
                    items: vec![RunItem::Break],
                });
                Ok(())
            }
            NodeKind::Image => {
                let run = self.picture_run(id)?;
                p.add_run(run);
                Ok(())
            }
            NodeKind::Hyperlink => {
                let href = self.tree.attr(id, "href").and_then(sanitize_href);
                let start = p.content.len();
                self.stack.push(id);
                let result = self.render_children_inline(id, p);
                self.stack.pop();
                result?;
                if let Some(href) = href {
                    let runs: Vec<Run> = p
                        .content
                        .drain(start..)
                        .flat_map(|i| match i {
                            Inline::Run(r) => vec![r],
                            Inline::Hyperlink { runs, .. } => runs,
                        })
                        .collect();
                    if !runs.is_empty() {
                        let rel_id = self.doc.add_hyperlink(&href);
                        p.content.push(Inline::Hyperlink { rel_id, runs });
                    }
                }
                Ok(())
            }
            // Block content met inside a paragraph contributes its runs.
            NodeKind::Inline
            | NodeKind::Container
            | NodeKind::Heading(_)
            | NodeKind::Paragraph
            | NodeKind::Table
            | NodeKind::CodeBlock
            | NodeKind::List { .. } => {
                self.stack.push(id);
                let result = self.render_children_inline(id, p);
                self.stack.pop();
                result
            }
        }
    }

    fn emit_text(&mut self, id: NodeId, p: &mut Paragraph) {
        let raw = self.tree.text(id).unwrap_or_default();
        let mut text = if self.preserve_space {
            raw.replace("\r\n", "\n")
        } else {
            collapse_ws(raw)
        };
        if self.trim_leaf == Some(id) && text.ends_with('\n') {
            text.pop();
        }
        if !self.preserve_space && p.ends_with_space() {
            text = text.trim_start().to_string();
        }
        if text.is_empty() {
            return;
        }
        let mut run = Run {
            props: self.run_props(id),
            items: Vec::new(),
        };
        run.push_text(&text);
        p.add_run(run);
    }

    /// Run formatting from the node's effective style, with bold and italic
    /// also switched on by enclosing `strong`/`b` and `em`/`i` elements.
    fn run_props(&self, id: NodeId) -> RunProps {
        let style = effective_style(self.tree, id);
        let mut props = RunProps::default();
        if let Some(font) = style.get(Property::FontFamily) {
            props.font = Some(font.trim().trim_matches(|c| c == '"' || c == '\'').to_string());
        }
        if let Some(v) = style.get(Property::FontSize) {
            match style::points(v) {
                Some(pt) => props.size = Some((pt * 2.0).round() as u32),
                None => log::debug!("ignoring font-size: {v:?}"),
            }
        }
        if let Some(v) = style.get(Property::FontWeight) {
            props.bold = style::is_bold(v).unwrap_or(false);
        }
        if let Some(v) = style.get(Property::Color) {
            match style::color(v) {
                Some(rgb) => props.color = Some(rgb.hex()),
                None => log::debug!("ignoring color: {v:?}"),
            }
        }
        if let Some(v) = style.get(Property::TextDecorationLine) {
            props.underline = v.split_whitespace().any(|t| t == "underline");
        }

        let on_stack = |names: &[&str]| {
            self.stack
                .iter()
                .any(|n| self.tree.name(*n).is_some_and(|name| names.contains(&name)))
        };
        props.bold |= on_stack(&["strong", "b"]);
        props.italic |= on_stack(&["em", "i"]);
        props
    }

    fn picture_run(&mut self, img: NodeId) -> Result<Run> {
        let tree = self.tree;
        let location = || format!("image in {}", tree.describe_location(img));
        let path = picture::resolve(self.base_dir, tree.attr(img, "src")).with_context(location)?;
        let style = effective_style(tree, img);
        let framed = style_border(&style, Property::Border);
        let pic = picture::load(&path, framed).with_context(location)?;
        let width = style.get(Property::Width).and_then(style::points);
        let (cx, cy) = pic.extent(width);
        let (rel_id, pic_id) = self.doc.add_image(pic.png);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("Picture {pic_id}"));
        Ok(Run {
            props: RunProps::default(),
            items: vec![RunItem::Picture(docx::Picture {
                rel_id,
                id: pic_id,
                name,
                description: tree.attr(img, "alt").unwrap_or_default().to_string(),
                width: cx,
                height: cy,
            })],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::annotate;
    use crate::highlight::Passthrough;
    use image::{Rgba, RgbaImage};

    fn rendered(html: &str) -> Document {
        rendered_in(html, Path::new("."))
    }

    fn rendered_in(html: &str, base_dir: &Path) -> Document {
        let mut tree = Tree::parse(html);
        annotate(&mut tree, &HouseStyle::default(), &Passthrough).unwrap();
        render(&tree, &HouseStyle::default(), base_dir).unwrap()
    }

    fn render_err(html: &str) -> anyhow::Error {
        let mut tree = Tree::parse(html);
        annotate(&mut tree, &HouseStyle::default(), &Passthrough).unwrap();
        render(&tree, &HouseStyle::default(), Path::new(".")).unwrap_err()
    }

    fn paragraphs(doc: &Document) -> Vec<&Paragraph> {
        doc.paragraphs().collect()
    }

    fn breaks(p: &Paragraph) -> usize {
        p.runs()
            .flat_map(|r| r.items.iter())
            .filter(|i| matches!(i, RunItem::Break))
            .count()
    }

    #[test]
    fn heading_then_paragraph() {
        let doc = rendered("<h1>Title</h1>\n<p>Body   text\n</p>");
        let ps = paragraphs(&doc);
        assert_eq!(ps.len(), 2);
        assert_eq!(ps[0].props.style.as_deref(), Some("Heading1"));
        assert_eq!(ps[0].text(), "Title");
        assert_eq!(
            ps[0].props.spacing,
            Some(Spacing { before: Some(400), after: Some(120) })
        );
        let title = ps[0].runs().next().unwrap();
        assert!(title.props.bold);
        assert_eq!(title.props.size, Some(40));
        assert_eq!(title.props.color.as_deref(), Some("666666"));
        assert_eq!(ps[1].props.style, None);
        assert_eq!(ps[1].text(), "Body text");
        assert_eq!(ps[1].props.justification, Some(Justification::Both));
        let body = ps[1].runs().next().unwrap();
        assert_eq!(body.props.font.as_deref(), Some("Calibri"));
        assert_eq!(body.props.size, Some(22));
    }

    #[test]
    fn strong_and_em_switch_on_bold_and_italic() {
        let doc = rendered("<p>a <strong>b <em>c</em></strong> d</p>");
        let p = paragraphs(&doc)[0];
        let runs: Vec<&Run> = p.runs().collect();
        let flags: Vec<(String, bool, bool)> = runs
            .iter()
            .map(|r| (r.text(), r.props.bold, r.props.italic))
            .collect();
        assert_eq!(
            flags,
            vec![
                ("a ".to_string(), false, false),
                ("b ".to_string(), true, false),
                ("c".to_string(), true, true),
                (" d".to_string(), false, false),
            ]
        );
    }

    #[test]
    fn blank_header_leaves_no_header_row() {
        let doc = rendered(
            "<table><thead><tr><th> </th><th></th></tr></thead>\
             <tbody><tr><td>a</td><td>b</td></tr></tbody></table>",
        );
        let t = doc.tables().next().unwrap();
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.cell(0, 0).text(), "a");
        assert!(t.collapsed);
        assert!(t.autofit);
    }

    #[test]
    fn banded_table_has_colored_header_and_zebra_rows() {
        let doc = rendered(
            "<p>intro</p><table><thead><tr><th>k</th><th>v</th></tr></thead>\
             <tbody><tr><td>1</td><td>2</td></tr><tr><td>3</td><td>4</td></tr></tbody></table>",
        );
        let t = doc.tables().next().unwrap();
        assert_eq!(t.rows.len(), 3);
        assert_eq!(t.cell(0, 0).props.shading.as_deref(), Some("057D9F"));
        let head = t.cell(0, 0).paragraphs[0].runs().next().unwrap();
        assert_eq!(head.props.color.as_deref(), Some("FFFFFF"));
        assert_eq!(t.cell(1, 0).props.shading, None);
        assert_eq!(t.cell(2, 1).props.shading.as_deref(), Some("EFEFEF"));
    }

    #[test]
    fn ragged_row_is_a_structural_error() {
        let err = render_err(
            "<h2>Info</h2><table><thead><tr><th>a</th><th>b</th></tr></thead>\
             <tbody><tr><td>1</td></tr></tbody></table>",
        );
        assert_eq!(
            err.downcast_ref::<InputError>(),
            Some(&InputError::RaggedTable {
                row: 2,
                found: 1,
                expected: 2
            })
        );
        assert!(format!("{err:#}").contains("section \"Info\""));
    }

    #[test]
    fn unusable_style_values_apply_nothing() {
        let doc = rendered(
            "<div style=\"text-align: middle; color: chartreuse-ish; \
             border: 4294967295px solid #000\">text</div>",
        );
        let p = paragraphs(&doc)[0];
        assert_eq!(p.text(), "text");
        assert_eq!(p.props.justification, None);
        assert!(p.props.borders.is_none());
        assert_eq!(p.runs().next().unwrap().props.color, None);

        let xml = docx::document_xml(&doc);
        assert!(!xml.contains("<w:pBdr>"));
        assert!(!xml.contains("<w:jc "));
        assert!(!xml.contains("<w:color "));
    }

    #[test]
    fn summary_table_columns_take_sampled_widths() {
        let doc = rendered(
            "<h2>Summary</h2><table><tbody>\
             <tr><td>Risk</td><td>High</td></tr>\
             <tr><td>Impact</td><td>Wide</td></tr></tbody></table>",
        );
        let t = doc.tables().next().unwrap();
        assert_eq!(t.columns, vec![Some(1650), Some(7350)]);
        assert_eq!(t.cell(1, 1).props.width, Some(7350));
        let top = t.cell(0, 1).props.borders.top.as_ref().unwrap();
        assert_eq!((top.size, top.space, top.color.as_str()), (12, 0, "057D9F"));
        assert!(t.cell(1, 0).props.borders.top.is_none());
        assert_eq!(t.cell(0, 0).props.shading.as_deref(), Some("057D9F"));
        assert_eq!(
            t.cell(0, 0).paragraphs[0].props.justification,
            Some(Justification::Right)
        );
    }

    #[test]
    fn code_block_loses_exactly_one_trailing_newline() {
        let doc = rendered("<pre><code class=\"language-text\">a\nb\n</code></pre>");
        let p = paragraphs(&doc)[0];
        assert_eq!(p.text(), "a\nb");
        assert_eq!(breaks(p), 1);

        let doc = rendered("<pre><code>a\n\n</code></pre>");
        let p = paragraphs(&doc)[0];
        assert_eq!(p.text(), "a\n");
        assert_eq!(breaks(p), 1);
    }

    #[test]
    fn code_block_is_mono_and_framed() {
        let doc = rendered("<pre><code>x  =\t1\n</code></pre>");
        let p = paragraphs(&doc)[0];
        assert_eq!(p.props.justification, Some(Justification::Left));
        let borders = p.props.borders.as_ref().unwrap();
        let left = borders.left.as_ref().unwrap();
        assert_eq!((left.size, left.space, left.color.as_str()), (2, 4, "000000"));
        let run = p.runs().next().unwrap();
        assert_eq!(run.props.font.as_deref(), Some("Roboto Mono"));
        assert_eq!(run.props.size, Some(18));
        assert!(run.items.contains(&RunItem::Tab));
        assert_eq!(p.text(), "x  =\t1");
    }

    #[test]
    fn pre_without_code_is_an_input_error() {
        let err = render_err("<pre>plain</pre>");
        assert_eq!(
            err.downcast_ref::<InputError>(),
            Some(&InputError::PreWithoutCode)
        );
    }

    #[test]
    fn hyperlinks_wrap_their_runs() {
        let doc = rendered(
            "<p>see <a href=\"https://a.test\">the <em>docs</em></a> and \
             <a href=\"https://a.test\">again</a> or <a href=\"javascript:x()\">this</a></p>",
        );
        let p = paragraphs(&doc)[0];
        let links: Vec<(&str, usize)> = p
            .content
            .iter()
            .filter_map(|i| match i {
                Inline::Hyperlink { rel_id, runs } => Some((rel_id.as_str(), runs.len())),
                Inline::Run(_) => None,
            })
            .collect();
        assert_eq!(links, vec![("rId10", 2), ("rId10", 1)]);
        assert_eq!(doc.hyperlinks().len(), 1);
        assert_eq!(p.text(), "see the docs and again or this");
        let Inline::Hyperlink { runs, .. } = &p.content[1] else {
            panic!("expected a hyperlink");
        };
        assert!(runs[0].props.underline);
        assert_eq!(runs[0].props.color.as_deref(), Some("1155CC"));
        assert!(runs[1].props.italic);
    }

    #[test]
    fn lists_get_named_styles_and_levels() {
        let doc = rendered(
            "<ul><li>one<ul><li>inner</li></ul></li><li>two</li></ul>\
             <ol start=\"3\"><li><p>three</p></li></ol><ol><li>again</li></ol>",
        );
        let ps = paragraphs(&doc);
        let shape: Vec<(String, Option<&str>, Option<u32>)> = ps
            .iter()
            .map(|p| {
                (
                    p.text(),
                    p.props.style.as_deref(),
                    p.props.numbering.map(|n| n.ilvl),
                )
            })
            .collect();
        assert_eq!(
            shape,
            vec![
                ("one".to_string(), Some("ListBullet"), Some(0)),
                ("inner".to_string(), Some("ListBullet"), Some(1)),
                ("two".to_string(), Some("ListBullet"), Some(0)),
                ("three".to_string(), Some("ListNumber"), Some(0)),
                ("again".to_string(), Some("ListNumber"), Some(0)),
            ]
        );
        let three = ps[3].props.numbering.unwrap().num_id;
        let again = ps[4].props.numbering.unwrap().num_id;
        assert_ne!(three, again);
        let restart = doc.numbering().iter().find(|n| n.num_id == three).unwrap();
        assert_eq!(restart.start, 3);
        assert_eq!(restart.level, 0);
        assert!(doc.uses_numbering());
    }

    #[test]
    fn nested_ordered_list_counts_at_its_own_level() {
        let doc = rendered("<ol><li>outer<ol start=\"2\"><li>inner</li></ol></li></ol>");
        let ps = paragraphs(&doc);
        let inner = ps[1].props.numbering.unwrap();
        assert_eq!(inner.ilvl, 1);
        let counter = doc.numbering().iter().find(|n| n.num_id == inner.num_id).unwrap();
        assert_eq!((counter.start, counter.level), (2, 1));
    }

    #[test]
    fn reqres_table_merges_its_header() {
        let doc = rendered(
            "<pre><code class=\"language-reqres\">--- GET /foo|desc\nbody\n</code></pre>",
        );
        let t = doc.tables().next().unwrap();
        assert_eq!(t.rows.len(), 2);
        let head = &t.rows[0].cells;
        assert_eq!(head.len(), 1);
        assert_eq!(head[0].props.grid_span, 2);
        assert_eq!(head[0].text(), "Example");
        assert_eq!(t.columns, vec![Some(2400), Some(6600)]);

        let key = t.cell(1, 0);
        assert_eq!(key.paragraphs.len(), 2);
        assert_eq!(key.paragraphs[0].text(), "GET /foo");
        assert_eq!(key.paragraphs[1].text(), "desc");
        assert!(key.paragraphs[1].runs().all(|r| r.props.italic));
        assert!(key.props.borders.bottom.is_some());

        let body = t.cell(1, 1);
        assert_eq!(body.text(), "body");
        assert!(body.paragraphs[0].props.borders.is_none());
    }

    #[test]
    fn paragraph_pictures_come_first_and_are_scaled() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(20, 10, Rgba([9, 9, 9, 255]))
            .save(dir.path().join("shot.png"))
            .unwrap();
        let doc = rendered_in(
            "<p>Figure 1: <img src=\"shot.png\" alt=\"screen\"></p>",
            dir.path(),
        );
        let p = paragraphs(&doc)[0];
        let first = p.runs().next().unwrap();
        let pic = first.pictures().next().unwrap();
        assert_eq!(pic.description, "screen");
        assert_eq!(pic.width, 450 * 12700);
        // 22x12 after the one-pixel frame.
        assert_eq!(pic.height, (450.0f32 * 12.0 / 22.0 * 12700.0).round() as u64);
        assert_eq!(p.text(), "Figure 1:");
        assert_eq!(p.props.justification, Some(Justification::Center));
        assert_eq!(doc.media().len(), 1);
    }

    #[test]
    fn remote_picture_is_rejected() {
        let err = render_err("<p><img src=\"https://x.test/a.png\"></p>");
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::RemoteImage { .. })
        ));
    }
}

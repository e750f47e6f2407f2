//! In-memory WordprocessingML document: the object model the renderer fills
//! and the package writer serializes.

mod package;
mod xml;

pub use package::{write_docx, write_package};
pub use xml::{document_xml, paragraph_xml, table_xml};

use crate::theme::HouseStyle;
use std::collections::BTreeMap;

/// Points to twentieths of a point.
pub fn twips(points: f32) -> u32 {
    (points * 20.0).round().max(0.0) as u32
}

/// Points to English Metric Units.
pub fn emu(points: f32) -> u64 {
    (points * 12700.0).round().max(0.0) as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justification {
    Left,
    Center,
    Right,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Border {
    /// `single`, `dashed`, ...
    pub line: &'static str,
    /// Eighths of a point.
    pub size: u32,
    /// Points between border and content.
    pub space: u32,
    /// `RRGGBB`.
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParagraphBorders {
    pub top: Option<Border>,
    pub left: Option<Border>,
    pub bottom: Option<Border>,
    pub right: Option<Border>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spacing {
    pub before: Option<u32>,
    pub after: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Numbering {
    pub num_id: u32,
    pub ilvl: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParagraphProps {
    pub style: Option<String>,
    pub numbering: Option<Numbering>,
    pub borders: Option<ParagraphBorders>,
    pub spacing: Option<Spacing>,
    pub justification: Option<Justification>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunProps {
    pub font: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<String>,
    /// Half-points.
    pub size: Option<u32>,
    pub underline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub rel_id: String,
    pub id: u32,
    pub name: String,
    pub description: String,
    pub width: u64,
    pub height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunItem {
    Text(String),
    Break,
    Tab,
    Picture(Picture),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub props: RunProps,
    pub items: Vec<RunItem>,
}

impl Run {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        let mut run = Self::new();
        run.push_text(text);
        run
    }

    /// Appends text; `\n` becomes a line break and `\t` a tab.
    pub fn push_text(&mut self, text: &str) {
        let mut buf = String::new();
        for ch in text.chars() {
            let item = match ch {
                '\n' => RunItem::Break,
                '\t' => RunItem::Tab,
                '\r' => continue,
                _ => {
                    buf.push(ch);
                    continue;
                }
            };
            if !buf.is_empty() {
                self.items.push(RunItem::Text(std::mem::take(&mut buf)));
            }
            self.items.push(item);
        }
        if !buf.is_empty() {
            self.items.push(RunItem::Text(buf));
        }
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            match item {
                RunItem::Text(t) => out.push_str(t),
                RunItem::Break => out.push('\n'),
                RunItem::Tab => out.push('\t'),
                RunItem::Picture(_) => {}
            }
        }
        out
    }

    pub fn is_blank(&self) -> bool {
        self.items.iter().all(|item| match item {
            RunItem::Text(t) => t.trim().is_empty(),
            _ => false,
        })
    }

    pub fn pictures(&self) -> impl Iterator<Item = &Picture> {
        self.items.iter().filter_map(|i| match i {
            RunItem::Picture(p) => Some(p),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Run(Run),
    Hyperlink { rel_id: String, runs: Vec<Run> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub props: ParagraphProps,
    pub content: Vec<Inline>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: &str) -> Self {
        let mut p = Self::new();
        p.props.style = Some(style.to_string());
        p
    }

    pub fn add_run(&mut self, run: Run) {
        self.content.push(Inline::Run(run));
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.content.iter().flat_map(|i| match i {
            Inline::Run(r) => std::slice::from_ref(r).iter(),
            Inline::Hyperlink { runs, .. } => runs.iter(),
        })
    }

    pub fn text(&self) -> String {
        self.runs().map(Run::text).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn has_visible_content(&self) -> bool {
        self.runs().any(|r| !r.is_blank())
    }

    /// Whether the last text written ends in whitespace (or nothing was written).
    pub fn ends_with_space(&self) -> bool {
        let last = self.runs().flat_map(|r| r.items.iter()).last();
        match last {
            None => true,
            Some(RunItem::Text(t)) => t.ends_with(char::is_whitespace),
            Some(_) => false,
        }
    }

    /// Removes whitespace at the end of the paragraph, dropping runs it empties.
    pub fn trim_trailing_whitespace(&mut self) {
        loop {
            let Some(last) = self.content.last_mut() else {
                return;
            };
            let run = match last {
                Inline::Run(r) => Some(r),
                Inline::Hyperlink { runs, .. } => runs.last_mut(),
            };
            let Some(run) = run else {
                self.content.pop();
                continue;
            };
            match run.items.last_mut() {
                Some(RunItem::Text(t)) => {
                    let keep = t.trim_end().len();
                    t.truncate(keep);
                    if keep > 0 {
                        return;
                    }
                    run.items.pop();
                }
                Some(_) => return,
                None => {}
            }
            if !run.items.is_empty() {
                continue;
            }
            match self.content.last_mut() {
                Some(Inline::Hyperlink { runs, .. }) => {
                    runs.pop();
                    if runs.is_empty() {
                        self.content.pop();
                    }
                }
                _ => {
                    self.content.pop();
                }
            }
        }
    }

    /// Drops runs holding only whitespace.
    pub fn strip_blank_runs(&mut self) {
        self.content.retain_mut(|i| match i {
            Inline::Run(r) => !r.is_blank(),
            Inline::Hyperlink { runs, .. } => {
                runs.retain(|r| !r.is_blank());
                !runs.is_empty()
            }
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellBorders {
    pub top: Option<Border>,
    pub bottom: Option<Border>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellProps {
    /// Twips.
    pub width: Option<u32>,
    pub grid_span: u32,
    pub borders: CellBorders,
    /// Fill color, `RRGGBB`.
    pub shading: Option<String>,
}

impl Default for CellProps {
    fn default() -> Self {
        Self {
            width: None,
            grid_span: 1,
            borders: CellBorders::default(),
            shading: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub props: CellProps,
    pub paragraphs: Vec<Paragraph>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            props: CellProps::default(),
            paragraphs: vec![Paragraph::new()],
        }
    }
}

impl Cell {
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Removes whitespace-only runs and the paragraphs they leave empty,
    /// keeping at least one paragraph.
    pub fn strip_blank_runs(&mut self) {
        for p in &mut self.paragraphs {
            p.strip_blank_runs();
        }
        self.paragraphs.retain(|p| !p.is_empty());
        if self.paragraphs.is_empty() {
            self.paragraphs.push(Paragraph::new());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Grid column widths in twips.
    pub columns: Vec<Option<u32>>,
    pub rows: Vec<Row>,
    pub collapsed: bool,
    pub autofit: bool,
}

impl Table {
    /// A `rows` × `cols` grid of cells holding one empty paragraph each.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            columns: vec![None; cols],
            rows: (0..rows)
                .map(|_| Row {
                    cells: (0..cols).map(|_| Cell::default()).collect(),
                })
                .collect(),
            collapsed: false,
            autofit: false,
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.rows[row].cells[col]
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> &mut Cell {
        &mut self.rows[row].cells[col]
    }

    pub fn set_column_width(&mut self, col: usize, width: u32) {
        if let Some(slot) = self.columns.get_mut(col) {
            *slot = Some(width);
        }
        for row in &mut self.rows {
            if let Some(cell) = row.cells.get_mut(col) {
                cell.props.width = Some(width);
            }
        }
    }

    /// Merges every cell of `row` into its first cell, which then spans the
    /// full grid width.
    pub fn merge_row(&mut self, row: usize) {
        let Some(r) = self.rows.get_mut(row) else {
            return;
        };
        if r.cells.len() < 2 {
            return;
        }
        let rest: Vec<Cell> = r.cells.drain(1..).collect();
        let first = &mut r.cells[0];
        for cell in rest {
            first.props.grid_span += cell.props.grid_span;
            first.props.width = match (first.props.width, cell.props.width) {
                (Some(a), Some(b)) => Some(a + b),
                (a, _) => a,
            };
            first.paragraphs.extend(cell.paragraphs);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub rel_id: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A numbering instance: bullets, or an ordered list with its own counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingInstance {
    pub num_id: u32,
    pub ordered: bool,
    pub start: u32,
    /// List level the counter restarts at.
    pub level: u32,
}

/// Page size and margins in twips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub width: u32,
    pub height: u32,
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

/// Defaults written to `styles.xml`.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDefaults {
    pub font: String,
    /// Half-points.
    pub size: u32,
    /// Twips.
    pub space_before: u32,
    /// 240ths of a line.
    pub line: u32,
    /// `(before, after)` in twips for heading levels 1..4.
    pub headings: [(u32, u32); 4],
}

pub const BULLET_NUM_ID: u32 = 1;

#[derive(Debug, Clone)]
pub struct Document {
    pub blocks: Vec<Block>,
    pub section: Section,
    pub styles: StyleDefaults,
    hyperlinks: BTreeMap<String, String>,
    media: Vec<Media>,
    numbering: Vec<NumberingInstance>,
    next_rel: u32,
    next_picture: u32,
}

impl Document {
    /// An empty document with the house page geometry and style defaults.
    pub fn new(theme: &HouseStyle) -> Self {
        let inches = |v: f32| twips(v * 72.0);
        let page = theme.page;
        let pt = |v: &str| crate::style::points(v).unwrap_or(11.0);
        let mut headings = [(0, 0); 4];
        for (i, slot) in headings.iter_mut().enumerate() {
            let s = theme.heading_spacing[i];
            *slot = (twips(s.before_pt), twips(s.after_pt));
        }
        Self {
            blocks: Vec::new(),
            section: Section {
                width: inches(page.width_in),
                height: inches(page.height_in),
                top: inches(page.margin_top_in),
                bottom: inches(page.margin_bottom_in),
                left: inches(page.margin_left_in),
                right: inches(page.margin_right_in),
            },
            styles: StyleDefaults {
                font: theme.body_font.clone(),
                size: (pt(&theme.body_size) * 2.0).round() as u32,
                space_before: twips(theme.paragraph_space_before_pt),
                line: (theme.line_spacing * 240.0).round() as u32,
                headings,
            },
            hyperlinks: BTreeMap::new(),
            media: Vec::new(),
            numbering: vec![NumberingInstance {
                num_id: BULLET_NUM_ID,
                ordered: false,
                start: 1,
                level: 0,
            }],
            // rId1..rId9 are reserved for the fixed package parts.
            next_rel: 10,
            next_picture: 1,
        }
    }

    pub fn add_paragraph(&mut self, p: Paragraph) {
        self.blocks.push(Block::Paragraph(p));
    }

    fn next_rel_id(&mut self) -> String {
        let id = format!("rId{}", self.next_rel);
        self.next_rel += 1;
        id
    }

    /// Relationship id for an external hyperlink; one per distinct URL.
    pub fn add_hyperlink(&mut self, url: &str) -> String {
        if let Some(id) = self.hyperlinks.get(url) {
            return id.clone();
        }
        let id = self.next_rel_id();
        self.hyperlinks.insert(url.to_string(), id.clone());
        id
    }

    /// Stores a PNG under `word/media/`; returns its relationship id and a
    /// fresh drawing object id.
    pub fn add_image(&mut self, png: Vec<u8>) -> (String, u32) {
        let rel_id = self.next_rel_id();
        let pic_id = self.next_picture;
        self.next_picture += 1;
        self.media.push(Media {
            rel_id: rel_id.clone(),
            file_name: format!("image{}.png", self.media.len() + 1),
            bytes: png,
        });
        (rel_id, pic_id)
    }

    /// A new ordered-list counter for a list at `level`, starting at `start`.
    pub fn add_ordered_list(&mut self, start: u32, level: u32) -> u32 {
        let num_id = self.numbering.iter().map(|n| n.num_id).max().unwrap_or(0) + 1;
        self.numbering.push(NumberingInstance {
            num_id,
            ordered: true,
            start,
            level,
        });
        num_id
    }

    pub fn hyperlinks(&self) -> &BTreeMap<String, String> {
        &self.hyperlinks
    }

    pub fn media(&self) -> &[Media] {
        &self.media
    }

    pub fn numbering(&self) -> &[NumberingInstance] {
        &self.numbering
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }

    pub fn uses_numbering(&self) -> bool {
        fn para_numbered(p: &Paragraph) -> bool {
            p.props.numbering.is_some()
        }
        self.blocks.iter().any(|b| match b {
            Block::Paragraph(p) => para_numbered(p),
            Block::Table(t) => t
                .rows
                .iter()
                .flat_map(|r| r.cells.iter())
                .flat_map(|c| c.paragraphs.iter())
                .any(para_numbered),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_text_splits_breaks_and_tabs() {
        let run = Run::with_text("a\tb\nc\r\n");
        assert_eq!(
            run.items,
            vec![
                RunItem::Text("a".into()),
                RunItem::Tab,
                RunItem::Text("b".into()),
                RunItem::Break,
                RunItem::Text("c".into()),
                RunItem::Break,
            ]
        );
        assert_eq!(run.text(), "a\tb\nc\n");
    }

    #[test]
    fn trailing_whitespace_is_trimmed_across_runs() {
        let mut p = Paragraph::new();
        p.add_run(Run::with_text("Body text "));
        p.content.push(Inline::Hyperlink {
            rel_id: "rId10".into(),
            runs: vec![Run::with_text("  ")],
        });
        assert!(p.ends_with_space());
        p.trim_trailing_whitespace();
        assert_eq!(p.content.len(), 1);
        assert_eq!(p.text(), "Body text");
        assert!(!p.ends_with_space());

        let mut br = Paragraph::new();
        br.add_run(Run::with_text("a\n"));
        br.trim_trailing_whitespace();
        assert_eq!(br.text(), "a\n");
    }

    #[test]
    fn geometry_is_a4_with_house_margins() {
        let doc = Document::new(&HouseStyle::default());
        assert_eq!(doc.section.width, 11909);
        assert_eq!(doc.section.height, 16834);
        assert_eq!(doc.section.left, 1440);
        assert_eq!(doc.section.top, 850);
        assert_eq!(doc.styles.size, 22);
        assert_eq!(doc.styles.space_before, 20);
    }

    #[test]
    fn hyperlink_relationships_are_shared_per_url() {
        let mut doc = Document::new(&HouseStyle::default());
        let a = doc.add_hyperlink("https://a.test");
        let b = doc.add_hyperlink("https://b.test");
        assert_eq!(doc.add_hyperlink("https://a.test"), a);
        assert_ne!(a, b);
        let (img, _) = doc.add_image(vec![1, 2, 3]);
        assert_eq!(img, "rId12");
        assert_eq!(doc.media()[0].file_name, "image1.png");
    }

    #[test]
    fn merging_a_row_spans_the_grid_and_keeps_paragraphs() {
        let mut t = Table::new(2, 2);
        t.cell_mut(0, 0).paragraphs[0].add_run(Run::with_text("Example"));
        t.cell_mut(0, 1).paragraphs[0].add_run(Run::with_text(" "));
        t.set_column_width(0, 2400);
        t.set_column_width(1, 6600);
        t.merge_row(0);
        let head = &mut t.rows[0].cells;
        assert_eq!(head.len(), 1);
        assert_eq!(head[0].props.grid_span, 2);
        assert_eq!(head[0].props.width, Some(9000));
        assert_eq!(head[0].paragraphs.len(), 2);
        head[0].strip_blank_runs();
        assert_eq!(head[0].paragraphs.len(), 1);
        assert_eq!(head[0].text(), "Example");
        assert_eq!(t.rows[1].cells.len(), 2);
    }

    #[test]
    fn ordered_lists_get_their_own_counters() {
        let mut doc = Document::new(&HouseStyle::default());
        let first = doc.add_ordered_list(1, 0);
        let second = doc.add_ordered_list(3, 1);
        assert_ne!(first, BULLET_NUM_ID);
        assert_ne!(first, second);
        assert_eq!(doc.numbering().len(), 3);
        assert_eq!(doc.numbering()[2].level, 1);
        assert!(!doc.uses_numbering());
    }
}

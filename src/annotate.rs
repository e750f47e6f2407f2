//! Style annotation: one ordered pass of rules over the parsed tree.
//!
//! Each rule either attaches a declaration to the elements its selector
//! matches, or rewrites the tree. Rules run in table order and later rules
//! may read what earlier ones wrote, so the order of `RULES` is significant.

use crate::dom::{NodeId, Tree};
use crate::error::InputError;
use crate::highlight::Highlight;
use crate::style::{own_style, set_own_style, Declaration, Property};
use crate::theme::HouseStyle;
use anyhow::{Context, Result};

pub struct Annotator<'a> {
    pub theme: &'a HouseStyle,
    pub highlighter: &'a dyn Highlight,
}

type Select = fn(&Tree, NodeId) -> bool;
/// Produces the element's new own declaration from its current one.
type Declare = fn(&HouseStyle, &Tree, NodeId, Option<Declaration>) -> Declaration;
type Rewrite = fn(&mut Tree, &Annotator<'_>) -> Result<()>;

enum Action {
    Style { select: Select, declare: Declare },
    Rewrite(Rewrite),
}

struct Rule {
    name: &'static str,
    action: Action,
}

const RULES: &[Rule] = &[
    Rule {
        name: "request/response blocks",
        action: Action::Rewrite(expand_reqres_blocks),
    },
    Rule {
        name: "lift cell alignment",
        action: Action::Rewrite(lift_cell_alignment),
    },
    Rule {
        name: "body text",
        action: Action::Style {
            select: |t, n| matches!(t.name(n), Some("p" | "th" | "td" | "li")),
            declare: |h, _, _, _| base(h).with(Property::TextAlign, "justify"),
        },
    },
    Rule {
        name: "inline code",
        action: Action::Style {
            select: |t, n| t.is(n, "code") && !t.has_ancestor(n, "pre"),
            declare: |h, _, _, _| mono(h),
        },
    },
    Rule {
        name: "code blocks",
        action: Action::Rewrite(highlight_code_blocks),
    },
    Rule {
        name: "images",
        action: Action::Style {
            select: |t, n| t.is(n, "img"),
            declare: |h, _, _, _| {
                base(h)
                    .with(Property::Width, h.image_width.as_str())
                    .with(Property::Border, h.image_border.as_str())
            },
        },
    },
    Rule {
        name: "hyperlinks",
        action: Action::Style {
            select: |t, n| t.is(n, "a"),
            declare: |h, _, _, cur| {
                cur.unwrap_or_default()
                    .with(Property::Color, h.link_color.as_str())
                    .with(Property::TextDecorationLine, "underline")
            },
        },
    },
    Rule {
        name: "captions",
        action: Action::Style {
            select: is_caption,
            declare: |h, _, _, _| {
                base(h)
                    .with(Property::FontSize, h.caption_size.as_str())
                    .with(Property::TextAlign, "center")
            },
        },
    },
    Rule {
        name: "caption code",
        action: Action::Style {
            select: |t, n| {
                t.is(n, "code") && t.ancestors(n).into_iter().any(|a| is_caption(t, a))
            },
            declare: |h, _, _, cur| {
                extend(h, cur).with(Property::FontSize, h.caption_code_size.as_str())
            },
        },
    },
    Rule {
        name: "headings",
        action: Action::Style {
            select: |t, n| heading_level(t, n).is_some(),
            declare: heading_style,
        },
    },
    Rule {
        name: "empty table headers",
        action: Action::Rewrite(drop_empty_table_headers),
    },
    Rule {
        name: "cell alignment",
        action: Action::Rewrite(normalize_cell_alignment),
    },
    Rule {
        name: "tables",
        action: Action::Style {
            select: |t, n| t.is(n, "table"),
            declare: |h, _, _, _| base(h).with(Property::BorderCollapse, "collapse"),
        },
    },
    Rule {
        name: "summary top row",
        action: Action::Style {
            select: |t, n| {
                cell_table(t, n).is_some_and(|table| {
                    is_summary(t, table) && t.parent(n) == first_row(t, table)
                })
            },
            declare: |h, _, _, cur| {
                extend(h, cur).with(Property::BorderTop, h.summary_rule.as_str())
            },
        },
    },
    Rule {
        name: "summary label column",
        action: Action::Style {
            select: |t, n| summary_body_column(t, n) == Some(0),
            declare: |h, _, _, cur| {
                extend(h, cur)
                    .with(Property::TextAlign, "right")
                    .with(Property::Color, "#ffffff")
                    .with(Property::BackgroundColor, h.accent.as_str())
                    .with(Property::Width, h.summary_label_width.as_str())
            },
        },
    },
    Rule {
        name: "summary value column",
        action: Action::Style {
            select: |t, n| summary_body_column(t, n) == Some(1),
            declare: |h, _, _, cur| {
                extend(h, cur).with(Property::Width, h.summary_value_width.as_str())
            },
        },
    },
    Rule {
        name: "header row",
        action: Action::Style {
            select: |t, n| {
                t.is(n, "th")
                    && t.has_ancestor(n, "thead")
                    && cell_table(t, n).is_some_and(|table| is_banded(t, table))
            },
            declare: |h, _, _, cur| {
                extend(h, cur)
                    .with(Property::Color, "#ffffff")
                    .with(Property::BackgroundColor, h.accent.as_str())
            },
        },
    },
    Rule {
        name: "zebra rows",
        action: Action::Style {
            select: |t, n| {
                t.is(n, "td")
                    && cell_table(t, n).is_some_and(|table| is_banded(t, table))
                    && t.parent(n).is_some_and(|tr| {
                        t.parent(tr).is_some_and(|g| t.is(g, "tbody"))
                            && row_position(t, tr) % 2 == 0
                    })
            },
            declare: |h, _, _, cur| {
                extend(h, cur).with(Property::BackgroundColor, h.zebra_fill.as_str())
            },
        },
    },
    Rule {
        name: "request/response header",
        action: Action::Style {
            select: |t, n| {
                t.is(n, "th") && cell_table(t, n).is_some_and(|table| is_reqres(t, table))
            },
            declare: |h, _, _, cur| {
                extend(h, cur).with(Property::FontSize, h.reqres_header_size.as_str())
            },
        },
    },
    Rule {
        name: "request/response cells",
        action: Action::Style {
            select: |t, n| {
                t.is(n, "td") && cell_table(t, n).is_some_and(|table| is_reqres(t, table))
            },
            declare: |h, t, n, cur| {
                let width = match cell_column(t, n) {
                    0 => h.reqres_key_width.as_str(),
                    _ => h.reqres_body_width.as_str(),
                };
                let mut d = extend(h, cur)
                    .with(Property::Width, width)
                    .with(Property::BorderBottom, h.reqres_rule.as_str());
                d.remove(Property::BackgroundColor);
                d
            },
        },
    },
    Rule {
        name: "request/response code",
        action: Action::Style {
            select: |t, n| {
                t.is(n, "code")
                    && t.parent(n).is_some_and(|p| t.is(p, "pre"))
                    && t.ancestors(n)
                        .into_iter()
                        .any(|a| t.is(a, "table") && is_reqres(t, a))
            },
            declare: |h, _, _, cur| {
                let mut d = extend(h, cur);
                d.remove(Property::Border);
                d
            },
        },
    },
];

/// Applies the house style to `tree` in place.
pub fn annotate(tree: &mut Tree, theme: &HouseStyle, highlighter: &dyn Highlight) -> Result<()> {
    let ctx = Annotator { theme, highlighter };
    for rule in RULES {
        log::debug!("applying style rule `{}`", rule.name);
        match &rule.action {
            Action::Style { select, declare } => {
                let view: &Tree = tree;
                let targets: Vec<NodeId> = view
                    .elements()
                    .into_iter()
                    .filter(|n| select(view, *n))
                    .collect();
                for n in targets {
                    let decl = declare(theme, tree, n, own_style(tree, n));
                    set_own_style(tree, n, &decl);
                }
            }
            Action::Rewrite(rewrite) => {
                rewrite(tree, &ctx).with_context(|| format!("style rule `{}`", rule.name))?
            }
        }
    }
    Ok(())
}

fn base(h: &HouseStyle) -> Declaration {
    Declaration::new()
        .with(Property::FontFamily, h.body_font.as_str())
        .with(Property::FontSize, h.body_size.as_str())
}

fn mono(h: &HouseStyle) -> Declaration {
    base(h)
        .with(Property::FontFamily, h.mono_font.as_str())
        .with(Property::FontSize, h.mono_size.as_str())
}

/// The current declaration, or the body base when the element has none.
fn extend(h: &HouseStyle, cur: Option<Declaration>) -> Declaration {
    cur.unwrap_or_else(|| base(h))
}

fn heading_level(t: &Tree, n: NodeId) -> Option<u8> {
    match t.name(n)? {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        _ => None,
    }
}

fn heading_style(h: &HouseStyle, t: &Tree, n: NodeId, _: Option<Declaration>) -> Declaration {
    let level = heading_level(t, n).unwrap_or(4);
    let color = if level == 3 {
        &h.subheading_color
    } else {
        &h.heading_color
    };
    let mut d = base(h)
        .with(Property::Color, color.as_str())
        .with(Property::TextAlign, "left")
        .with(Property::FontSize, h.heading_size(level));
    if level <= 2 {
        d.set(Property::FontWeight, "bold");
    }
    d
}

/// A paragraph holding an image, or directly following a code block or table.
fn is_caption(t: &Tree, n: NodeId) -> bool {
    if !t.is(n, "p") {
        return false;
    }
    if !t.descendants_named(n, "img").is_empty() {
        return true;
    }
    t.previous_element_sibling(n)
        .is_some_and(|prev| t.is(prev, "pre") || t.is(prev, "table"))
}

fn language_of(t: &Tree, code: NodeId) -> String {
    t.attr(code, "class")
        .and_then(|c| {
            c.split_whitespace()
                .find_map(|tok| tok.strip_prefix("language-"))
                .map(str::to_string)
        })
        .unwrap_or_default()
}

fn is_cell(t: &Tree, n: NodeId) -> bool {
    matches!(t.name(n), Some("th" | "td")) && t.parent(n).is_some_and(|p| t.is(p, "tr"))
}

fn cell_table(t: &Tree, n: NodeId) -> Option<NodeId> {
    if !is_cell(t, n) {
        return None;
    }
    t.ancestors(n).into_iter().find(|a| t.is(*a, "table"))
}

fn first_row(t: &Tree, table: NodeId) -> Option<NodeId> {
    t.descendants_named(table, "tr").into_iter().next()
}

fn row_cells(t: &Tree, tr: NodeId) -> Vec<NodeId> {
    t.element_children(tr)
        .into_iter()
        .filter(|c| matches!(t.name(*c), Some("th" | "td")))
        .collect()
}

fn cell_column(t: &Tree, cell: NodeId) -> usize {
    t.parent(cell)
        .and_then(|tr| row_cells(t, tr).iter().position(|c| *c == cell))
        .unwrap_or(0)
}

/// 1-based position of `tr` among the rows of its group.
fn row_position(t: &Tree, tr: NodeId) -> usize {
    t.parent(tr)
        .and_then(|g| {
            t.element_children(g)
                .into_iter()
                .filter(|r| t.is(*r, "tr"))
                .position(|r| r == tr)
        })
        .map(|i| i + 1)
        .unwrap_or(0)
}

fn is_reqres(t: &Tree, table: NodeId) -> bool {
    t.has_class(table, "reqres")
}

/// A table placed directly under a level-2 heading.
fn is_summary(t: &Tree, table: NodeId) -> bool {
    !is_reqres(t, table)
        && t
            .previous_element_sibling(table)
            .is_some_and(|prev| t.is(prev, "h2"))
}

/// Any other table that has a header row.
fn is_banded(t: &Tree, table: NodeId) -> bool {
    !is_summary(t, table) && t.first_child_named(table, "thead").is_some()
}

/// Index among the `td`s of a summary-table body row, for the first two.
fn summary_body_column(t: &Tree, n: NodeId) -> Option<usize> {
    if !t.is(n, "td") {
        return None;
    }
    let table = cell_table(t, n)?;
    if !is_summary(t, table) {
        return None;
    }
    let tr = t.parent(n)?;
    if !t.parent(tr).is_some_and(|g| t.is(g, "tbody")) {
        return None;
    }
    let tds: Vec<NodeId> = row_cells(t, tr).into_iter().filter(|c| t.is(*c, "td")).collect();
    if tds.first() == Some(&n) {
        return Some(0);
    }
    // The value column is the second cell of the row, whatever its kind.
    (row_cells(t, tr).get(1) == Some(&n)).then_some(1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReqresRecord {
    pub key: String,
    pub subtitle: Option<String>,
    pub body: String,
}

/// Splits a request/response block into its `--- key[|subtitle]` records.
pub fn parse_reqres(text: &str) -> Result<Vec<ReqresRecord>, InputError> {
    let mut records = Vec::new();
    let mut current: Option<ReqresRecord> = None;

    let finish = |mut r: ReqresRecord| {
        let trimmed = r.body.trim_end_matches('\n').len();
        r.body.truncate(trimmed);
        if !r.body.is_empty() {
            r.body.push('\n');
        }
        r
    };

    for line in text.lines() {
        if let Some(header) = line.strip_prefix("---") {
            if let Some(r) = current.take() {
                records.push(finish(r));
            }
            let (key, subtitle) = match header.split_once('|') {
                Some((k, s)) => (k.trim(), Some(s.trim()).filter(|s| !s.is_empty())),
                None => (header.trim(), None),
            };
            current = Some(ReqresRecord {
                key: key.to_string(),
                subtitle: subtitle.map(str::to_string),
                body: String::new(),
            });
            continue;
        }
        match current.as_mut() {
            Some(r) => {
                r.body.push_str(line);
                r.body.push('\n');
            }
            None if line.trim().is_empty() => {}
            None => {
                return Err(InputError::ReqresHeader {
                    found: line.to_string(),
                })
            }
        }
    }
    if let Some(r) = current.take() {
        records.push(finish(r));
    }
    if records.is_empty() {
        return Err(InputError::ReqresHeader {
            found: String::new(),
        });
    }
    Ok(records)
}

fn build_reqres_table(t: &mut Tree, title: &str, records: &[ReqresRecord]) -> NodeId {
    let table = t.create_element("table", &[("class", "reqres")]);

    let thead = t.create_element("thead", &[]);
    t.append(table, thead);
    let head_row = t.create_element("tr", &[]);
    t.append(thead, head_row);
    t.element_text(head_row, "th", title);
    // Placeholder so the header spans both columns until it is merged.
    t.element_text(head_row, "th", " ");

    let tbody = t.create_element("tbody", &[]);
    t.append(table, tbody);
    for r in records {
        let tr = t.create_element("tr", &[]);
        t.append(tbody, tr);

        let key_cell = t.create_element("td", &[]);
        t.append(tr, key_cell);
        t.element_text(key_cell, "p", &r.key);
        if let Some(sub) = &r.subtitle {
            let p = t.create_element("p", &[]);
            t.append(key_cell, p);
            t.element_text(p, "em", sub);
        }

        let body_cell = t.create_element("td", &[]);
        t.append(tr, body_cell);
        let pre = t.create_element("pre", &[]);
        t.append(body_cell, pre);
        let code = t.create_element("code", &[("class", "language-http")]);
        t.append(pre, code);
        let text = t.create_text(&r.body);
        t.append(code, text);
    }
    table
}

fn expand_reqres_blocks(t: &mut Tree, a: &Annotator<'_>) -> Result<()> {
    for code in t.find_all("code") {
        let Some(pre) = t.parent(code).filter(|p| t.is(*p, "pre")) else {
            continue;
        };
        if language_of(t, code) != "reqres" {
            continue;
        }
        let records = parse_reqres(&t.text_content(code))
            .with_context(|| format!("request/response block in {}", t.describe_location(pre)))?;
        log::debug!("expanding request/response block with {} records", records.len());
        let table = build_reqres_table(t, &a.theme.reqres_title, &records);
        if let Some(src) = t.attr(pre, "data-source").map(str::to_string) {
            t.set_attr(table, "data-source", &src);
        }
        t.replace(pre, table);
    }
    Ok(())
}

/// The Markdown converter marks column alignment with an inline `text-align`;
/// turn it into the presentational `align` attribute before the base text rule
/// replaces cell styles.
fn lift_cell_alignment(t: &mut Tree, _: &Annotator<'_>) -> Result<()> {
    let cells: Vec<NodeId> = t.elements().into_iter().filter(|n| is_cell(t, *n)).collect();
    for cell in cells {
        let Some(align) =
            own_style(t, cell).and_then(|d| d.get(Property::TextAlign).map(str::to_string))
        else {
            continue;
        };
        t.remove_attr(cell, "style");
        if t.attr(cell, "align").is_none() {
            t.set_attr(cell, "align", &align);
        }
    }
    Ok(())
}

fn highlight_code_blocks(t: &mut Tree, a: &Annotator<'_>) -> Result<()> {
    let blocks: Vec<NodeId> = t
        .find_all("code")
        .into_iter()
        .filter(|c| t.parent(*c).is_some_and(|p| t.is(p, "pre")))
        .collect();
    for code in blocks {
        let decl = mono(a.theme)
            .with(Property::TextAlign, "left")
            .with(Property::Border, a.theme.code_border.as_str());
        set_own_style(t, code, &decl);

        let lang = language_of(t, code);
        let source = t.text_content(code);
        let html = a
            .highlighter
            .highlight(&source, &lang)
            .with_context(|| {
                format!(
                    "highlighting {lang:?} code block in {}",
                    t.describe_location(code)
                )
            })?;
        t.clear_children(code);
        t.append_html(code, &html);
    }
    Ok(())
}

fn drop_empty_table_headers(t: &mut Tree, _: &Annotator<'_>) -> Result<()> {
    for table in t.find_all("table") {
        let Some(thead) = t.first_child_named(table, "thead") else {
            continue;
        };
        let blank = t
            .descendants(thead)
            .into_iter()
            .filter(|n| matches!(t.name(*n), Some("th" | "td")))
            .all(|c| t.text_content(c).trim().is_empty());
        if blank {
            t.detach(thead);
        }
    }
    Ok(())
}

fn normalize_cell_alignment(t: &mut Tree, a: &Annotator<'_>) -> Result<()> {
    let cells: Vec<NodeId> = t.elements().into_iter().filter(|n| is_cell(t, *n)).collect();
    for cell in cells {
        if t.remove_attr(cell, "align").is_none() {
            continue;
        }
        let decl = extend(a.theme, own_style(t, cell)).with(Property::TextAlign, "left");
        set_own_style(t, cell, &decl);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::Passthrough;
    use crate::style::effective_style;
    use anyhow::anyhow;

    fn annotated(html: &str) -> Tree {
        let mut tree = Tree::parse(html);
        annotate(&mut tree, &HouseStyle::default(), &Passthrough).unwrap();
        tree
    }

    fn style_of(tree: &Tree, n: NodeId) -> Declaration {
        own_style(tree, n).unwrap_or_default()
    }

    struct Failing;

    impl Highlight for Failing {
        fn highlight(&self, _: &str, _: &str) -> Result<String> {
            Err(anyhow!("highlighter exited with status 1"))
        }
    }

    #[test]
    fn body_text_gets_the_base_font() {
        let tree = annotated("<p>hello</p><ul><li>x</li></ul>");
        for n in tree.find_all("p").into_iter().chain(tree.find_all("li")) {
            let s = style_of(&tree, n);
            assert_eq!(s.get(Property::FontFamily), Some("Calibri"));
            assert_eq!(s.get(Property::FontSize), Some("11pt"));
            assert_eq!(s.get(Property::TextAlign), Some("justify"));
        }
    }

    #[test]
    fn inline_and_block_code_differ() {
        let tree = annotated(
            "<p>use <code>x</code></p><pre><code class=\"language-rust\">let x = 1;\n</code></pre>",
        );
        let codes = tree.find_all("code");
        let inline = style_of(&tree, codes[0]);
        assert_eq!(inline.get(Property::FontFamily), Some("Roboto Mono"));
        assert_eq!(inline.get(Property::Border), None);

        let block = style_of(&tree, codes[1]);
        assert_eq!(block.get(Property::FontSize), Some("9pt"));
        assert_eq!(block.get(Property::TextAlign), Some("left"));
        assert_eq!(block.get(Property::Border), Some("1px solid #000000"));
        assert_eq!(tree.text_content(codes[1]), "let x = 1;\n");
    }

    #[test]
    fn highlighter_failure_aborts_annotation() {
        let mut tree = Tree::parse("<pre><code class=\"language-rust\">x</code></pre>");
        let err = annotate(&mut tree, &HouseStyle::default(), &Failing).unwrap_err();
        assert!(err
            .chain()
            .any(|c| c.to_string().contains("highlighter exited with status 1")));
    }

    #[test]
    fn links_images_and_headings() {
        let tree = annotated(
            "<h1>T</h1><h3>S</h3><h4>D</h4>\
             <p><a href=\"https://x.test\">x</a></p><p><img src=\"a.png\"></p>",
        );
        let a = style_of(&tree, tree.find_all("a")[0]);
        assert_eq!(a.get(Property::Color), Some("#1155cc"));
        assert_eq!(a.get(Property::TextDecorationLine), Some("underline"));

        let img = style_of(&tree, tree.find_all("img")[0]);
        assert_eq!(img.get(Property::Width), Some("450pt"));
        assert!(img.contains(Property::Border));

        let h1 = style_of(&tree, tree.find_all("h1")[0]);
        assert_eq!(h1.get(Property::FontSize), Some("20pt"));
        assert_eq!(h1.get(Property::FontWeight), Some("bold"));
        assert_eq!(h1.get(Property::Color), Some("#666666"));
        let h3 = style_of(&tree, tree.find_all("h3")[0]);
        assert_eq!(h3.get(Property::Color), Some("#434343"));
        assert_eq!(h3.get(Property::FontWeight), None);
        let h4 = style_of(&tree, tree.find_all("h4")[0]);
        assert_eq!(h4.get(Property::FontWeight), None);
        assert_eq!(h4.get(Property::FontSize), Some("12pt"));
    }

    #[test]
    fn captions_follow_images_code_and_tables() {
        let tree = annotated(
            "<p><img src=\"a.png\"></p>\
             <pre><code>x\n</code></pre><p>Listing <code>x</code></p>\
             <p>plain</p>",
        );
        let ps = tree.find_all("p");
        assert_eq!(style_of(&tree, ps[0]).get(Property::TextAlign), Some("center"));
        assert_eq!(style_of(&tree, ps[1]).get(Property::FontSize), Some("10pt"));
        assert_eq!(style_of(&tree, ps[2]).get(Property::TextAlign), Some("justify"));

        let caption_code = tree.descendants_named(ps[1], "code")[0];
        let s = style_of(&tree, caption_code);
        assert_eq!(s.get(Property::FontSize), Some("8pt"));
        assert_eq!(s.get(Property::FontFamily), Some("Roboto Mono"));
    }

    #[test]
    fn blank_table_header_is_removed() {
        let tree = annotated(
            "<table><thead><tr><th> </th><th></th></tr></thead>\
             <tbody><tr><td>a</td><td>b</td></tr></tbody></table>",
        );
        assert!(tree.find_all("thead").is_empty());
        assert_eq!(tree.find_all("tr").len(), 1);
    }

    #[test]
    fn table_header_with_text_is_kept() {
        let tree = annotated(
            "<table><thead><tr><th>Name</th><th></th></tr></thead>\
             <tbody><tr><td>a</td><td>b</td></tr></tbody></table>",
        );
        assert_eq!(tree.find_all("thead").len(), 1);
        let th = tree.find_all("th")[0];
        let s = style_of(&tree, th);
        assert_eq!(s.get(Property::BackgroundColor), Some("#057d9f"));
        assert_eq!(s.get(Property::Color), Some("#ffffff"));
    }

    #[test]
    fn aligned_cells_become_left_aligned() {
        let tree = annotated(
            "<table><thead><tr><th style=\"text-align: center\">A</th><th>B</th></tr></thead>\
             <tbody><tr><td align=\"right\">1</td><td>2</td></tr></tbody></table>",
        );
        let th = tree.find_all("th");
        let td = tree.find_all("td");
        assert_eq!(tree.attr(th[0], "align"), None);
        assert_eq!(style_of(&tree, th[0]).get(Property::TextAlign), Some("left"));
        assert_eq!(style_of(&tree, th[1]).get(Property::TextAlign), Some("justify"));
        assert_eq!(tree.attr(td[0], "align"), None);
        assert_eq!(style_of(&tree, td[0]).get(Property::TextAlign), Some("left"));
        let table = tree.find_all("table")[0];
        assert_eq!(style_of(&tree, table).get(Property::BorderCollapse), Some("collapse"));
    }

    #[test]
    fn summary_table_under_h2() {
        let tree = annotated(
            "<h2>Summary</h2>\n<table><tbody>\
             <tr><td>Target</td><td>api</td></tr>\
             <tr><td>Risk</td><td>low</td></tr>\
             </tbody></table>",
        );
        let td = tree.find_all("td");
        let label = style_of(&tree, td[0]);
        assert_eq!(label.get(Property::BorderTop), Some("6px solid #057d9f"));
        assert_eq!(label.get(Property::BackgroundColor), Some("#057d9f"));
        assert_eq!(label.get(Property::TextAlign), Some("right"));
        assert_eq!(label.get(Property::Width), Some("82.512pt"));

        let value = style_of(&tree, td[1]);
        assert_eq!(value.get(Property::BorderTop), Some("6px solid #057d9f"));
        assert_eq!(value.get(Property::Width), Some("367.488pt"));
        assert_eq!(value.get(Property::BackgroundColor), None);

        let second_row_label = style_of(&tree, td[2]);
        assert_eq!(second_row_label.get(Property::BorderTop), None);
        assert_eq!(second_row_label.get(Property::Color), Some("#ffffff"));
    }

    #[test]
    fn other_tables_are_zebra_striped() {
        let tree = annotated(
            "<p>Intro</p><table><thead><tr><th>H</th></tr></thead><tbody>\
             <tr><td>1</td></tr><tr><td>2</td></tr><tr><td>3</td></tr><tr><td>4</td></tr>\
             </tbody></table>",
        );
        let fills: Vec<Option<String>> = tree
            .find_all("td")
            .into_iter()
            .map(|td| style_of(&tree, td).get(Property::BackgroundColor).map(str::to_string))
            .collect();
        assert_eq!(
            fills,
            vec![None, Some("#efefef".to_string()), None, Some("#efefef".to_string())]
        );
    }

    #[test]
    fn reqres_record_parsing() {
        let records = parse_reqres("--- GET /foo|desc\nbody").unwrap();
        assert_eq!(
            records,
            vec![ReqresRecord {
                key: "GET /foo".into(),
                subtitle: Some("desc".into()),
                body: "body\n".into(),
            }]
        );

        let text = "\n--- Request\nGET / HTTP/1.1\n\n--- Response|200\nHTTP/1.1 200 OK\n";
        let records = parse_reqres(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].subtitle, None);
        assert_eq!(records[0].body, "GET / HTTP/1.1\n");
        assert_eq!(records[1].key, "Response");

        assert_eq!(
            parse_reqres("GET /foo\n--- x").unwrap_err(),
            InputError::ReqresHeader {
                found: "GET /foo".into()
            }
        );
        assert!(parse_reqres("").is_err());
    }

    #[test]
    fn reqres_block_expands_into_a_styled_table() {
        let tree = annotated(
            "<h2>Calls</h2>\
             <pre><code class=\"language-reqres\">--- GET /foo|desc\nbody\n</code></pre>",
        );
        let tables = tree.find_all("table");
        assert_eq!(tables.len(), 1);
        let table = tables[0];
        assert!(tree.has_class(table, "reqres"));

        let tbody = tree.first_child_named(table, "tbody").unwrap();
        let body_rows = tree.descendants_named(tbody, "tr");
        assert_eq!(body_rows.len(), 1);
        let cells = tree.element_children(body_rows[0]);
        let paras = tree.descendants_named(cells[0], "p");
        assert_eq!(tree.text_content(paras[0]), "GET /foo");
        assert_eq!(tree.text_content(paras[1]), "desc");
        let code = tree.descendants_named(cells[1], "code")[0];
        assert_eq!(tree.attr(code, "class"), Some("language-http"));
        assert_eq!(tree.text_content(code), "body\n");

        // Bespoke styling: no zebra fill, rule under each cell, fixed widths.
        let key = style_of(&tree, cells[0]);
        assert_eq!(key.get(Property::Width), Some("120pt"));
        assert_eq!(key.get(Property::BorderBottom), Some("1px solid #057d9f"));
        assert_eq!(key.get(Property::BackgroundColor), None);
        assert_eq!(style_of(&tree, cells[1]).get(Property::Width), Some("330pt"));
        assert_eq!(style_of(&tree, code).get(Property::Border), None);

        let th = tree.find_all("th")[0];
        assert_eq!(style_of(&tree, th).get(Property::FontSize), Some("12pt"));
        // Never a summary table, even right under an h2.
        assert_eq!(style_of(&tree, cells[0]).get(Property::BorderTop), None);
        assert_eq!(effective_style(&tree, th).get(Property::BackgroundColor), Some("#057d9f"));
    }

    #[test]
    fn malformed_reqres_block_is_fatal() {
        let mut tree =
            Tree::parse("<pre><code class=\"language-reqres\">GET /foo\nbody\n</code></pre>");
        let err = annotate(&mut tree, &HouseStyle::default(), &Passthrough).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::ReqresHeader { .. })
        ));
    }
}

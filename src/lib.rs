//! Markdown reports to a single house-styled `.docx`.
//!
//! The pipeline: collect and concatenate the Markdown sources
//! ([`markdown`]), parse the HTML into an owned tree ([`dom`]), attach the
//! house style to it ([`annotate`]), render the tree into a document model
//! ([`render`]) and write the package ([`docx`]).

pub mod annotate;
pub mod docx;
pub mod dom;
pub mod error;
pub mod highlight;
pub mod markdown;
pub mod picture;
pub mod render;
pub mod style;
pub mod theme;

pub use error::InputError;

use anyhow::{Context, Result};
use docx::Document;
use dom::Tree;
use highlight::{Highlight, Passthrough, SyntectHighlighter};
use markdown::Source;
use std::path::{Path, PathBuf};
use theme::HouseStyle;

#[derive(Debug, Clone)]
pub struct Options {
    /// Glob selecting the Markdown files.
    pub files: String,
    /// Directory relative image sources are read from.
    pub base_dir: PathBuf,
    /// Where to write the annotated HTML, if anywhere.
    pub dump_html: Option<PathBuf>,
    /// Syntax theme for code blocks; `None` leaves code uncolored.
    pub highlight_theme: Option<String>,
    pub house: HouseStyle,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            files: "*.md".to_string(),
            base_dir: PathBuf::from("."),
            dump_html: None,
            highlight_theme: Some(SyntectHighlighter::DEFAULT_THEME.to_string()),
            house: HouseStyle::default(),
        }
    }
}

/// Annotates and renders `sources`. Returns the annotated tree too, for
/// inspection.
pub fn convert(
    sources: &[Source],
    house: &HouseStyle,
    highlighter: &dyn Highlight,
    base_dir: &Path,
) -> Result<(Tree, Document)> {
    let mut tree = markdown::parse_sources(sources);
    annotate::annotate(&mut tree, house, highlighter)?;
    let doc = render::render(&tree, house, base_dir)?;
    Ok((tree, doc))
}

/// Runs the whole conversion and writes `output`.
pub fn run(output: &Path, opts: &Options) -> Result<()> {
    let sources = markdown::collect_sources(&opts.files)?;

    let highlighter: Box<dyn Highlight> = match &opts.highlight_theme {
        Some(name) => Box::new(SyntectHighlighter::new(name)?),
        None => Box::new(Passthrough),
    };

    let (tree, doc) = convert(&sources, &opts.house, highlighter.as_ref(), &opts.base_dir)?;

    if let Some(path) = &opts.dump_html {
        std::fs::write(path, tree.to_html())
            .with_context(|| format!("write {}", path.display()))?;
        log::info!("wrote annotated HTML to {}", path.display());
    }

    docx::write_docx(output, &doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;

    fn sources(files: &[(&str, &str)]) -> Vec<Source> {
        files
            .iter()
            .map(|(path, text)| Source {
                path: PathBuf::from(path),
                text: text.to_string(),
            })
            .collect()
    }

    #[test]
    fn title_then_body_from_two_files() {
        let dir = tempfile::tempdir().unwrap();
        // Written out of order; the glob result is sorted.
        fs::write(dir.path().join("b.md"), "Body text\n").unwrap();
        fs::write(dir.path().join("a.md"), "# Title\n").unwrap();
        let srcs = markdown::collect_sources(&dir.path().join("*.md").to_string_lossy()).unwrap();

        let (_, doc) = convert(&srcs, &HouseStyle::default(), &Passthrough, dir.path()).unwrap();
        let blocks: Vec<(Option<&str>, String)> = doc
            .paragraphs()
            .map(|p| (p.props.style.as_deref(), p.text()))
            .collect();
        assert_eq!(
            blocks,
            vec![
                (Some("Heading1"), "Title".to_string()),
                (None, "Body text".to_string()),
            ]
        );
        assert_eq!(doc.blocks.len(), 2);
    }

    #[test]
    fn summary_heading_applies_to_a_table_in_the_next_file() {
        let srcs = sources(&[
            ("a.md", "## Summary\n"),
            ("b.md", "| | |\n|-|-|\n| Risk | High |\n"),
        ]);
        let (_, doc) = convert(&srcs, &HouseStyle::default(), &Passthrough, Path::new("."))
            .unwrap();
        let t = doc.tables().next().unwrap();
        assert_eq!(t.cell(0, 0).props.shading.as_deref(), Some("057D9F"));
        assert_eq!(t.columns, vec![Some(1650), Some(7350)]);
    }

    #[test]
    fn oversized_border_in_raw_html_is_ignored() {
        let srcs = sources(&[(
            "a.md",
            "<div style=\"border: 4294967295px solid #000\">\n\ntext\n\n</div>\n",
        )]);
        let (_, doc) = convert(&srcs, &HouseStyle::default(), &Passthrough, Path::new("."))
            .unwrap();
        let p = doc.paragraphs().next().unwrap();
        assert_eq!(p.text(), "text");
        assert!(p.props.borders.is_none());
    }

    #[test]
    fn errors_name_the_file_and_section() {
        let srcs = sources(&[
            ("a.md", "# Intro\n"),
            ("b.md", "## Calls\n\n```reqres\nGET /x\n```\n"),
        ]);
        let err = convert(&srcs, &HouseStyle::default(), &Passthrough, Path::new("."))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::ReqresHeader { .. })
        ));
        let msg = format!("{err:#}");
        assert!(msg.contains("b.md, section \"Calls\""), "{msg}");
    }

    #[test]
    fn run_writes_a_package_and_the_html_dump() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("report.md"),
            "# Report\n\nSee [site](https://example.com).\n\n```rust\nfn main() {}\n```\n",
        )
        .unwrap();
        let out = dir.path().join("out.docx");
        let dump = dir.path().join("out.html");
        let opts = Options {
            files: dir.path().join("*.md").to_string_lossy().into_owned(),
            base_dir: dir.path().to_path_buf(),
            dump_html: Some(dump.clone()),
            ..Options::default()
        };
        run(&out, &opts).unwrap();

        let html = fs::read_to_string(&dump).unwrap();
        assert!(html.contains("data-source="));
        assert!(html.contains("font-family:Roboto Mono"));

        let mut archive = zip::ZipArchive::new(fs::File::open(&out).unwrap()).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        assert!(xml.contains("<w:pStyle w:val=\"Heading1\"/>"));
        assert!(xml.contains("<w:hyperlink r:id=\"rId10\""));
        assert!(xml.contains("w:ascii=\"Roboto Mono\""));
    }

    #[test]
    fn unknown_highlight_theme_fails_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "text\n").unwrap();
        let out = dir.path().join("out.docx");
        let opts = Options {
            files: dir.path().join("*.md").to_string_lossy().into_owned(),
            highlight_theme: Some("No Such Theme".into()),
            ..Options::default()
        };
        assert!(run(&out, &opts).is_err());
        assert!(!out.exists());
    }
}

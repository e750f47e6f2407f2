//! Markdown sources: selecting the files and turning them into one HTML body.

use crate::dom::Tree;
use anyhow::{anyhow, Context, Result};
use pulldown_cmark::{html, Options, Parser};
use std::path::PathBuf;

/// One input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub path: PathBuf,
    pub text: String,
}

/// Reads every file matching `pattern`, in lexicographic path order.
pub fn collect_sources(pattern: &str) -> Result<Vec<Source>> {
    let entries = glob::glob(pattern).with_context(|| format!("bad --files pattern {pattern:?}"))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.with_context(|| format!("expand {pattern:?}"))?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    if paths.is_empty() {
        return Err(anyhow!("no Markdown files match {pattern:?}"));
    }

    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("read {}", path.display()))?;
        log::info!("read {} ({} bytes)", path.display(), text.len());
        sources.push(Source { path, text });
    }
    Ok(sources)
}

pub fn markdown_to_html_string(md: &str) -> String {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts.insert(Options::ENABLE_FOOTNOTES);
    let parser = Parser::new_ext(md, opts);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Parses the sources, in order, into one tree whose root holds every file's
/// top-level nodes side by side. Each top-level element is tagged with a
/// `data-source` attribute naming its file, for error locations.
pub fn parse_sources(sources: &[Source]) -> Tree {
    let mut tree = Tree::new();
    let root = tree.root();
    for s in sources {
        let first = tree.children(root).len();
        tree.append_html(root, &markdown_to_html_string(&s.text));
        let name = s.path.display().to_string();
        let added = tree.children(root)[first..].to_vec();
        for id in added {
            if tree.name(id).is_some() {
                tree.set_attr(id, "data-source", &name);
            }
        }
    }
    tree
}

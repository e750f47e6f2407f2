//! Syntax highlighting for code blocks.
//!
//! A highlighter turns source text into an HTML fragment whose `<span>`s carry
//! inline `style` declarations; the annotator grafts that fragment into the
//! tree, so token colors flow through normal style resolution.

use anyhow::{anyhow, Result};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

pub trait Highlight {
    /// Highlights `code` written in `language`. An empty or unknown language
    /// yields the escaped code unchanged; any other failure is returned.
    fn highlight(&self, code: &str, language: &str) -> Result<String>;
}

pub fn escape_code(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    for ch in code.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Leaves code uncolored.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl Highlight for Passthrough {
    fn highlight(&self, code: &str, _language: &str) -> Result<String> {
        Ok(escape_code(code))
    }
}

pub struct SyntectHighlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl SyntectHighlighter {
    pub const DEFAULT_THEME: &'static str = "InspiredGitHub";

    pub fn new(theme_name: &str) -> Result<Self> {
        let mut themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .remove(theme_name)
            .ok_or_else(|| anyhow!("unknown highlighting theme {theme_name:?}"))?;
        Ok(Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }
}

impl Highlight for SyntectHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Result<String> {
        let lang = language.trim();
        if lang.is_empty() {
            return Passthrough.highlight(code, lang);
        }
        let Some(syntax) = self.syntaxes.find_syntax_by_token(lang) else {
            log::debug!("no syntax for {lang:?}, leaving code block uncolored");
            return Passthrough.highlight(code, lang);
        };

        let mut lines = HighlightLines::new(syntax, &self.theme);
        let mut out = String::with_capacity(code.len() * 4);
        for line in LinesWithEndings::from(code) {
            let regions = lines
                .highlight_line(line, &self.syntaxes)
                .map_err(|e| anyhow!("highlighting {lang} code: {e}"))?;
            let html = styled_line_to_highlighted_html(&regions[..], IncludeBackground::No)
                .map_err(|e| anyhow!("highlighting {lang} code: {e}"))?;
            out.push_str(&html);
        }
        Ok(out)
    }
}

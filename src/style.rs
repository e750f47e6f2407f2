//! Inline style declarations and their resolution along the parent chain.

use crate::dom::{NodeId, Tree};
use std::collections::BTreeMap;
use std::fmt;

/// The style properties the renderer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    FontFamily,
    FontSize,
    FontWeight,
    Color,
    TextAlign,
    TextDecorationLine,
    BackgroundColor,
    Border,
    BorderTop,
    BorderBottom,
    BorderCollapse,
    Width,
}

impl Property {
    pub const ALL: [Property; 12] = [
        Property::FontFamily,
        Property::FontSize,
        Property::FontWeight,
        Property::Color,
        Property::TextAlign,
        Property::TextDecorationLine,
        Property::BackgroundColor,
        Property::Border,
        Property::BorderTop,
        Property::BorderBottom,
        Property::BorderCollapse,
        Property::Width,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Property::FontFamily => "font-family",
            Property::FontSize => "font-size",
            Property::FontWeight => "font-weight",
            Property::Color => "color",
            Property::TextAlign => "text-align",
            Property::TextDecorationLine => "text-decoration-line",
            Property::BackgroundColor => "background-color",
            Property::Border => "border",
            Property::BorderTop => "border-top",
            Property::BorderBottom => "border-bottom",
            Property::BorderCollapse => "border-collapse",
            Property::Width => "width",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }
}

/// An element's own style: property → raw value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declaration(BTreeMap<Property, String>);

impl Declaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `style` attribute (`key:value;key:value`). Properties outside
    /// the known vocabulary are dropped.
    pub fn parse(s: &str) -> Self {
        let mut out = Self::new();
        for item in s.split(';') {
            let Some((k, v)) = item.split_once(':') else {
                continue;
            };
            let v = v.trim();
            if v.is_empty() {
                continue;
            }
            match Property::parse(k) {
                Some(p) => out.set(p, v),
                None => log::debug!("dropping unsupported style property {:?}", k.trim()),
            }
        }
        out
    }

    pub fn with(mut self, p: Property, value: impl Into<String>) -> Self {
        self.set(p, value);
        self
    }

    pub fn set(&mut self, p: Property, value: impl Into<String>) {
        self.0.insert(p, value.into());
    }

    pub fn remove(&mut self, p: Property) -> Option<String> {
        self.0.remove(&p)
    }

    pub fn get(&self, p: Property) -> Option<&str> {
        self.0.get(&p).map(String::as_str)
    }

    pub fn contains(&self, p: Property) -> bool {
        self.0.contains_key(&p)
    }

    /// Overlays `closer` onto `self`; keys present in both take `closer`'s value.
    pub fn merge(&mut self, closer: &Declaration) {
        for (k, v) in &closer.0 {
            self.0.insert(*k, v.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in &self.0 {
            if !first {
                f.write_str(";")?;
            }
            first = false;
            write!(f, "{}:{}", k.name(), v)?;
        }
        Ok(())
    }
}

/// The declaration stored on `id` itself, if it has one.
pub fn own_style(tree: &Tree, id: NodeId) -> Option<Declaration> {
    tree.attr(id, "style").map(Declaration::parse)
}

pub fn set_own_style(tree: &mut Tree, id: NodeId, decl: &Declaration) {
    tree.set_attr(id, "style", &decl.to_string());
}

/// Folds the own declarations from the root down to `id`; closer ancestors win.
///
/// Reads the current tree every time, so it always reflects prior mutations.
pub fn effective_style(tree: &Tree, id: NodeId) -> Declaration {
    let mut chain = tree.ancestors(id);
    chain.reverse();
    chain.push(id);

    let mut out = Declaration::new();
    for n in chain {
        if let Some(decl) = own_style(tree, n) {
            out.merge(&decl);
        }
    }
    out
}

/// Converts a length (`11pt`, `1px`, `0.5in`) to points.
pub fn points(v: &str) -> Option<f32> {
    let v = v.trim();
    let (num, factor) = if let Some(n) = v.strip_suffix("pt") {
        (n, 1.0)
    } else if let Some(n) = v.strip_suffix("px") {
        (n, 0.75)
    } else if let Some(n) = v.strip_suffix("in") {
        (n, 72.0)
    } else {
        return None;
    };
    let n: f32 = num.trim().parse().ok()?;
    if !n.is_finite() || n < 0.0 {
        return None;
    }
    Some(n * factor)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `RRGGBB`, the form WordprocessingML attributes take.
    pub fn hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("black", Rgb(0, 0, 0)),
    ("white", Rgb(255, 255, 255)),
    ("red", Rgb(255, 0, 0)),
    ("green", Rgb(0, 128, 0)),
    ("blue", Rgb(0, 0, 255)),
    ("gray", Rgb(128, 128, 128)),
    ("grey", Rgb(128, 128, 128)),
    ("silver", Rgb(192, 192, 192)),
    ("navy", Rgb(0, 0, 128)),
    ("teal", Rgb(0, 128, 128)),
    ("maroon", Rgb(128, 0, 0)),
    ("orange", Rgb(255, 165, 0)),
    ("purple", Rgb(128, 0, 128)),
];

pub fn color(v: &str) -> Option<Rgb> {
    let v = v.trim();
    if let Some(hex) = v.strip_prefix('#') {
        let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        return match hex.len() {
            3 => Some(Rgb(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
            6 => Some(Rgb(byte(0)?, byte(2)?, byte(4)?)),
            _ => None,
        };
    }
    NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(v))
        .map(|(_, rgb)| *rgb)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
    Justify,
}

impl Align {
    pub fn parse(v: &str) -> Option<Self> {
        match v.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Align::Left),
            "center" => Some(Align::Center),
            "right" | "end" => Some(Align::Right),
            "justify" => Some(Align::Justify),
            _ => None,
        }
    }
}

pub fn is_bold(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "bold" | "bolder" | "600" | "700" | "800" | "900" => Some(true),
        "normal" | "lighter" | "100" | "200" | "300" | "400" | "500" => Some(false),
        _ => None,
    }
}

/// Widest border accepted, in pixels.
const MAX_BORDER_PX: u32 = 96;

/// A `<width>px <style> <color>` border shorthand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderSpec {
    pub width_px: u32,
    pub line: &'static str,
    pub color: Rgb,
}

impl BorderSpec {
    pub fn parse(v: &str) -> Option<Self> {
        let parts: Vec<&str> = v.split_whitespace().collect();
        let [width, line, col] = parts.as_slice() else {
            return None;
        };
        let width_px: u32 = width.strip_suffix("px")?.parse().ok()?;
        if width_px > MAX_BORDER_PX {
            return None;
        }
        let line = match line.to_ascii_lowercase().as_str() {
            "solid" => "single",
            "dashed" => "dashed",
            "dotted" => "dotted",
            "double" => "double",
            _ => return None,
        };
        Some(Self {
            width_px,
            line,
            color: color(col)?,
        })
    }

    /// Border weight in eighths of a point.
    pub fn eighths(self) -> u32 {
        self.width_px * 2
    }
}

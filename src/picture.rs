//! Pictures: locating image files, framing them and sizing them for the page.

use crate::error::InputError;
use crate::style::BorderSpec;
use anyhow::{Context, Result};
use image::codecs::png::PngEncoder;
use image::{imageops, ColorType, ImageEncoder, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

/// A decoded picture re-encoded as PNG, ready to embed.
#[derive(Debug, Clone)]
pub struct Picture {
    pub png: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

impl Picture {
    /// Display extent in EMUs: `width_pt` wide (natural size at 96 dpi when
    /// absent), height following the aspect ratio.
    pub fn extent(&self, width_pt: Option<f32>) -> (u64, u64) {
        let natural = self.width_px as f32 * 0.75;
        let width = width_pt.unwrap_or(natural);
        let height = if self.width_px == 0 {
            0.0
        } else {
            width * self.height_px as f32 / self.width_px as f32
        };
        (crate::docx::emu(width), crate::docx::emu(height))
    }
}

/// Resolves an `<img src>` against `base_dir`. Only local files are accepted.
pub fn resolve(base_dir: &Path, src: Option<&str>) -> Result<PathBuf> {
    let src = src.map(str::trim).filter(|s| !s.is_empty());
    let Some(src) = src else {
        return Err(InputError::MissingImageSource.into());
    };
    if src.contains("://") {
        return Err(InputError::RemoteImage { src: src.to_string() }.into());
    }
    let src = src.strip_prefix("file:").unwrap_or(src);
    Ok(base_dir.join(src))
}

/// Loads `path`, drawing `border` around it when given.
pub fn load(path: &Path, border: Option<BorderSpec>) -> Result<Picture> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let decoded =
        image::load_from_memory(&bytes).with_context(|| format!("decode {}", path.display()))?;
    let mut rgba = decoded.to_rgba8();
    if let Some(border) = border {
        rgba = framed(&rgba, border);
    }
    let (width_px, height_px) = rgba.dimensions();
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(rgba.as_raw(), width_px, height_px, ColorType::Rgba8.into())
        .with_context(|| format!("encode {}", path.display()))?;
    log::debug!("loaded {} ({width_px}x{height_px})", path.display());
    Ok(Picture {
        png,
        width_px,
        height_px,
    })
}

/// A copy of `img` surrounded by a solid frame of `border.width_px` pixels.
fn framed(img: &RgbaImage, border: BorderSpec) -> RgbaImage {
    let b = border.width_px;
    let (w, h) = img.dimensions();
    let c = border.color;
    let mut out = RgbaImage::from_pixel(w + 2 * b, h + 2 * b, Rgba([c.0, c.1, c.2, 255]));
    imageops::overlay(&mut out, img, i64::from(b), i64::from(b));
    out
}

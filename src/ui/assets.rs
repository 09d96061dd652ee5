//! Sprite files for the terminal backend.
//!
//! `<assets_dir>/<name>.txt`:
//!   line 1: the glyph (first character)
//!   line 2: optional colour as `r,g,b`
//!
//! A missing or empty file is an `AssetLoadError`; the caller substitutes a
//! solid block in the fallback colour.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::AssetLoadError;
use super::{Rgb, SpriteHandle};

/// Glyph used when a sprite file cannot be loaded.
pub const FALLBACK_GLYPH: char = '█';

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Glyph {
    pub ch: char,
    pub color: Option<Rgb>,
}

pub fn load_glyph(assets_dir: &Path, name: &str) -> Result<Glyph, AssetLoadError> {
    let path = assets_dir.join(format!("{name}.txt"));
    let text = std::fs::read_to_string(&path)
        .map_err(|source| AssetLoadError::Io { path: path.clone(), source })?;

    let mut lines = text.lines();
    let ch = lines
        .next()
        .and_then(|l| l.chars().find(|c| !c.is_whitespace()))
        .ok_or_else(|| AssetLoadError::NoGlyph { path: path.clone() })?;

    let color = lines.next().map(str::trim).filter(|l| !l.is_empty()).and_then(|l| {
        let parsed = parse_rgb(l);
        if parsed.is_none() {
            debug!("sprite {}: ignoring bad colour line {:?}", path.display(), l);
        }
        parsed
    });

    Ok(Glyph { ch, color })
}

/// Load `name`, or fall back to a solid block in `fallback`.
pub fn load_sprite(assets_dir: &Path, name: &str, fallback: Rgb) -> SpriteHandle {
    match load_glyph(assets_dir, name) {
        Ok(glyph) => SpriteHandle {
            name: name.to_string(),
            glyph: glyph.ch,
            color: glyph.color.unwrap_or(fallback),
        },
        Err(e) => {
            warn!("{e}; using fallback");
            SpriteHandle { name: name.to_string(), glyph: FALLBACK_GLYPH, color: fallback }
        }
    }
}

fn parse_rgb(s: &str) -> Option<Rgb> {
    let mut parts = s.split(',').map(|p| p.trim().parse::<u8>());
    let (r, g, b) = (parts.next()?.ok()?, parts.next()?.ok()?, parts.next()?.ok()?);
    if parts.next().is_some() {
        return None;
    }
    Some(Rgb::new(r, g, b))
}

//! Nested blockquote backgrounds.
//!
//! Each nesting level mixes a little more of an overlay color into the page
//! background, in Lab so the steps look even. Dark pages mix toward white,
//! light pages toward a neutral slate.

use crate::color::{Color, ColorSpace};
use crate::contrast::ThemeKind;
use crate::error::{Error, Result};

pub const DEFAULT_LEVEL_COUNT: usize = 5;

const OVERLAY_DARK: Color = Color::WHITE;
const OVERLAY_LIGHT: Color = Color::rgb(0x4a, 0x55, 0x68);

// Alpha of the first level, grown by ALPHA_STEP per level.
// Dark pages start stronger since small white overlays barely show.
const BASE_ALPHA_DARK: f64 = 0.08;
const BASE_ALPHA_LIGHT: f64 = 0.05;
const ALPHA_STEP: f64 = 0.03;
const MAX_MIX_RATIO: f64 = 0.4;

/// Used in place of computed levels when generation fails.
const FALLBACK_LEVELS_DARK: [&str; DEFAULT_LEVEL_COUNT] = [
    "rgba(255, 255, 255, 0.04)",
    "rgba(255, 255, 255, 0.06)",
    "rgba(255, 255, 255, 0.08)",
    "rgba(255, 255, 255, 0.1)",
    "rgba(255, 255, 255, 0.12)",
];
const FALLBACK_LEVELS_LIGHT: [&str; DEFAULT_LEVEL_COUNT] = [
    "rgba(0, 0, 0, 0.02)",
    "rgba(0, 0, 0, 0.035)",
    "rgba(0, 0, 0, 0.05)",
    "rgba(0, 0, 0, 0.065)",
    "rgba(0, 0, 0, 0.08)",
];

/// Mix ratio toward the overlay for a zero-based level index.
fn mix_ratio(kind: ThemeKind, index: usize) -> f64 {
    let base_alpha = if kind.is_dark() {
        BASE_ALPHA_DARK
    } else {
        BASE_ALPHA_LIGHT
    };
    let alpha = base_alpha + ALPHA_STEP * index as f64;
    (alpha * 2.0).min(MAX_MIX_RATIO)
}

/// Generate `level_count` backgrounds for nested blockquotes, subtlest first.
///
/// The overlay is chosen from the base color's own dark/light class.
pub fn generate_levels(base: &Color, level_count: usize) -> Result<Vec<Color>> {
    if level_count == 0 {
        return Err(Error::Degenerate(
            "blockquote level count must be at least 1".to_string(),
        ));
    }

    let kind = ThemeKind::of(base);
    let overlay = if kind.is_dark() {
        OVERLAY_DARK
    } else {
        OVERLAY_LIGHT
    };

    Ok((0..level_count)
        .map(|index| base.mix(&overlay, mix_ratio(kind, index), ColorSpace::Lab))
        .collect())
}

/// The static level set for a theme kind.
pub fn fallback_levels(kind: ThemeKind) -> [&'static str; DEFAULT_LEVEL_COUNT] {
    match kind {
        ThemeKind::Dark => FALLBACK_LEVELS_DARK,
        ThemeKind::Light => FALLBACK_LEVELS_LIGHT,
    }
}

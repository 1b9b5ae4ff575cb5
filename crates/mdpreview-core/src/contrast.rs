//! WCAG contrast ratio and dark/light theme classification.

use crate::color::Color;
use crate::error::Result;

/// Backgrounds with luminance below this are dark.
pub const DARK_LUMINANCE_THRESHOLD: f64 = 0.5;

/// Whether a theme draws light text on a dark page or the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeKind {
    Dark,
    Light,
}

impl ThemeKind {
    pub fn is_dark(self) -> bool {
        self == ThemeKind::Dark
    }

    pub fn of(color: &Color) -> Self {
        if color.luminance() < DARK_LUMINANCE_THRESHOLD {
            ThemeKind::Dark
        } else {
            ThemeKind::Light
        }
    }
}

/// WCAG contrast ratio, in [1, 21]. Symmetric in its arguments.
///
/// Returns 1.0 if either luminance is not finite.
pub fn contrast_ratio(a: &Color, b: &Color) -> f64 {
    let la = a.luminance();
    let lb = b.luminance();
    if !la.is_finite() || !lb.is_finite() {
        return 1.0;
    }
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Contrast ratio between two CSS color strings; 1.0 if either fails to parse.
pub fn contrast_ratio_str(a: &str, b: &str) -> f64 {
    match (Color::parse(a), Color::parse(b)) {
        (Ok(a), Ok(b)) => contrast_ratio(&a, &b),
        _ => 1.0,
    }
}

/// Classify a background color, reporting parse failures.
pub fn classify(background: &str) -> Result<ThemeKind> {
    Color::parse(background).map(|color| ThemeKind::of(&color))
}

/// Return true if the background is dark. Unparseable colors count as light.
pub fn is_dark(background: &str) -> bool {
    classify(background).is_ok_and(ThemeKind::is_dark)
}

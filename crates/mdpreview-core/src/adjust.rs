//! Contrast adjustment of derived colors.
//!
//! Two strategies:
//!
//! - [`find_contrasting_color`] walks HSL lightness away from a base color in
//!   fixed steps until the WCAG contrast against the base reaches a minimum.
//!   Used for borders and selection backgrounds.
//! - [`adjust_contrast_color`] nudges a color by a luminance-dependent amount
//!   in one shot. Used for table header and code block backgrounds.
//!
//! ```text
//! 0.0 ──────────┬──────────────┬──────────────┬────────── 1.0
//!          dark_threshold   midpoint   light_threshold
//!     brighten  │    darken/2  │  brighten/2  │  darken
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::color::Color;
use crate::contrast::contrast_ratio;

// Lightness search: first jump, per-iteration step and bounds.
const SEARCH_INITIAL_OFFSET: f64 = 0.3;
const SEARCH_STEP: f64 = 0.1;
const SEARCH_MAX_ITERATIONS: usize = 10;
const SEARCH_MIN_LIGHTNESS: f64 = 0.05;
const SEARCH_MAX_LIGHTNESS: f64 = 0.9;
// The first target never lands on pure black or white.
const SEARCH_DARKEN_FLOOR: f64 = 0.1;
const SEARCH_LIGHTEN_CEILING: f64 = 0.8;

/// Alpha of the translucent fallback returned when the search gives up.
const SEARCH_FALLBACK_ALPHA: f64 = 0.4;

/// Which way [`find_contrasting_color`] moves lightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Lighten,
    Darken,
}

impl SearchDirection {
    /// Translucent white when lightening, translucent black when darkening.
    pub fn fallback(self) -> Color {
        match self {
            SearchDirection::Lighten => Color::WHITE.with_alpha(SEARCH_FALLBACK_ALPHA),
            SearchDirection::Darken => Color::BLACK.with_alpha(SEARCH_FALLBACK_ALPHA),
        }
    }

    fn initial_target(self, lightness: f64) -> f64 {
        match self {
            SearchDirection::Lighten => (lightness + SEARCH_INITIAL_OFFSET).min(SEARCH_LIGHTEN_CEILING),
            SearchDirection::Darken => (lightness - SEARCH_INITIAL_OFFSET).max(SEARCH_DARKEN_FLOOR),
        }
    }

    fn step(self, target: f64) -> f64 {
        let next = match self {
            SearchDirection::Lighten => target + SEARCH_STEP,
            SearchDirection::Darken => target - SEARCH_STEP,
        };
        next.clamp(SEARCH_MIN_LIGHTNESS, SEARCH_MAX_LIGHTNESS)
    }
}

/// Return the first lightness variant of `base` with at least `min_contrast`
/// against it, or `None` after the bounded number of steps.
pub fn search_contrasting_color(
    base: &Color,
    direction: SearchDirection,
    min_contrast: f64,
) -> Option<Color> {
    let mut target = direction.initial_target(base.lightness());

    for _ in 0..SEARCH_MAX_ITERATIONS {
        let candidate = base.set_lightness(target);
        if contrast_ratio(base, &candidate) >= min_contrast {
            return Some(candidate);
        }
        target = direction.step(target);
    }

    None
}

/// Like [`search_contrasting_color`], substituting the direction's
/// translucent fallback when no step reaches `min_contrast`.
pub fn find_contrasting_color(
    base: &Color,
    direction: SearchDirection,
    min_contrast: f64,
) -> Color {
    search_contrasting_color(base, direction, min_contrast).unwrap_or_else(|| {
        let fallback = direction.fallback();
        warn!(
            "No {:?} variant of {} reaches contrast {:.2}, using {}",
            direction,
            base,
            min_contrast,
            fallback.to_css()
        );
        fallback
    })
}

/// Luminance zones and step size for [`adjust_contrast_color`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContrastParams {
    /// Colors darker than this are brightened by the full amount.
    pub dark_threshold: f64,

    /// Colors lighter than this are darkened by the full amount.
    pub light_threshold: f64,

    /// Full adjustment, in `Color::brighten` units.
    pub adjustment_amount: f64,
}

impl Default for ContrastParams {
    fn default() -> Self {
        Self {
            dark_threshold: 0.2,
            light_threshold: 0.8,
            adjustment_amount: 0.28,
        }
    }
}

impl ContrastParams {
    pub fn midpoint(&self) -> f64 {
        (self.dark_threshold + self.light_threshold) / 2.0
    }

    /// Copy with a different adjustment amount.
    pub fn with_amount(self, adjustment_amount: f64) -> Self {
        Self {
            adjustment_amount,
            ..self
        }
    }
}

/// Push a color away from the middle of the luminance range.
///
/// Extreme colors move by the full amount toward the center; moderate ones
/// move by half the amount away from the midpoint.
pub fn adjust_contrast_color(input: &Color, params: &ContrastParams) -> Color {
    let luminance = input.luminance();
    let amount = params.adjustment_amount;

    if luminance < params.dark_threshold {
        input.brighten(amount)
    } else if luminance > params.light_threshold {
        input.darken(amount)
    } else if luminance < params.midpoint() {
        input.darken(amount / 2.0)
    } else {
        input.brighten(amount / 2.0)
    }
}

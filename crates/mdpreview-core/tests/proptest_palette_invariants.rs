//! Property-based invariant tests for color math and the enhanced palette.
//!
//! 1. Hex output parses back to the same color.
//! 2. Contrast ratio is symmetric, bounded to [1, 21], and 1 against itself.
//! 3. `is_dark` agrees with relative luminance below 0.5.
//! 4. Contrast search either meets the minimum or returns the fallback.
//! 5. Blockquote levels are distinct and drift away from the base.
//! 6. Every derived palette value is a parseable color, for any input.
//! 7. Palette building is deterministic.
//! 8. Parsing arbitrary strings never panics.

use mdpreview_core::{
    Color, EnhancedPalette, SearchDirection, ThemeColors, contrast_ratio, find_contrasting_color,
    generate_levels, is_dark,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn opaque_color() -> impl Strategy<Value = Color> {
    (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Color::rgb(r, g, b))
}

fn any_color() -> impl Strategy<Value = Color> {
    (any::<u8>(), any::<u8>(), any::<u8>(), any::<u8>())
        .prop_map(|(r, g, b, a)| Color::rgba(r, g, b, a as f64 / 255.0))
}

/// Theme values: mostly real colors, some garbage.
fn theme_value() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => opaque_color().prop_map(|c| c.to_hex()),
        1 => any_color().prop_map(|c| c.to_css()),
        1 => ".{0,16}",
    ]
}

const DERIVED_KEYS: &[&str] = &[
    "markdown.tableHeader.background",
    "markdown.codeBlock.background",
    "markdown.blockQuote.background",
    "markdown.blockQuote.border",
    "markdown.table.border",
    "markdown.strong.foreground",
    "editor.selectionBackground",
    "editor.foreground",
];

// ═════════════════════════════════════════════════════════════════════════
// 1. Hex output parses back to the same color
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn hex_parses_back(color in any_color()) {
        let parsed = Color::parse(&color.to_hex()).unwrap();
        prop_assert_eq!(parsed, color);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Contrast ratio bounds and symmetry
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn contrast_is_symmetric_and_bounded(a in opaque_color(), b in opaque_color()) {
        let ab = contrast_ratio(&a, &b);
        let ba = contrast_ratio(&b, &a);
        prop_assert!((ab - ba).abs() < 1e-12, "{} vs {}", ab, ba);
        prop_assert!((1.0..=21.0 + 1e-9).contains(&ab), "out of range: {}", ab);
        prop_assert!((contrast_ratio(&a, &a) - 1.0).abs() < 1e-12);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. is_dark iff luminance < 0.5
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn is_dark_matches_luminance(color in opaque_color()) {
        prop_assert_eq!(is_dark(&color.to_hex()), color.luminance() < 0.5);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Contrast search meets the minimum or falls back
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn contrasting_color_meets_minimum_or_falls_back(
        base in opaque_color(),
        lighten in any::<bool>(),
        min_contrast in 1.0f64..=21.0,
    ) {
        let direction = if lighten { SearchDirection::Lighten } else { SearchDirection::Darken };
        let found = find_contrasting_color(&base, direction, min_contrast);
        prop_assert!(
            found == direction.fallback() || contrast_ratio(&base, &found) >= min_contrast,
            "{} -> {} (contrast {:.3}, wanted {:.3})",
            base, found, contrast_ratio(&base, &found), min_contrast
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Blockquote levels are distinct and move away from the base
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn levels_are_distinct_and_ordered(base in opaque_color()) {
        let levels = generate_levels(&base, 5).unwrap();
        prop_assert_eq!(levels.len(), 5);

        for pair in levels.windows(2) {
            prop_assert_ne!(pair[0], pair[1], "adjacent levels equal for {}", base);
            prop_assert!(
                base.delta_e(&pair[1]) >= base.delta_e(&pair[0]),
                "level distance shrank for {}: {} then {}",
                base, pair[0], pair[1]
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Every derived value parses, whatever the theme holds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn derived_values_always_parse(
        background in theme_value(),
        foreground in theme_value(),
        quirky in any::<bool>(),
    ) {
        let theme = ThemeColors::from_pairs([
            ("editor.background", background.as_str()),
            ("editor.foreground", foreground.as_str()),
        ]);
        let name = if quirky { Some("min-dark") } else { None };
        let palette = EnhancedPalette::from_theme(&theme, name);

        for key in DERIVED_KEYS {
            let value = palette.get(key);
            prop_assert!(value.is_some(), "missing {}", key);
            prop_assert!(
                Color::parse(value.unwrap_or_default()).is_ok(),
                "{} = {:?} does not parse (bg {:?}, fg {:?})",
                key, value, background, foreground
            );
        }
        prop_assert_eq!(palette.blockquote_level_count(), 5);
        for (key, value) in palette.iter() {
            prop_assert!(Color::parse(value).is_ok(), "{} = {:?}", key, value);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn build_is_deterministic(background in theme_value(), foreground in theme_value()) {
        let theme = ThemeColors::from_pairs([
            ("editor.background", background),
            ("editor.foreground", foreground),
        ]);
        let first = EnhancedPalette::from_theme(&theme, Some("synthwave-84"));
        let second = EnhancedPalette::from_theme(&theme, Some("synthwave-84"));
        prop_assert_eq!(first.css_vars_block(&theme), second.css_vars_block(&theme));
        prop_assert_eq!(first, second);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. No panics on arbitrary input
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn parse_never_panics(input in ".{0,40}") {
        let _ = Color::parse(&input);
        let _ = is_dark(&input);
    }

    #[test]
    fn malformed_hex_is_rejected(digits in "[0-9a-fA-F]{0,10}") {
        let parsed = Color::parse(&format!("#{}", digits));
        prop_assert_eq!(parsed.is_ok(), matches!(digits.len(), 3 | 4 | 6 | 8));
    }
}

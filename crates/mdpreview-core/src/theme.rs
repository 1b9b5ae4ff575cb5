//! Theme-aware palette for the Markdown preview.
//!
//! `EnhancedPalette` takes the flat color map of a syntax-highlighting theme
//! and derives the secondary colors the preview needs (table headers, code
//! blocks, nested blockquotes, borders, selection, bold text). Every derived
//! key always holds a valid CSS color: each derivation step that fails is
//! replaced by a static fallback and logged, without affecting the others.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::adjust::{ContrastParams, SearchDirection, adjust_contrast_color, find_contrasting_color};
use crate::color::Color;
use crate::config::PreviewConfig;
use crate::contrast::ThemeKind;
use crate::error::{Error, Result};
use crate::levels::{DEFAULT_LEVEL_COUNT, fallback_levels, generate_levels};
use crate::quirks::{ThemeProfile, ThemeQuirk};

// Raw theme keys
pub const KEY_BACKGROUND: &str = "editor.background";
pub const KEY_FOREGROUND: &str = "editor.foreground";
pub const KEY_SELECTION: &str = "editor.selectionBackground";

// Derived keys
pub const KEY_TABLE_HEADER: &str = "markdown.tableHeader.background";
pub const KEY_CODE_BLOCK: &str = "markdown.codeBlock.background";
pub const KEY_BLOCKQUOTE: &str = "markdown.blockQuote.background";
pub const KEY_BLOCKQUOTE_BORDER: &str = "markdown.blockQuote.border";
pub const KEY_TABLE_BORDER: &str = "markdown.table.border";
pub const KEY_STRONG: &str = "markdown.strong.foreground";

/// Theme colors assumed when a theme doesn't define them.
pub const BASE_COLORS: &[(&str, &str)] = &[
    ("editor.background", "#ffffff"),
    ("editor.foreground", "#24292e"),
    ("editor.lineHighlightBackground", "#f6f8fa"),
    ("editorLineNumber.foreground", "#6a737d"),
    ("panel.border", "#d0d7de"),
    ("editor.selectionBackground", "rgba(175,184,193,0.2)"),
    ("textLink.foreground", "#0969da"),
    ("textCodeBlock.background", "#f6f8fa"),
    ("editor.foldBackground", "rgba(175,184,193,0.15)"),
    ("textBlockQuote.background", "rgba(175,184,193,0.1)"),
];

// Code blocks get a gentler nudge than table headers.
const CODE_BLOCK_ADJUSTMENT: f64 = 0.2;
const TABLE_BORDER_ALPHA: f64 = 0.5;
// In `Color::brighten` units.
const DIM_FOREGROUND_BRIGHTEN: f64 = 1.5;
const STRONG_EMPHASIS: f64 = 0.6;

/// Static values used when a derivation step fails.
struct Fallbacks {
    table_header: &'static str,
    code_block: &'static str,
    blockquote_border: &'static str,
    table_border: &'static str,
    foreground: &'static str,
}

const FALLBACKS_DARK: Fallbacks = Fallbacks {
    table_header: "#2d2d2d",
    code_block: "#262626",
    blockquote_border: "rgba(255, 255, 255, 0.4)",
    table_border: "rgba(255, 255, 255, 0.2)",
    foreground: "#d4d4d4",
};

const FALLBACKS_LIGHT: Fallbacks = Fallbacks {
    table_header: "#f6f8fa",
    code_block: "#f6f8fa",
    blockquote_border: "rgba(0, 0, 0, 0.4)",
    table_border: "rgba(0, 0, 0, 0.2)",
    foreground: "#24292e",
};

/// Neutral enough to show on either page color.
const FALLBACK_SELECTION: &str = "rgba(175, 184, 193, 0.3)";

impl Fallbacks {
    fn for_kind(kind: ThemeKind) -> &'static Fallbacks {
        match kind {
            ThemeKind::Dark => &FALLBACKS_DARK,
            ThemeKind::Light => &FALLBACKS_LIGHT,
        }
    }
}

/// Name of the nth (one-based) blockquote level key.
pub fn blockquote_level_key(level: usize) -> String {
    format!("{}.level{}", KEY_BLOCKQUOTE, level)
}

/// CSS custom property name for a theme key: `editor.background` becomes
/// `--editor-background`.
pub fn css_var_name(key: &str) -> String {
    format!("--{}", key.replace('.', "-"))
}

/// `var(--derived, var(--raw))`, for rules that should survive a missing
/// derived key.
pub fn css_fallback_var(key: &str, raw_key: &str) -> String {
    format!("var({}, var({}))", css_var_name(key), css_var_name(raw_key))
}

/// Flat key → CSS color map of a highlighting theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeColors(BTreeMap<String, String>);

impl ThemeColors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The theme's colors laid over [`BASE_COLORS`].
    pub fn with_defaults(&self) -> Self {
        let mut merged: BTreeMap<String, String> = BASE_COLORS
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect();
        merged.extend(self.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self(merged)
    }

    /// Look up a key that [`BASE_COLORS`] always provides after
    /// [`ThemeColors::with_defaults`].
    fn base(&self, key: &'static str) -> &str {
        self.get(key)
            .or_else(|| {
                BASE_COLORS
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| *v)
            })
            .unwrap_or_default()
    }
}

/// A highlighting theme as its bundle serializes it. Only the name and
/// color map are read; token rules and other fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemeFile {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub colors: ThemeColors,
}

impl ThemeFile {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Settings for [`EnhancedPalette::build`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteOptions {
    pub contrast: ContrastParams,
    pub blockquote_levels: usize,
    pub border_min_contrast: f64,
    pub selection_min_contrast: f64,
}

impl Default for PaletteOptions {
    fn default() -> Self {
        Self {
            contrast: ContrastParams::default(),
            blockquote_levels: DEFAULT_LEVEL_COUNT,
            border_min_contrast: 3.0,
            selection_min_contrast: 4.5,
        }
    }
}

/// Colors derived from a theme.
///
/// Constructed via `EnhancedPalette::build(&colors, &profile, &options)`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancedPalette {
    /// Dark/light class of the page background (light if unparseable).
    pub kind: ThemeKind,
    colors: BTreeMap<String, String>,
}

impl EnhancedPalette {
    /// Build with default options, resolving quirks from `theme_name`.
    pub fn from_theme(theme: &ThemeColors, theme_name: Option<&str>) -> Self {
        let profile = ThemeProfile::from_name(theme_name, &[]);
        Self::build(theme, &profile, &PaletteOptions::default())
    }

    /// Derive the enhanced colors for a theme.
    pub fn build(theme: &ThemeColors, profile: &ThemeProfile, options: &PaletteOptions) -> Self {
        let theme = theme.with_defaults();
        let background = theme.base(KEY_BACKGROUND);
        let foreground = theme.base(KEY_FOREGROUND);

        let kind = match Color::parse(background) {
            Ok(color) => ThemeKind::of(&color),
            Err(e) => {
                warn!("Treating theme as light: {}", e);
                ThemeKind::Light
            }
        };
        let fallbacks = Fallbacks::for_kind(kind);
        let mut colors = BTreeMap::new();

        let table_header = Color::parse(background)
            .map(|bg| adjust_contrast_color(&bg, &options.contrast).to_hex());
        colors.insert(
            KEY_TABLE_HEADER.to_string(),
            or_fallback(KEY_TABLE_HEADER, table_header, fallbacks.table_header),
        );

        let code_block = Color::parse(background).map(|bg| {
            adjust_contrast_color(&bg, &options.contrast.with_amount(CODE_BLOCK_ADJUSTMENT))
                .to_hex()
        });
        colors.insert(
            KEY_CODE_BLOCK.to_string(),
            or_fallback(KEY_CODE_BLOCK, code_block, fallbacks.code_block),
        );

        let levels = blockquote_levels(background, kind, options.blockquote_levels);
        if let Some(first) = levels.first() {
            colors.insert(KEY_BLOCKQUOTE.to_string(), first.clone());
        }
        for (index, level) in levels.into_iter().enumerate() {
            colors.insert(blockquote_level_key(index + 1), level);
        }

        // Dark pages get a lighter border and light pages a darker one, so the
        // border always stands out from the page. Searching from the opaque
        // background keeps a translucent page from leaking into the border.
        let border = Color::parse(background).map(|bg| {
            let direction = match kind {
                ThemeKind::Dark => SearchDirection::Lighten,
                ThemeKind::Light => SearchDirection::Darken,
            };
            find_contrasting_color(&bg.with_alpha(1.0), direction, options.border_min_contrast)
        });
        let (blockquote_border, table_border) = match border {
            Ok(border) => (
                border.to_hex(),
                border.with_alpha(TABLE_BORDER_ALPHA).to_hex(),
            ),
            Err(e) => {
                warn!("{}: {}, using fallback", KEY_BLOCKQUOTE_BORDER, e);
                (
                    fallbacks.blockquote_border.to_string(),
                    fallbacks.table_border.to_string(),
                )
            }
        };
        colors.insert(KEY_BLOCKQUOTE_BORDER.to_string(), blockquote_border);
        colors.insert(KEY_TABLE_BORDER.to_string(), table_border);

        match Color::parse(foreground) {
            Ok(fg) => {
                let brighten = profile.has(ThemeQuirk::BrightenForeground);
                let fg = if brighten {
                    fg.brighten(DIM_FOREGROUND_BRIGHTEN)
                } else {
                    fg
                };

                let foreground_value = if brighten {
                    fg.to_hex()
                } else {
                    foreground.trim().to_string()
                };
                colors.insert(KEY_FOREGROUND.to_string(), foreground_value);

                let direction = match ThemeKind::of(&fg) {
                    ThemeKind::Dark => SearchDirection::Lighten,
                    ThemeKind::Light => SearchDirection::Darken,
                };
                let selection = find_contrasting_color(&fg, direction, options.selection_min_contrast);
                colors.insert(KEY_SELECTION.to_string(), selection.to_hex());

                colors.insert(KEY_STRONG.to_string(), strong_foreground(&fg, kind).to_hex());
            }
            Err(e) => {
                warn!("{}: {}, using fallbacks for foreground-derived colors", KEY_FOREGROUND, e);
                colors.insert(KEY_FOREGROUND.to_string(), fallbacks.foreground.to_string());
                colors.insert(KEY_SELECTION.to_string(), FALLBACK_SELECTION.to_string());
                colors.insert(KEY_STRONG.to_string(), fallbacks.foreground.to_string());
            }
        }

        debug!(
            "Derived {} colors for {} theme {}",
            colors.len(),
            if kind.is_dark() { "dark" } else { "light" },
            profile.name.as_deref().unwrap_or("<unnamed>")
        );

        Self { kind, colors }
    }

    pub fn is_dark(&self) -> bool {
        self.kind.is_dark()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.colors.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Derived keys and values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of blockquote levels present.
    pub fn blockquote_level_count(&self) -> usize {
        (1..)
            .take_while(|level| self.colors.contains_key(&blockquote_level_key(*level)))
            .count()
    }

    /// The theme's colors (over defaults) with derived keys laid on top.
    pub fn merged_with(&self, theme: &ThemeColors) -> ThemeColors {
        let mut merged = theme.with_defaults();
        merged
            .0
            .extend(self.colors.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    /// Generate the `:root` CSS variable block for a theme and this palette.
    pub fn css_vars_block(&self, theme: &ThemeColors) -> String {
        let merged = self.merged_with(theme);
        let mut out = String::from(":root {\n");
        for (key, value) in merged.iter() {
            out.push_str(&format!("    {}: {};\n", css_var_name(key), value));
        }
        out.push_str("}\n");
        out
    }

    /// Full preview stylesheet: variables plus the element rules that use them.
    pub fn preview_css(&self, theme: &ThemeColors, preview: &PreviewConfig) -> String {
        let mut css = self.css_vars_block(theme);

        css.push_str(&format!(
            r#"
body {{
    background-color: var(--editor-background);
    color: var(--editor-foreground);
    font-family: {font_family};
    font-size: {font_size}px;
    line-height: {line_height};
}}

.markdown-body {{
    max-width: {document_width};
    margin: 0 auto;
}}

h1, h2, h3, h4, h5, h6 {{
    color: var(--editor-foreground);
}}

strong, b {{
    color: {strong};
}}

::selection {{
    background-color: var(--editor-selectionBackground);
}}

table {{
    border-collapse: collapse;
    margin-bottom: 16px;
    width: 100%;
}}

th, td {{
    padding: 8px 12px;
    border: 1px solid {table_border};
}}

th {{
    background-color: {table_header};
    color: var(--editor-foreground);
    font-weight: 600;
}}

code {{
    background-color: var(--editor-foldBackground);
    color: var(--editor-foreground);
    padding: 2px 4px;
    border-radius: 3px;
    font-size: 85%;
}}

pre {{
    background-color: {code_block};
    border: 1px solid {table_border};
    border-radius: 6px;
    padding: 16px;
    overflow-x: auto;
}}

pre code {{
    background-color: transparent;
    padding: 0;
    border-radius: 0;
    font-size: 100%;
}}

a {{
    color: var(--textLink-foreground);
    text-decoration: none;
}}

a:hover {{
    text-decoration: underline;
    opacity: 0.8;
}}

blockquote {{
    color: var(--editorLineNumber-foreground);
    border-left: 4px solid {blockquote_border};
    padding: 12px 16px;
    margin: 16px 0;
    border-radius: 6px;
}}
"#,
            font_family = preview.font_family,
            font_size = preview.font_size,
            line_height = preview.line_height,
            document_width = preview.document_width,
            strong = css_fallback_var(KEY_STRONG, KEY_FOREGROUND),
            table_border = css_fallback_var(KEY_TABLE_BORDER, "panel.border"),
            table_header = css_fallback_var(KEY_TABLE_HEADER, "editor.lineHighlightBackground"),
            code_block = css_fallback_var(KEY_CODE_BLOCK, "textCodeBlock.background"),
            blockquote_border = css_fallback_var(KEY_BLOCKQUOTE_BORDER, "panel.border"),
        ));

        for level in 1..=self.blockquote_level_count() {
            let selector = vec!["blockquote"; level].join(" ");
            css.push_str(&format!(
                "\n{} {{\n    background-color: var({});\n}}\n",
                selector,
                css_var_name(&blockquote_level_key(level))
            ));
        }

        css
    }
}

/// Log a failed derivation and substitute its fallback.
fn or_fallback(key: &str, derived: Result<String>, fallback: &str) -> String {
    derived.unwrap_or_else(|e| {
        warn!("{}: {}, using fallback {}", key, e, fallback);
        fallback.to_string()
    })
}

fn blockquote_levels(background: &str, kind: ThemeKind, level_count: usize) -> Vec<String> {
    let generated = Color::parse(background).and_then(|bg| generate_levels(&bg, level_count));

    match generated {
        Ok(levels) => levels.iter().map(Color::to_hex).collect(),
        Err(e) => {
            warn!("{}: {}, using fallback levels", KEY_BLOCKQUOTE, e);
            fallback_levels(kind)
                .iter()
                .take(level_count.max(1))
                .map(|s| s.to_string())
                .collect()
        }
    }
}

/// Bold text: pure white or black stays as is, anything else moves away from
/// the page (brighter on dark pages, darker on light ones).
fn strong_foreground(fg: &Color, kind: ThemeKind) -> Color {
    let opaque = fg.with_alpha(1.0);
    if opaque == Color::WHITE || opaque == Color::BLACK {
        return *fg;
    }
    match kind {
        ThemeKind::Dark => fg.brighten(STRONG_EMPHASIS),
        ThemeKind::Light => fg.darken(STRONG_EMPHASIS),
    }
}

impl TryFrom<&str> for ThemeFile {
    type Error = Error;

    fn try_from(json: &str) -> Result<Self> {
        Self::from_json(json)
    }
}

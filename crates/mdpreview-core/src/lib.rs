//! Core library for mdpreview.
//!
//! Color math and the theme-aware palette used to style the Markdown
//! preview, plus configuration loading and logging setup shared with the
//! binary.

pub mod adjust;
pub mod color;
pub mod config;
pub mod contrast;
pub mod error;
pub mod levels;
pub mod logging;
pub mod quirks;
pub mod theme;

pub use adjust::{ContrastParams, SearchDirection, adjust_contrast_color, find_contrasting_color};
pub use color::{Color, ColorSpace};
pub use config::{Config, ConfigLoadResult, DEFAULT_CONFIG_TOML};
pub use contrast::{ThemeKind, classify, contrast_ratio, is_dark};
pub use error::{Error, Result};
pub use levels::generate_levels;
pub use quirks::{ThemeProfile, ThemeQuirk};
pub use theme::{EnhancedPalette, PaletteOptions, ThemeColors, ThemeFile};

//! Configuration types and parsing.
//!
//! The Config type is a plain, serialization-friendly schema. Derived values
//! (the enhanced palette, stylesheets) live in [`crate::theme`] and receive
//! a snapshot of the relevant settings through [`Config::palette_options`].

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use toml::Table;

use crate::adjust::ContrastParams;
use crate::error::{Error, Result};
use crate::levels::DEFAULT_LEVEL_COUNT;
use crate::quirks::{ThemeProfile, builtin_quirk_themes};
use crate::theme::PaletteOptions;

/// Upper bound for `palette.blockquote_levels`.
const MAX_BLOCKQUOTE_LEVELS: usize = 10;

/// Minimum contrasts above this rarely resolve and end in the fallback color.
const HIGH_CONTRAST_WARNING: f64 = 7.0;

/// Embedded default configuration TOML, compiled into the binary.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../../config.toml");

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Path where config was found, if any.
    pub source: Option<PathBuf>,
    /// Whether defaults were used (no config file found).
    pub used_defaults: bool,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Preview rendering settings.
    pub preview: PreviewConfig,

    /// Luminance zones for one-shot background adjustment.
    pub contrast: ContrastParams,

    /// Derived palette settings.
    pub palette: PaletteConfig,
}

impl Config {
    /// Load configuration from the embedded default TOML string.
    pub fn from_default_toml() -> Result<Self> {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TOML)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, merging with embedded defaults.
    ///
    /// Returns an error if the file doesn't exist or can't be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::load_with_defaults(&content)
    }

    /// Parse both the default and user config as TOML tables, deep-merge
    /// them (user values win), then deserialize the result.
    pub fn load_with_defaults(user_toml: &str) -> Result<Self> {
        let mut base: Table = toml::from_str(DEFAULT_CONFIG_TOML)?;
        let user: Table = toml::from_str(user_toml)?;

        deep_merge_toml(&mut base, user);

        let config: Config = base.try_into()?;
        Ok(config)
    }

    /// Find and load configuration using the XDG lookup chain.
    ///
    /// If `explicit_path` is `Some`, that path is used directly and an error
    /// is returned if it doesn't exist or can't be parsed (no fallback).
    ///
    /// If `explicit_path` is `None`, searches in order:
    /// 1. `$XDG_CONFIG_HOME/mdpreview/config.toml`
    /// 2. `~/.config/mdpreview/config.toml`
    /// 3. `./config.toml` (current working directory)
    ///
    /// If no config file is found, the embedded defaults are used.
    pub fn find_and_load(explicit_path: Option<&Path>) -> Result<ConfigLoadResult> {
        if let Some(path) = explicit_path {
            let config = Self::load(path)?;
            return Ok(ConfigLoadResult {
                config,
                source: Some(path.to_path_buf()),
                used_defaults: false,
            });
        }

        // A config file that exists but fails to load is an error, never a
        // silent fallback to defaults.
        let search_paths = Self::config_search_paths();
        let mut first_error: Option<(PathBuf, Error)> = None;

        for path in &search_paths {
            if path.exists() {
                match Self::load(path) {
                    Ok(config) => {
                        return Ok(ConfigLoadResult {
                            config,
                            source: Some(path.clone()),
                            used_defaults: false,
                        });
                    }
                    Err(e) => {
                        if first_error.is_none() {
                            first_error = Some((path.clone(), e));
                        }
                    }
                }
            }
        }

        if let Some((path, error)) = first_error {
            tracing::error!(
                "Config file {:?} exists but failed to load: {}",
                path,
                error
            );
            return Err(error);
        }

        tracing::info!("No config file found, using built-in default config");
        tracing::debug!(
            "Searched: {}",
            search_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(ConfigLoadResult {
            config: Self::from_default_toml()?,
            source: None,
            used_defaults: true,
        })
    }

    /// Get the list of paths to search for config files.
    pub fn config_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_config).join("mdpreview/config.toml"));
        }

        if let Ok(home) = env::var("HOME") {
            paths.push(PathBuf::from(home).join(".config/mdpreview/config.toml"));
        }

        paths.push(PathBuf::from("config.toml"));

        paths
    }

    /// Validate the configuration, returning every invalid value at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        // Preview
        if self.preview.theme.trim().is_empty() {
            errors.push("preview.theme: must not be empty".to_string());
        }

        if self.preview.font_size == 0 {
            errors.push("preview.font_size: must be greater than 0".to_string());
        }

        if !(self.preview.line_height.is_finite() && self.preview.line_height > 0.0) {
            errors.push(format!(
                "preview.line_height: invalid value '{}', must be a positive number",
                self.preview.line_height
            ));
        }

        if self.preview.document_width.trim().is_empty() {
            errors.push("preview.document_width: must not be empty".to_string());
        }

        // Contrast zones
        let contrast = &self.contrast;
        for (name, value) in [
            ("contrast.dark_threshold", contrast.dark_threshold),
            ("contrast.light_threshold", contrast.light_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(format!(
                    "{}: invalid value '{}', must be between 0.0 and 1.0",
                    name, value
                ));
            }
        }

        if contrast.dark_threshold >= contrast.light_threshold {
            errors.push(format!(
                "contrast.dark_threshold ({}) must be less than contrast.light_threshold ({})",
                contrast.dark_threshold, contrast.light_threshold
            ));
        }

        if !(contrast.adjustment_amount.is_finite() && contrast.adjustment_amount >= 0.0) {
            errors.push(format!(
                "contrast.adjustment_amount: invalid value '{}', must be a non-negative number",
                contrast.adjustment_amount
            ));
        }

        // Palette
        let palette = &self.palette;
        if !(1..=MAX_BLOCKQUOTE_LEVELS).contains(&palette.blockquote_levels) {
            errors.push(format!(
                "palette.blockquote_levels: invalid value '{}', must be between 1 and {}",
                palette.blockquote_levels, MAX_BLOCKQUOTE_LEVELS
            ));
        }

        for (name, value) in [
            ("palette.border_min_contrast", palette.border_min_contrast),
            ("palette.selection_min_contrast", palette.selection_min_contrast),
        ] {
            if !(1.0..=21.0).contains(&value) {
                errors.push(format!(
                    "{}: invalid value '{}', must be between 1.0 and 21.0",
                    name, value
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigValidation(errors))
        }
    }

    /// Check for potential configuration issues and return warnings.
    ///
    /// Unlike `validate()`, these are non-fatal.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.palette.blockquote_levels > DEFAULT_LEVEL_COUNT {
            warnings.push(format!(
                "palette.blockquote_levels: only {} levels are available when a theme's \
                 background can't be parsed",
                DEFAULT_LEVEL_COUNT
            ));
        }

        for (name, value) in [
            ("palette.border_min_contrast", self.palette.border_min_contrast),
            (
                "palette.selection_min_contrast",
                self.palette.selection_min_contrast,
            ),
        ] {
            if value > HIGH_CONTRAST_WARNING {
                warnings.push(format!(
                    "{}: {} is rarely reachable; most themes will use the translucent fallback",
                    name, value
                ));
            }
        }

        let builtin: Vec<&str> = builtin_quirk_themes().collect();
        for theme in &self.palette.brighten_foreground_themes {
            if builtin.contains(&theme.as_str()) {
                warnings.push(format!(
                    "palette.brighten_foreground_themes: '{}' is already brightened by default",
                    theme
                ));
            }
        }

        warnings
    }

    /// Snapshot of the settings the palette builder needs.
    pub fn palette_options(&self) -> PaletteOptions {
        PaletteOptions {
            contrast: self.contrast,
            blockquote_levels: self.palette.blockquote_levels,
            border_min_contrast: self.palette.border_min_contrast,
            selection_min_contrast: self.palette.selection_min_contrast,
        }
    }

    /// Resolve quirks for a theme, honoring `palette.brighten_foreground_themes`.
    pub fn theme_profile(&self, name: Option<&str>) -> ThemeProfile {
        ThemeProfile::from_name(name, &self.palette.brighten_foreground_themes)
    }

    /// Human-readable summary of the configuration.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        lines.push("Preview:".to_string());
        lines.push(format!("  theme: {}", self.preview.theme));
        lines.push(format!(
            "  font: {}px / {} line height, {}",
            self.preview.font_size, self.preview.line_height, self.preview.font_family
        ));
        lines.push(format!("  document_width: {}", self.preview.document_width));

        lines.push("\nContrast:".to_string());
        lines.push(format!(
            "  thresholds: {} / {} (midpoint {})",
            self.contrast.dark_threshold,
            self.contrast.light_threshold,
            self.contrast.midpoint()
        ));
        lines.push(format!(
            "  adjustment_amount: {}",
            self.contrast.adjustment_amount
        ));

        lines.push("\nPalette:".to_string());
        lines.push(format!(
            "  blockquote_levels: {}",
            self.palette.blockquote_levels
        ));
        lines.push(format!(
            "  min contrast: border {}, selection {}",
            self.palette.border_min_contrast, self.palette.selection_min_contrast
        ));
        if !self.palette.brighten_foreground_themes.is_empty() {
            lines.push(format!(
                "  brighten_foreground_themes: {}",
                self.palette.brighten_foreground_themes.join(", ")
            ));
        }

        lines.join("\n")
    }
}

/// Deep merge two TOML tables, with `overlay` values taking precedence.
///
/// For nested tables, recursively merges. For arrays and other values,
/// the overlay value completely replaces the base value.
fn deep_merge_toml(base: &mut Table, overlay: Table) {
    for (key, overlay_value) in overlay {
        match (base.get_mut(&key), overlay_value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                deep_merge_toml(base_table, overlay_table);
            }
            (_, overlay_value) => {
                base.insert(key, overlay_value);
            }
        }
    }
}

/// Preview rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    /// Highlighting theme name, e.g. "vitesse-dark".
    pub theme: String,

    /// Body font size in pixels.
    pub font_size: u32,

    /// Body line height (unitless CSS multiplier).
    pub line_height: f64,

    /// Body font family (CSS font-family list).
    pub font_family: String,

    /// Maximum document width (CSS length).
    pub document_width: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            theme: "vitesse-dark".to_string(),
            font_size: 14,
            line_height: 1.6,
            font_family: "system-ui, -apple-system, BlinkMacSystemFont, sans-serif".to_string(),
            document_width: "1000px".to_string(),
        }
    }
}

/// Derived palette settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaletteConfig {
    /// Number of nested blockquote background levels.
    pub blockquote_levels: usize,

    /// Minimum contrast of borders against the page background.
    pub border_min_contrast: f64,

    /// Minimum contrast of the selection background against the text.
    pub selection_min_contrast: f64,

    /// Themes to brighten in addition to the built-in list.
    pub brighten_foreground_themes: Vec<String>,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            blockquote_levels: DEFAULT_LEVEL_COUNT,
            border_min_contrast: 3.0,
            selection_min_contrast: 4.5,
            brighten_foreground_themes: Vec::new(),
        }
    }
}

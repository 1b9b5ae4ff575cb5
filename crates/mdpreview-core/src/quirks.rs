//! Per-theme corrections.
//!
//! Some bundled highlighting themes ship colors that read badly in a Markdown
//! page. Rather than comparing theme names during every render, a theme's
//! quirks are resolved once into a [`ThemeProfile`] when the theme is loaded.

/// A correction applied to a specific theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeQuirk {
    /// Foreground text is too dim against the page; brighten it.
    BrightenForeground,
}

/// Built-in registry of themes with known quirks.
const BUILTIN_QUIRKS: &[(&str, &[ThemeQuirk])] = &[
    ("synthwave-84", &[ThemeQuirk::BrightenForeground]),
    ("min-dark", &[ThemeQuirk::BrightenForeground]),
    ("aurora-x", &[ThemeQuirk::BrightenForeground]),
];

/// A theme name together with its resolved quirks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeProfile {
    pub name: Option<String>,
    pub quirks: Vec<ThemeQuirk>,
}

impl ThemeProfile {
    /// Profile for an unnamed theme, with no quirks.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Resolve quirks for `name` from the built-in registry.
    pub fn resolve(name: &str) -> Self {
        Self::resolve_with(name, &[])
    }

    /// Resolve quirks for `name`, additionally treating any theme listed in
    /// `extra_dim_themes` as needing a brighter foreground.
    pub fn resolve_with(name: &str, extra_dim_themes: &[String]) -> Self {
        let mut quirks: Vec<ThemeQuirk> = BUILTIN_QUIRKS
            .iter()
            .filter(|(theme, _)| *theme == name)
            .flat_map(|(_, quirks)| quirks.iter().copied())
            .collect();

        if extra_dim_themes.iter().any(|t| t == name)
            && !quirks.contains(&ThemeQuirk::BrightenForeground)
        {
            quirks.push(ThemeQuirk::BrightenForeground);
        }

        if !quirks.is_empty() {
            tracing::debug!("Theme '{}' has quirks: {:?}", name, quirks);
        }

        Self {
            name: Some(name.to_string()),
            quirks,
        }
    }

    /// Resolve from an optional name; `None` gives [`ThemeProfile::anonymous`].
    pub fn from_name(name: Option<&str>, extra_dim_themes: &[String]) -> Self {
        match name {
            Some(name) => Self::resolve_with(name, extra_dim_themes),
            None => Self::anonymous(),
        }
    }

    pub fn has(&self, quirk: ThemeQuirk) -> bool {
        self.quirks.contains(&quirk)
    }
}

/// Names of all themes with built-in quirks.
pub fn builtin_quirk_themes() -> impl Iterator<Item = &'static str> {
    BUILTIN_QUIRKS.iter().map(|(name, _)| *name)
}

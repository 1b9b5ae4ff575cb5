//! Error types for mdpreview-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by color parsing, palette derivation and configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Input string is not a color we can parse.
    #[error("invalid color: '{0}'")]
    InvalidColor(String),

    /// Color math produced something unusable (zero levels, NaN channels).
    #[error("degenerate color computation: {0}")]
    Degenerate(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to parse theme JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration:\n  {}", .0.join("\n  "))]
    ConfigValidation(Vec<String>),
}

pub type Result<T> = std::result::Result<T, Error>;

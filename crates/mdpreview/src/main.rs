//! mdpreview - Markdown preview stylesheets from syntax-highlighting themes
//!
//! Reads a highlighting theme, derives the enhanced preview palette and
//! prints it as CSS or JSON.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, warn};

use mdpreview_core::{Color, Config, EnhancedPalette, ThemeFile, ThemeKind, logging};

/// mdpreview - Markdown preview stylesheets from syntax-highlighting themes
#[derive(Parser, Debug)]
#[command(name = "mdpreview", version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (uses XDG lookup if not specified)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print example configuration and exit
    #[arg(long)]
    print_example_config: bool,

    /// Validate configuration and exit (returns non-zero on errors)
    #[arg(long)]
    check_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Derive the enhanced palette for a theme file
    Palette {
        /// Theme JSON file ({ "name": ..., "colors": { ... } })
        #[arg(short, long)]
        theme: PathBuf,
        /// Theme name used for quirk lookup (defaults to the file's "name")
        #[arg(short, long)]
        name: Option<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Css)]
        format: OutputFormat,
    },
    /// Print whether a background color is dark or light
    Classify {
        /// Any CSS color (hex, rgb(), rgba() or a supported name)
        color: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Full preview stylesheet
    Css,
    /// Only the :root variable block
    Vars,
    /// Derived colors as a JSON object
    Json,
}

fn main() -> ExitCode {
    let args = Args::parse();

    logging::init(args.verbose);

    // --print-example-config doesn't need a loadable config
    if args.print_example_config {
        print!("{}", mdpreview_core::DEFAULT_CONFIG_TOML);
        return ExitCode::SUCCESS;
    }

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    // classify is pure color math and doesn't need config
    let command = match args.command {
        Some(Command::Classify { color }) => return classify(&color),
        other => other,
    };

    // If --config is specified, it must exist and be valid (no fallback)
    let load_result = Config::find_and_load(args.config.as_deref())?;

    if let Some(ref source) = load_result.source {
        info!("Loaded configuration from {:?}", source);
    } else if load_result.used_defaults {
        info!("Using default configuration (no config file found)");
    }

    let config = load_result.config;
    config.validate()?;
    for warning in config.warnings() {
        warn!("{}", warning);
    }

    debug!("Configuration validated successfully");

    if args.check_config {
        match load_result.source {
            Some(ref source) => println!("Configuration valid: {}", source.display()),
            None => println!("Configuration valid (using defaults)"),
        }
        return Ok(ExitCode::SUCCESS);
    }

    match command {
        Some(Command::Palette {
            theme,
            name,
            format,
        }) => {
            let output = render_palette(&config, &theme, name.as_deref(), format)?;
            print!("{}", output);
        }
        _ => println!("{}", config.summary()),
    }

    Ok(ExitCode::SUCCESS)
}

fn classify(input: &str) -> anyhow::Result<ExitCode> {
    let color = Color::parse(input)?;
    let kind = ThemeKind::of(&color);
    debug!("{} has luminance {:.4}", color, color.luminance());

    println!(
        "{}",
        match kind {
            ThemeKind::Dark => "dark",
            ThemeKind::Light => "light",
        }
    );
    Ok(ExitCode::SUCCESS)
}

fn render_palette(
    config: &Config,
    theme_path: &Path,
    name: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let json = fs::read_to_string(theme_path)
        .with_context(|| format!("failed to read theme {}", theme_path.display()))?;
    let theme = ThemeFile::from_json(&json)
        .with_context(|| format!("failed to parse theme {}", theme_path.display()))?;

    let name = name.or(theme.name.as_deref());
    let profile = config.theme_profile(name);
    let palette = EnhancedPalette::build(&theme.colors, &profile, &config.palette_options());

    info!(
        "Built {} palette for {} ({} derived colors)",
        if palette.is_dark() { "dark" } else { "light" },
        name.unwrap_or("unnamed theme"),
        palette.len()
    );

    Ok(match format {
        OutputFormat::Css => palette.preview_css(&theme.colors, &config.preview),
        OutputFormat::Vars => palette.css_vars_block(&theme.colors),
        OutputFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = palette
                .iter()
                .map(|(key, value)| (key.to_string(), serde_json::Value::from(value)))
                .collect();
            let mut out = serde_json::to_string_pretty(&map)?;
            out.push('\n');
            out
        }
    })
}

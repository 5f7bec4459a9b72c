use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use honey_version::{VersionConfig, VersionFormat, VersionFormatter, VersionParts};
use serde::Serialize;
use tracing::Level;

#[derive(Parser)]
#[command(author, version, about = "Print the product version for a checkout")]
struct Cli {
    /// Output format. Prints every format when omitted.
    #[arg(value_enum)]
    format: Option<OutputFormat>,
    /// Source root containing the upstream manifest and the product checkout.
    src_path: Option<PathBuf>,
    /// TOML file overriding the checkout layout.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print every rendering as a single JSON document.
    #[arg(long, default_value_t = false)]
    json: bool,
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Current,
    Old,
    Plist,
    Dylib,
}

impl OutputFormat {
    const ALL: [OutputFormat; 4] = [
        OutputFormat::Current,
        OutputFormat::Old,
        OutputFormat::Plist,
        OutputFormat::Dylib,
    ];

    fn label(self) -> &'static str {
        match self {
            OutputFormat::Current => "current",
            OutputFormat::Old => "old",
            OutputFormat::Plist => "plist",
            OutputFormat::Dylib => "dylib",
        }
    }
}

#[derive(Serialize)]
struct VersionReport {
    current: String,
    old: String,
    plist: String,
    dylib: String,
    parts: VersionParts,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        })
        .init();

    let config = load_config(&cli)?;
    let mut formatter = VersionFormatter::open(config).context("open checkout")?;

    if cli.json {
        let report = VersionReport {
            current: formatter.version_string(Some(VersionFormat::Current))?,
            old: formatter.version_string(Some(VersionFormat::Legacy))?,
            plist: formatter.plist_version_string(None)?,
            dylib: formatter.dylib_version_string(None)?,
            parts: formatter.version_parts(None)?,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let formats = match cli.format {
        Some(format) => vec![format],
        None => OutputFormat::ALL.to_vec(),
    };
    for format in &formats {
        if formats.len() > 1 {
            println!("{}", format.label());
        }
        let rendered = match format {
            OutputFormat::Current => formatter.version_string(Some(VersionFormat::Current))?,
            OutputFormat::Old => formatter.version_string(Some(VersionFormat::Legacy))?,
            OutputFormat::Plist => formatter.plist_version_string(None)?,
            OutputFormat::Dylib => formatter.dylib_version_string(None)?,
        };
        println!("{rendered}");
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<VersionConfig> {
    let config = match &cli.config {
        Some(path) => VersionConfig::load_from(path)
            .with_context(|| format!("read config {}", path.display()))?,
        None => VersionConfig::default(),
    };
    let mut config = config.with_env().context("read environment")?;
    if let Some(path) = &cli.src_path {
        config.src_path = path.clone();
    }
    Ok(config)
}

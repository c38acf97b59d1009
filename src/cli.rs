use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Consolidate, clean and impute construction-toy set listings",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full pipeline and write the cleaned table
    Run(RunArgs),
    /// Print per-column null counts of the merged and cleaned table
    Audit(AuditArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Directory of set-description record files
    #[arg(long = "descriptions")]
    pub descriptions: PathBuf,
    /// Directory of locale-price record files named <product_id>_<country>.json
    #[arg(long = "locale-prices")]
    pub locale_prices: PathBuf,
    /// Output CSV file ('-' for stdout)
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Pipeline configuration (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Theme-name override table (YAML); takes precedence over the config
    #[arg(long)]
    pub overrides: Option<PathBuf>,
    /// Seed for the hot-deck sampler; takes precedence over the config
    #[arg(long)]
    pub seed: Option<u64>,
    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
    /// Output delimiter (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Directory of set-description record files
    #[arg(long = "descriptions")]
    pub descriptions: PathBuf,
    /// Directory of locale-price record files
    #[arg(long = "locale-prices")]
    pub locale_prices: PathBuf,
    /// Pipeline configuration (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

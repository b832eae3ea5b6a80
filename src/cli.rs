use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::EmptyColumnPolicy;

#[derive(Debug, Parser)]
#[command(author, version, about = "Column statistics and previews for CSV files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute sum, average and max per column in a single pass
    Analyze(AnalyzeArgs),
    /// Show the first few rows of a file in a formatted table
    Preview(PreviewArgs),
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Name of the file inside the storage directory
    pub filename: String,
    /// Comma-separated 1-based column numbers to analyze (all when omitted)
    #[arg(short = 'C', long = "columns")]
    pub columns: Option<String>,
    /// YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory that holds the stored files
    #[arg(short, long)]
    pub storage: Option<PathBuf>,
    /// Rows kept in the preview, header included
    #[arg(long = "preview-rows")]
    pub preview_rows: Option<usize>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// How columns without numeric values are reported
    #[arg(long = "empty-columns", value_enum)]
    pub empty_columns: Option<EmptyColumnPolicy>,
    /// Output format for the report
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Name of the file inside the storage directory
    pub filename: String,
    /// Directory that holds the stored files
    #[arg(short, long, default_value = crate::config::DEFAULT_STORAGE_DIR)]
    pub storage: PathBuf,
    /// Number of data rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
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

pub mod aggregate;
pub mod analysis;
pub mod cell;
pub mod cli;
pub mod config;
pub mod error;
pub mod io_utils;
pub mod preview;
pub mod scanner;
pub mod storage;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    analysis::{AnalysisOptions, Analyzer},
    cli::{AnalyzeArgs, Cli, Commands, OutputFormat},
    config::AnalyzerConfig,
    error::AnalysisError,
    storage::DirectoryStorage,
};

pub use crate::{
    analysis::AnalysisReport,
    error::{ErrorKind, ErrorResponse},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_analyzer", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => handle_analyze(&args),
        Commands::Preview(args) => preview::execute(&args),
    }
}

/// Builds the effective configuration: defaults, then `--config`, then flags.
pub fn resolve_config(args: &AnalyzeArgs) -> Result<AnalyzerConfig> {
    let mut config = match &args.config {
        Some(path) => AnalyzerConfig::load(path)?,
        None => AnalyzerConfig::default(),
    };
    if let Some(storage) = &args.storage {
        config.storage_dir = storage.clone();
    }
    if let Some(rows) = args.preview_rows {
        config.preview_rows = rows;
    }
    if args.delimiter.is_some() {
        config.delimiter = args.delimiter;
    }
    if let Some(label) = &args.input_encoding {
        config.encoding = Some(label.clone());
    }
    if let Some(policy) = args.empty_columns {
        config.empty_columns = policy;
    }
    Ok(config)
}

fn handle_analyze(args: &AnalyzeArgs) -> Result<()> {
    let config = resolve_config(args)?;
    debug!("Effective configuration: {config:?}");
    let options = AnalysisOptions::from_config(&config)?;
    info!(
        "Analyzing '{}' from {:?} with delimiter '{}'",
        args.filename,
        config.storage_dir,
        printable_delimiter(io_utils::resolve_input_delimiter(
            &args.filename,
            options.delimiter
        ))
    );
    let analyzer = Analyzer::new(DirectoryStorage::new(&config.storage_dir), options);
    let report = analyzer
        .handle(&args.filename, args.columns.as_deref())
        .with_context(|| format!("Analyzing {:?}", args.filename))?;

    let rendered = match args.format {
        OutputFormat::Json => report
            .to_json_pretty()
            .context("Serializing analysis report")?,
        OutputFormat::Table => table::render_report(&report),
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

/// Prints a failure for the command line and returns the process exit code.
///
/// Analysis failures are printed as the JSON error body; everything else as
/// a plain message. Caller errors (4xx) exit with 2, the rest with 1.
pub fn report_failure(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<AnalysisError>() {
        Some(analysis_err) => {
            let response = analysis_err.to_response();
            match serde_json::to_string(&response) {
                Ok(body) => eprintln!("{body}"),
                Err(_) => eprintln!("error: {err:#}"),
            }
            if (400..500).contains(&response.status) {
                2
            } else {
                1
            }
        }
        None => {
            eprintln!("error: {err:#}");
            1
        }
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}

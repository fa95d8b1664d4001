#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
//! `tablekey` CLI - unique key checks for CSV table contents
//!
//! Usage:
//!   `tablekey check --structure tariffs.toml --contents tariffs.csv`
//!   `tablekey check --structure tariffs.toml --contents tariffs.csv --explicit --format json`
//!   `tablekey keys --structure tariffs.toml`

mod load;
mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tablekey_core::{LoggingConfig, TableKeyConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use output::OutputFormat;

#[derive(Parser)]
#[command(name = "tablekey")]
#[command(
    author,
    version,
    about = "tablekey CLI - unique key and range overlap checks for table contents"
)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "tablekey.toml", env = "TABLEKEY_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the unique keys of a CSV file
    Check {
        /// Structure definition (TOML)
        #[arg(short, long)]
        structure: PathBuf,

        /// Table contents (CSV with a header row)
        #[arg(short, long)]
        contents: PathBuf,

        /// Always check range keys, whatever the table size
        #[arg(long)]
        explicit: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// List the unique keys of a structure
    Keys {
        /// Structure definition (TOML)
        #[arg(short, long)]
        structure: PathBuf,
    },
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let json = config.format == "json";
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .try_init();
}

fn load_config(path: &Path) -> anyhow::Result<TableKeyConfig> {
    let config = TableKeyConfig::load_from_path(path)
        .with_context(|| format!("Failed to load configuration {}", path.display()))?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(&cli.config)?;
    init_logging(&config.logging);

    match cli.command {
        Commands::Check {
            structure,
            contents,
            explicit,
            format,
        } => {
            let structure = load::load_structure(&structure)?;
            for (key, column) in structure.unresolved_references() {
                tracing::warn!(key = %key, column = %column, "Unique key references an undeclared column");
            }
            let (mut table, stats) = load::load_contents(&contents, structure, config.validation)?;

            let outcome = if explicit {
                table.validate_explicitly()
            } else {
                table.validate()
            };
            output::print_check(table.name(), &stats, &outcome, format)?;

            if outcome.messages.contains_errors() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Keys { structure } => {
            let structure = load::load_structure(&structure)?;
            output::print_keys(&structure);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> anyhow::Result<ExitCode> {
    run(Cli::parse())
}

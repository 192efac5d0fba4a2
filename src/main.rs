//! Command-line entry point: index a workspace folder and query its translations.

use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{
    Parser,
    Subcommand,
};
use i18n_lookup::config::{
    ConfigError,
    ConfigManager,
};
use i18n_lookup::indexer::{
    IndexerError,
    WorkspaceIndexer,
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Arguments {
    /// Workspace folder containing translation files
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve a dotted key, listing candidates when it names a group of keys
    Resolve {
        key: String,
        /// Locale to resolve in (defaults to the first locale found)
        #[arg(short, long)]
        locale: Option<String>,
    },
    /// List fully qualified keys starting with a prefix
    Keys { prefix: String },
    /// List the locales present in the workspace
    Locales,
    /// Print the merged translation tree as JSON
    Dump,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Indexer(#[from] IndexerError),
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize translations: {0}")]
    Json(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run(Arguments::parse()).await {
        Ok(code) => code,
        Err(error) => {
            tracing::error!(%error, "i18n-lookup failed");
            ExitCode::from(2)
        }
    }
}

async fn run(args: Arguments) -> Result<ExitCode, CliError> {
    let mut config_manager = ConfigManager::new();
    config_manager.load_settings(Some(args.workspace.clone()))?;

    let indexer = WorkspaceIndexer::new(config_manager.get_settings().clone());
    let translation = indexer.index_workspace(&args.workspace).await?;

    let mut stdout = std::io::stdout().lock();
    match args.command {
        Command::Resolve { key, locale } => {
            let locale = locale.as_deref().unwrap_or_else(|| translation.fallback_locale());
            let Some(value) = translation.resolve(&key, locale) else {
                tracing::warn!(key = %key, locale, "Key not found");
                return Ok(ExitCode::FAILURE);
            };
            writeln!(stdout, "{value}")?;
        }
        Command::Keys { prefix } => {
            for key in translation.keys_starting_with(&prefix) {
                writeln!(stdout, "{key}")?;
            }
        }
        Command::Locales => {
            for locale in translation.locales() {
                writeln!(stdout, "{locale}")?;
            }
        }
        Command::Dump => {
            serde_json::to_writer_pretty(&mut stdout, translation.merged_view())?;
            writeln!(stdout)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

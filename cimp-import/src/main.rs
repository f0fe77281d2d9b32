//! cimp - Character record importer
//!
//! Imports one exported character document (actor plus owned items) into the
//! local document database.
//!
//! Exit codes: 0 imported or nothing chosen, 1 import failed (including a
//! partial import), 2 bootstrap failure.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use cimp_common::config::{self, CliOverrides, ResolvedConfig};
use cimp_common::i18n::{MessageCatalog, Messages};
use cimp_import::db::{init_database_pool, SqliteDocumentStore};
use cimp_import::reporter::ConsoleReporter;
use cimp_import::source::{FileSource, StdinSource};
use cimp_import::{ImportOutcome, ImportPipeline, SourceAcquisition};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_LEVEL: &str = "info";

/// Command-line arguments for cimp
#[derive(Parser, Debug)]
#[command(name = "cimp")]
#[command(about = "Import an exported character record")]
#[command(version)]
struct Args {
    /// Character record to import (.json)
    #[arg(conflicts_with = "stdin")]
    file: Option<PathBuf>,

    /// Read the record from standard input
    #[arg(long)]
    stdin: bool,

    /// Bootstrap config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite document database
    #[arg(long)]
    database: Option<PathBuf>,

    /// JSON language file overriding built-in messages
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config_path: self.config.clone(),
            database_path: self.database.clone(),
            catalog_path: self.catalog.clone(),
            log_level: self.log_level.clone(),
        }
    }

    fn source(&self) -> Arc<dyn SourceAcquisition> {
        if self.stdin {
            Arc::new(StdinSource)
        } else {
            Arc::new(FileSource::new(self.file.clone()))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing ahead of config resolution. RUST_LOG wins; otherwise
    // the configured level replaces the bootstrap filter once resolved.
    let rust_log = EnvFilter::try_from_default_env().ok();
    let from_env = rust_log.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(rust_log.unwrap_or_else(|| level_filter(DEFAULT_LOG_LEVEL)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match config::resolve(&args.overrides()) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration failed: {}", e);
            eprintln!("cimp: {}", e);
            return ExitCode::from(2);
        }
    };

    if !from_env {
        if let Err(e) = filter_handle.reload(level_filter(&config.log_level)) {
            warn!("Could not apply log level {}: {}", config.log_level, e);
        }
    }

    info!("Starting cimp {}", env!("CARGO_PKG_VERSION"));

    let pipeline = match bootstrap(&args, &config).await {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("Bootstrap failed: {:#}", e);
            eprintln!("cimp: {:#}", e);
            return ExitCode::from(2);
        }
    };

    match pipeline.run_import().await {
        ImportOutcome::Cancelled | ImportOutcome::Succeeded { .. } => ExitCode::SUCCESS,
        outcome @ ImportOutcome::Failed { .. } => {
            if let Some(actor) = outcome.persisted_actor() {
                eprintln!(
                    "cimp: character {} ({}) was created without its items",
                    actor.name, actor.id
                );
            }
            ExitCode::from(1)
        }
    }
}

/// Filter for this binary's crates at `level`
fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("cimp={0},cimp_import={0},cimp_common={0}", level))
}

async fn bootstrap(args: &Args, config: &ResolvedConfig) -> Result<ImportPipeline> {
    let catalog = match &config.catalog_path {
        Some(path) => MessageCatalog::load(path)
            .with_context(|| format!("Failed to load message catalog {}", path.display()))?
            .merged_over(MessageCatalog::english()),
        None => MessageCatalog::english(),
    };
    info!("Message catalog: {} entries", catalog.len());

    info!("Database: {}", config.database_path.display());
    let pool = init_database_pool(&config.database_path)
        .await
        .context("Failed to open document database")?;
    info!("Database connection established");

    Ok(ImportPipeline::new(
        args.source(),
        Arc::new(SqliteDocumentStore::new(pool)),
        Arc::new(ConsoleReporter),
        Messages::new(config.module_id.clone(), catalog),
    ))
}

//! `comcat` - catalog event and product command-line tool.
//!
//! Downloads detail documents into a local cache, summarises events, resolves
//! products under source and version policies, and looks up or downloads
//! product content files. Every command prints JSON on stdout; logs go to
//! stderr and are filtered with `RUST_LOG`.
//!
//! # Architecture
//!
//! ```text
//! Cli --> CatalogConfig --> Session { EventCache, CatalogClient<HttpTransport> }
//!                                |
//!                          EventRecord --> Product --> JSON report
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comcat_fetch::config::DEFAULT_CONFIG_FILE;
use comcat_fetch::{CatalogClient, CatalogConfig, EventCache, HttpTransport, Transport};
use comcat_products::{SourceSelection, VersionPolicy};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::commands::Session;

/// comcat - catalog event and product tool
#[derive(Parser, Debug)]
#[command(name = "comcat")]
#[command(about, long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Cache directory, overriding the configuration
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download detail documents into the cache
    Fetch {
        /// Catalog event ids
        #[arg(required = true)]
        event_ids: Vec<String>,
    },

    /// Summarise an event and count its products
    Info {
        /// Catalog event id
        event_id: String,
    },

    /// Resolve products of one type
    Products {
        /// Catalog event id
        event_id: String,

        /// Product type (origin, shakemap, ...)
        #[arg(short = 't', long = "type")]
        product_type: String,

        /// `preferred`, `all`, or a source network id
        #[arg(short, long, default_value = "preferred")]
        source: SourceSelection,

        /// `preferred`, `first`, `last`, or `all`
        #[arg(short, long, default_value = "preferred")]
        version: VersionPolicy,
    },

    /// Look up content files of the preferred product
    Content {
        /// Catalog event id
        event_id: String,

        /// Product type (origin, shakemap, ...)
        #[arg(short = 't', long = "type")]
        product_type: String,

        /// Regular expression matched at the end of content names
        #[arg(short, long)]
        pattern: String,

        /// Download the shortest match into the cache
        #[arg(long)]
        download: bool,
    },
}

/// Application entry point.
///
/// Initializes logging, loads configuration, builds the HTTP transport and
/// cache, then runs one subcommand.
///
/// # Errors
///
/// Returns an error if configuration is unusable or the command fails.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = CatalogConfig::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    if let Some(data_dir) = cli.data_dir {
        config.cache.data_dir = data_dir;
    }
    info!(
        data_dir = %config.cache.data_dir.display(),
        detail_url_template = config.catalog.detail_url_template,
        timeout_secs = config.catalog.timeout_secs,
        max_attempts = config.catalog.max_attempts,
        "configuration loaded"
    );

    let transport = HttpTransport::from_config(&config.catalog)?;
    let session = Session::new(
        EventCache::new(config.cache.data_dir),
        CatalogClient::new(transport, config.catalog),
    );
    run(&session, cli.command).await
}

async fn run<T: Transport>(session: &Session<T>, command: Commands) -> Result<()> {
    match command {
        Commands::Fetch { event_ids } => print_json(&session.fetch(&event_ids).await),
        Commands::Info { event_id } => print_json(&session.info(&event_id).await?),
        Commands::Products {
            event_id,
            product_type,
            source,
            version,
        } => print_json(
            &session
                .products(&event_id, &product_type, &source, version)
                .await?,
        ),
        Commands::Content {
            event_id,
            product_type,
            pattern,
            download,
        } => print_json(
            &session
                .content(&event_id, &product_type, &pattern, download)
                .await?,
        ),
    }
}

fn print_json<S: Serialize>(report: &S) -> Result<()> {
    let text = serde_json::to_string_pretty(report)?;
    println!("{text}");
    Ok(())
}

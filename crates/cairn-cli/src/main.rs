//! Cairn CLI - Command line interface for the metadata catalog

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use cairn_core::{CallContext, Caller, Pagination, QueryOptions};
use cairn_storage::MemoryRepository;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{classify, completions, consistent, element, graph, history, relationship, search, valid_value};
use config::Config;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "cairn")]
#[command(author, version, about = "Query layer for an open metadata catalog")]
pub struct Cli {
    /// Catalog snapshot file
    #[arg(short = 'D', long, global = true)]
    pub data_file: Option<String>,

    /// User the catalog is queried as
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Visibility zone of the caller (repeatable)
    #[arg(long = "zone", global = true)]
    pub zones: Vec<String>,

    /// Only return elements effective at this time (RFC 3339)
    #[arg(long, global = true)]
    pub effective_time: Option<String>,

    /// Include memento elements
    #[arg(long, global = true)]
    pub for_lineage: bool,

    /// Skip deduplication of results
    #[arg(long, global = true)]
    pub for_duplicate_processing: bool,

    /// Output format: table, json
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Snapshot path from the flag, then the config file, then the data dir
    pub fn data_file(&self, config: &Config) -> PathBuf {
        self.data_file
            .as_ref()
            .or(config.data_file.as_ref())
            .map(PathBuf::from)
            .unwrap_or_else(config::default_data_file)
    }

    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from(self.format.as_str())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage catalog elements
    Element(element::ElementArgs),
    /// Manage relationships between elements
    Relationship(relationship::RelationshipArgs),
    /// Attach classifications to elements
    Classify(classify::ClassifyArgs),
    /// Show the graph anchored at an element
    Graph(graph::GraphArgs),
    /// Search the catalog
    Search(search::SearchArgs),
    /// Manage valid value definitions
    ValidValue(valid_value::ValidValueArgs),
    /// Manage consistency links between valid values
    Consistent(consistent::ConsistentArgs),
    /// Show stored versions of elements and relationships
    History(history::HistoryArgs),
    /// Manage CLI configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with the loaded catalog
pub struct AppContext {
    pub repository: Arc<MemoryRepository>,
    pub catalog: CallContext,
    pub options: QueryOptions,
    pub page_size: Option<usize>,
    data_file: PathBuf,
}

impl AppContext {
    pub async fn new(cli: &Cli, config: &Config) -> anyhow::Result<Self> {
        let data_file = cli.data_file(config);
        tracing::debug!("Using catalog at: {:?}", data_file);

        let repository = Arc::new(MemoryRepository::load(&data_file)?);

        let mut caller = Caller::new(
            cli.user
                .clone()
                .or_else(|| config.user_id.clone())
                .unwrap_or_else(|| config::DEFAULT_USER_ID.to_string()),
        );
        let zones = if cli.zones.is_empty() { &config.zones } else { &cli.zones };
        for zone in zones {
            caller = caller.with_zone(zone.clone());
        }

        let mut options = QueryOptions::new()
            .for_lineage(cli.for_lineage || config.for_lineage)
            .for_duplicate_processing(cli.for_duplicate_processing || config.for_duplicate_processing);
        if let Some(time) = &cli.effective_time {
            options = options.effective_at(commands::parse_time(time).context("Invalid --effective-time")?);
        }

        Ok(Self {
            catalog: CallContext::new(repository.clone(), caller),
            repository,
            options,
            page_size: config.page_size,
            data_file,
        })
    }

    /// Page window for a listing, falling back to the configured page size
    pub fn paging(&self, start_from: usize, page_size: Option<usize>) -> Pagination {
        match page_size.or(self.page_size) {
            Some(page_size) => Pagination::new(start_from, page_size),
            None => Pagination {
                start_from,
                ..Pagination::default()
            },
        }
    }

    /// Persist the catalog after a write
    pub fn save(&self) -> anyhow::Result<()> {
        tracing::debug!("Saving catalog to {:?}", self.data_file);
        self.repository.save(&self.data_file)?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting cairn CLI");

    // These never touch the catalog
    match &cli.command {
        Commands::Config(args) => return commands::config::run(args).await,
        Commands::Completions(args) => return completions::run(args),
        _ => {}
    }

    let config = Config::load();
    let ctx = AppContext::new(&cli, &config).await?;

    match &cli.command {
        Commands::Element(args) => element::run(args, &cli, &ctx).await?,
        Commands::Relationship(args) => relationship::run(args, &cli, &ctx).await?,
        Commands::Classify(args) => classify::run(args, &cli, &ctx).await?,
        Commands::Graph(args) => graph::run(args, &cli, &ctx).await?,
        Commands::Search(args) => search::run(args, &cli, &ctx).await?,
        Commands::ValidValue(args) => valid_value::run(args, &cli, &ctx).await?,
        Commands::Consistent(args) => consistent::run(args, &cli, &ctx).await?,
        Commands::History(args) => history::run(args, &cli, &ctx).await?,
        Commands::Config(_) | Commands::Completions(_) => {}
    }

    Ok(())
}

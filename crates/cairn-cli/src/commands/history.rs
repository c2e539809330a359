//! History commands

use clap::{Args, Subcommand};

use super::{parse_guid, parse_time};
use crate::output::{element_line, relationship_line, to_json, OutputFormat};
use crate::{AppContext, Cli};
use cairn_core::{HistoryQueries, HistoryWindow};

#[derive(Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommands,
}

/// Time window over the stored versions
#[derive(Args, Clone)]
pub struct WindowArgs {
    /// Earliest version time, inclusive (RFC 3339)
    #[arg(long)]
    pub from: Option<String>,

    /// Latest version time, exclusive (RFC 3339)
    #[arg(long)]
    pub to: Option<String>,

    /// List the oldest version first
    #[arg(long)]
    pub oldest_first: bool,

    /// First version to return
    #[arg(long, default_value = "0")]
    pub start: usize,

    /// Versions per page
    #[arg(long)]
    pub page_size: Option<usize>,
}

impl WindowArgs {
    fn window(&self) -> anyhow::Result<HistoryWindow> {
        let from = self.from.as_deref().map(parse_time).transpose()?;
        let to = self.to.as_deref().map(parse_time).transpose()?;
        let window = HistoryWindow::between(from, to);
        Ok(if self.oldest_first { window.oldest_first() } else { window })
    }
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// Versions of an element
    Element {
        /// Element GUID
        guid: String,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Versions of a relationship
    Relationship {
        /// Relationship GUID
        guid: String,
        #[command(flatten)]
        window: WindowArgs,
    },
}

pub async fn run(args: &HistoryArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let format = cli.output_format();

    match &args.command {
        HistoryCommands::Element { guid, window } => {
            let guid = parse_guid(guid)?;
            let versions = HistoryQueries::element_history(
                &ctx.catalog,
                &guid,
                &window.window()?,
                &ctx.options,
                &ctx.paging(window.start, window.page_size),
            )
            .await?;

            match format {
                OutputFormat::Json => println!("{}", to_json(&versions)?),
                OutputFormat::Table if versions.is_empty() => println!("No versions of {} in window", guid),
                OutputFormat::Table => {
                    println!("History of {} ({} versions):", guid, versions.len());
                    for version in &versions {
                        println!("  {}  {}", version.updated_at, element_line(version));
                    }
                }
            }
        }
        HistoryCommands::Relationship { guid, window } => {
            let guid = parse_guid(guid)?;
            let versions = HistoryQueries::relationship_history(
                &ctx.catalog,
                &guid,
                &window.window()?,
                &ctx.options,
                &ctx.paging(window.start, window.page_size),
            )
            .await?;

            match format {
                OutputFormat::Json => println!("{}", to_json(&versions)?),
                OutputFormat::Table if versions.is_empty() => println!("No versions of {} in window", guid),
                OutputFormat::Table => {
                    println!("History of {} ({} versions):", guid, versions.len());
                    for version in &versions {
                        println!("  {}  {}", version.updated_at, relationship_line(version));
                    }
                }
            }
        }
    }

    Ok(())
}

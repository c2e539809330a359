//! Consistent valid value commands

use clap::{Args, Subcommand};
use serde_json::json;

use crate::output::{definition_line, to_json, OutputFormat};
use crate::{AppContext, Cli};
use cairn_core::{ValidValueKey, ValidValueManager};

#[derive(Args)]
pub struct ConsistentArgs {
    #[command(subcommand)]
    pub command: ConsistentCommands,
}

#[derive(Subcommand)]
pub enum ConsistentCommands {
    /// Record that two values belong together
    Link {
        /// First value as TYPE.PROPERTY[.MAP]=VALUE, with * for any type
        first: String,
        /// Second value, same form
        second: String,
    },
    /// List the values consistent with a value
    List {
        /// Value as TYPE.PROPERTY[.MAP]=VALUE, with * for any type
        value: String,
        /// First result to return
        #[arg(long, default_value = "0")]
        start: usize,
        /// Results per page
        #[arg(long)]
        page_size: Option<usize>,
    },
}

/// Parse `TYPE.PROPERTY[.MAP]=VALUE`. `*` or an empty segment leaves that
/// level unset.
pub fn parse_key(s: &str) -> anyhow::Result<ValidValueKey> {
    let Some((path, value)) = s.split_once('=') else {
        anyhow::bail!("Invalid value key '{}', expected TYPE.PROPERTY[.MAP]=VALUE", s);
    };
    let segments: Vec<Option<&str>> = path
        .split('.')
        .map(str::trim)
        .map(|segment| (!segment.is_empty() && segment != "*").then_some(segment))
        .collect();
    if segments.len() > 3 {
        anyhow::bail!("Invalid value key '{}', at most TYPE.PROPERTY.MAP before '='", s);
    }
    let segment = |i: usize| segments.get(i).copied().flatten();
    Ok(ValidValueKey::new(segment(0), segment(1), segment(2), value))
}

pub async fn run(args: &ConsistentArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let catalog = &ctx.catalog;
    let format = cli.output_format();

    match &args.command {
        ConsistentCommands::Link { first, second } => {
            let first = parse_key(first)?;
            let second = parse_key(second)?;
            let guid = ValidValueManager::link_consistent_values(catalog, &first, &second, &ctx.options).await?;
            ctx.save()?;

            match format {
                OutputFormat::Json => println!("{}", to_json(&json!({ "guid": guid }))?),
                OutputFormat::Table => println!(
                    "Linked {} and {} ({})",
                    first.qualified_name(),
                    second.qualified_name(),
                    guid
                ),
            }
        }
        ConsistentCommands::List {
            value,
            start,
            page_size,
        } => {
            let key = parse_key(value)?;
            let definitions = ValidValueManager::list_consistent_values_for(
                catalog,
                &key,
                &ctx.options,
                &ctx.paging(*start, *page_size),
            )
            .await?;

            match format {
                OutputFormat::Json => println!("{}", to_json(&definitions)?),
                OutputFormat::Table if definitions.is_empty() => {
                    println!("No values consistent with {}", key.qualified_name())
                }
                OutputFormat::Table => {
                    println!("Consistent with {} ({} found):", key.qualified_name(), definitions.len());
                    for definition in &definitions {
                        println!("  {}", definition_line(definition));
                    }
                }
            }
        }
    }

    Ok(())
}

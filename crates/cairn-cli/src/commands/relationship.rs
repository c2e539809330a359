//! Relationship commands

use clap::{Args, Subcommand};
use serde_json::json;

use super::{parse_guid, parse_properties};
use crate::output::{relationship_line, to_json, OutputFormat};
use crate::{AppContext, Cli};
use cairn_core::{Relationship, SequencingOrder};

#[derive(Args)]
pub struct RelationshipArgs {
    #[command(subcommand)]
    pub command: RelationshipCommands,
}

#[derive(Subcommand)]
pub enum RelationshipCommands {
    /// Link two elements
    Add {
        /// Relationship type
        #[arg(short = 't', long = "type")]
        type_name: String,
        /// GUID of end 1
        end1: String,
        /// GUID of end 2
        end2: String,
        /// Property as key=value (repeatable)
        #[arg(short, long = "prop")]
        props: Vec<String>,
    },
    /// List the relationships attached to an element
    List {
        /// Element GUID
        guid: String,
        /// Filter by relationship type
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,
        /// First result to return
        #[arg(long, default_value = "0")]
        start: usize,
        /// Results per page
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Delete a relationship
    Delete {
        /// Relationship GUID
        guid: String,
    },
}

pub async fn run(args: &RelationshipArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let catalog = &ctx.catalog;
    let format = cli.output_format();

    match &args.command {
        RelationshipCommands::Add {
            type_name,
            end1,
            end2,
            props,
        } => {
            let mut relationship = Relationship::new(type_name.as_str(), parse_guid(end1)?, parse_guid(end2)?);
            relationship.properties = parse_properties(props)?;

            let guid = catalog
                .repository
                .create_relationship(&catalog.caller, relationship, &ctx.options)
                .await?;
            ctx.save()?;
            tracing::info!("Created relationship: {} ({} -> {})", guid, end1, end2);

            match format {
                OutputFormat::Json => println!("{}", to_json(&json!({ "guid": guid }))?),
                OutputFormat::Table => println!("Created relationship: {} (type: {})", guid, type_name),
            }
        }
        RelationshipCommands::List {
            guid,
            type_name,
            start,
            page_size,
        } => {
            let guid = parse_guid(guid)?;
            let relationships = catalog
                .repository
                .get_attachment_links(
                    &catalog.caller,
                    &guid,
                    type_name.as_deref(),
                    &SequencingOrder::CreationDateRecent,
                    &ctx.options,
                    &ctx.paging(*start, *page_size),
                )
                .await?;

            match format {
                OutputFormat::Json => println!("{}", to_json(&relationships)?),
                OutputFormat::Table if relationships.is_empty() => println!("No relationships found for {}", guid),
                OutputFormat::Table => {
                    println!("Relationships of {} ({} found):", guid, relationships.len());
                    for relationship in &relationships {
                        println!("  {}", relationship_line(relationship));
                    }
                }
            }
        }
        RelationshipCommands::Delete { guid } => {
            let guid = parse_guid(guid)?;
            catalog
                .repository
                .delete_relationship(&catalog.caller, &guid, &ctx.options)
                .await?;
            ctx.save()?;
            println!("Deleted relationship: {}", guid);
        }
    }

    Ok(())
}

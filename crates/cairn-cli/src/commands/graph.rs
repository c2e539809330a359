//! Anchored graph command

use clap::Args;

use super::{parse_guid, parse_time};
use crate::output::{element_line, relationship_line, to_json, OutputFormat};
use crate::{AppContext, Cli};
use cairn_core::{AnchorGraphAssembler, HistoryQueries};

#[derive(Args)]
pub struct GraphArgs {
    /// GUID of the anchor element
    pub anchor: String,

    /// Reconstruct the graph as it was at this time (RFC 3339)
    #[arg(long)]
    pub as_of: Option<String>,

    /// First anchored element to return
    #[arg(long, default_value = "0")]
    pub start: usize,

    /// Anchored elements per page
    #[arg(long)]
    pub page_size: Option<usize>,
}

pub async fn run(args: &GraphArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let anchor_guid = parse_guid(&args.anchor)?;
    let paging = ctx.paging(args.start, args.page_size);

    let graph = match &args.as_of {
        Some(as_of) => {
            HistoryQueries::anchored_graph_as_of(&ctx.catalog, &anchor_guid, parse_time(as_of)?, &ctx.options, &paging)
                .await?
        }
        None => AnchorGraphAssembler::build_anchored_graph(&ctx.catalog, &anchor_guid, &ctx.options, &paging).await?,
    };

    match cli.output_format() {
        OutputFormat::Json => println!("{}", to_json(&graph)?),
        OutputFormat::Table => {
            let Some(anchor) = &graph.anchor else {
                println!("No graph found for {}", anchor_guid);
                return Ok(());
            };
            println!("Anchor: {}", element_line(anchor));
            println!("Anchored elements ({}):", graph.anchored_elements.len());
            for element in &graph.anchored_elements {
                println!("  {}", element_line(element));
            }
            println!("Relationships ({}):", graph.relationships.len());
            for relationship in &graph.relationships {
                println!("  {}", relationship_line(relationship));
            }
        }
    }

    Ok(())
}

//! Search commands

use clap::Args;

use super::parse_guid;
use crate::output::{element_line, to_json, OutputFormat};
use crate::{AppContext, Cli};
use cairn_core::{AnchorSearch, FindQuery, SearchConditionBuilder};

#[derive(Args)]
pub struct SearchArgs {
    /// Regular expression matched against the descriptive properties
    pub query: Option<String>,

    /// Only elements anchored in this domain, grouped by anchor
    #[arg(long, conflicts_with = "scope")]
    pub domain: Option<String>,

    /// Only elements whose anchor sits under this scope GUID
    #[arg(long)]
    pub scope: Option<String>,

    /// Filter by type, including subtypes
    #[arg(short = 't', long = "type", conflicts_with_all = ["domain", "scope"])]
    pub type_name: Option<String>,

    /// First result to return
    #[arg(long, default_value = "0")]
    pub start: usize,

    /// Results per page
    #[arg(long)]
    pub page_size: Option<usize>,
}

pub async fn run(args: &SearchArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let format = cli.output_format();
    let paging = ctx.paging(args.start, args.page_size);
    let search_string = args.query.as_deref();

    tracing::debug!("Searching for {:?}", search_string);

    if let Some(domain) = &args.domain {
        let groups = AnchorSearch::find_in_anchor_domain(&ctx.catalog, search_string, domain, &ctx.options, &paging).await?;
        match format {
            OutputFormat::Json => println!("{}", to_json(&groups)?),
            OutputFormat::Table if groups.is_empty() => println!("No matches in domain '{}'", domain),
            OutputFormat::Table => {
                for group in &groups {
                    println!("{}", element_line(&group.anchor));
                    for element in &group.matches {
                        println!("  {}", element_line(element));
                    }
                }
            }
        }
        return Ok(());
    }

    let elements = match &args.scope {
        Some(scope) => {
            AnchorSearch::find_in_anchor_scope(&ctx.catalog, search_string, &parse_guid(scope)?, &ctx.options, &paging)
                .await?
        }
        None => {
            let query = match &args.type_name {
                Some(type_name) => FindQuery::of_type(type_name.as_str()),
                None => FindQuery::new(),
            }
            .with_properties(SearchConditionBuilder::default_text_search(search_string));
            ctx.catalog
                .repository
                .find_elements(&ctx.catalog.caller, &query, &ctx.options, &paging)
                .await?
        }
    };
    tracing::info!("Found {} results", elements.len());

    match format {
        OutputFormat::Json => println!("{}", to_json(&elements)?),
        OutputFormat::Table if elements.is_empty() => println!("No results found"),
        OutputFormat::Table => {
            println!("Results ({} found):", elements.len());
            for element in &elements {
                println!("  {}", element_line(element));
            }
        }
    }

    Ok(())
}

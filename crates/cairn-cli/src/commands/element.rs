//! Element commands

use clap::{Args, Subcommand};
use serde_json::json;

use super::{parse_guid, parse_properties, parse_time};
use crate::output::{element_line, to_json, OutputFormat};
use crate::{AppContext, Cli};
use cairn_core::classification::{MEMENTO_CLASSIFICATION, ZONE_MEMBERSHIP_CLASSIFICATION, ZONE_MEMBERSHIP_PROPERTY};
use cairn_core::{AnchorRef, Classification, Element, FindQuery, HistoryQueries, SequencingOrder};

#[derive(Args)]
pub struct ElementArgs {
    #[command(subcommand)]
    pub command: ElementCommands,
}

#[derive(Subcommand)]
pub enum ElementCommands {
    /// Add a new element
    Add {
        /// Element type
        #[arg(short = 't', long = "type")]
        type_name: String,
        /// Unique qualified name
        #[arg(long)]
        qualified_name: Option<String>,
        /// Display name
        #[arg(short, long)]
        name: Option<String>,
        /// Property as key=value (repeatable)
        #[arg(short, long = "prop")]
        props: Vec<String>,
        /// Anchor the element to this GUID
        #[arg(long)]
        anchor: Option<String>,
        /// Type name of the anchor
        #[arg(long, default_value = "Referenceable")]
        anchor_type: String,
        /// Domain of the anchor
        #[arg(long, requires = "anchor")]
        domain: Option<String>,
        /// Scope GUID of the anchor
        #[arg(long, requires = "anchor")]
        scope: Option<String>,
        /// Restrict the element to a governance zone (repeatable)
        #[arg(long = "in-zone")]
        in_zones: Vec<String>,
        /// Mark the element as a memento
        #[arg(long)]
        memento: bool,
    },
    /// Show an element
    Show {
        /// Element GUID
        guid: String,
        /// Show the element as it was at this time (RFC 3339)
        #[arg(long)]
        as_of: Option<String>,
    },
    /// List elements
    List {
        /// Filter by type, including subtypes
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,
        /// First result to return
        #[arg(long, default_value = "0")]
        start: usize,
        /// Results per page
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Update element properties
    Update {
        /// Element GUID
        guid: String,
        /// Property as key=value (repeatable)
        #[arg(short, long = "prop", required = true)]
        props: Vec<String>,
    },
    /// Delete an element and its relationships
    Delete {
        /// Element GUID
        guid: String,
    },
}

pub async fn run(args: &ElementArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let catalog = &ctx.catalog;
    let format = cli.output_format();

    match &args.command {
        ElementCommands::Add {
            type_name,
            qualified_name,
            name,
            props,
            anchor,
            anchor_type,
            domain,
            scope,
            in_zones,
            memento,
        } => {
            let mut element = Element::new(type_name.as_str());
            element.properties = parse_properties(props)?;
            if let Some(qualified_name) = qualified_name {
                element = element.with_qualified_name(qualified_name.as_str());
            }
            if let Some(name) = name {
                element = element.with_property("name", name.as_str());
            }
            if let Some(anchor) = anchor {
                let mut anchor = AnchorRef::new(parse_guid(anchor)?, anchor_type.as_str());
                if let Some(domain) = domain {
                    anchor = anchor.with_domain(domain.as_str());
                }
                if let Some(scope) = scope {
                    anchor = anchor.with_scope(parse_guid(scope)?);
                }
                element = element.with_anchor(anchor);
            }
            if !in_zones.is_empty() {
                element = element.with_classification(
                    Classification::new(ZONE_MEMBERSHIP_CLASSIFICATION)
                        .with_property(ZONE_MEMBERSHIP_PROPERTY, json!(in_zones)),
                );
            }
            if *memento {
                element = element.with_classification(Classification::new(MEMENTO_CLASSIFICATION));
            }

            let guid = catalog
                .repository
                .create_element(&catalog.caller, element, &ctx.options)
                .await?;
            ctx.save()?;
            tracing::info!("Created element: {} (type: {})", guid, type_name);

            match format {
                OutputFormat::Json => println!("{}", to_json(&json!({ "guid": guid }))?),
                OutputFormat::Table => println!("Created element: {} (type: {})", guid, type_name),
            }
        }
        ElementCommands::Show { guid, as_of } => {
            let guid = parse_guid(guid)?;
            let element = match as_of {
                Some(as_of) => HistoryQueries::element_as_of(catalog, &guid, parse_time(as_of)?, &ctx.options).await?,
                None => {
                    catalog
                        .repository
                        .get_element_by_guid(&catalog.caller, &guid, &ctx.options)
                        .await?
                }
            };

            match (element, format) {
                (Some(element), OutputFormat::Json) => println!("{}", to_json(&element)?),
                (Some(element), OutputFormat::Table) => print_element(&element),
                (None, _) => anyhow::bail!("Element '{}' not found", guid),
            }
        }
        ElementCommands::List {
            type_name,
            start,
            page_size,
        } => {
            let query = match type_name {
                Some(type_name) => FindQuery::of_type(type_name.as_str()),
                None => FindQuery::new(),
            }
            .sequenced_by(SequencingOrder::CreationDateOldest);

            let elements = catalog
                .repository
                .find_elements(&catalog.caller, &query, &ctx.options, &ctx.paging(*start, *page_size))
                .await?;
            tracing::info!("Found {} elements", elements.len());

            match format {
                OutputFormat::Json => println!("{}", to_json(&elements)?),
                OutputFormat::Table if elements.is_empty() => println!("No elements found"),
                OutputFormat::Table => {
                    println!("Elements ({} found):", elements.len());
                    for element in &elements {
                        println!("  {}", element_line(element));
                    }
                }
            }
        }
        ElementCommands::Update { guid, props } => {
            let guid = parse_guid(guid)?;
            let properties = parse_properties(props)?;
            catalog
                .repository
                .update_element_properties(&catalog.caller, &guid, properties, &ctx.options)
                .await?;
            ctx.save()?;
            println!("Updated element: {}", guid);
        }
        ElementCommands::Delete { guid } => {
            let guid = parse_guid(guid)?;
            catalog
                .repository
                .delete_element(&catalog.caller, &guid, &ctx.options)
                .await?;
            ctx.save()?;
            tracing::info!("Deleted element: {}", guid);
            println!("Deleted element: {}", guid);
        }
    }

    Ok(())
}

pub(crate) fn print_element(element: &Element) {
    println!("Element: {}", element.guid);
    println!("  Type: {}", element.type_name);
    if let Some(qualified_name) = element.qualified_name() {
        println!("  Qualified name: {}", qualified_name);
    }
    println!("  Status: {}", element.status.as_str());
    println!("  Version: {}", element.version);
    println!("  Created: {}", element.created_at);
    println!("  Updated: {}", element.updated_at);

    let properties: Vec<_> = element
        .properties
        .iter()
        .filter(|(name, _)| name.as_str() != "qualifiedName")
        .collect();
    if !properties.is_empty() {
        println!("  Properties:");
        for (name, value) in properties {
            println!("    {} = {}", name, value);
        }
    }

    if !element.classifications.is_empty() {
        println!("  Classifications:");
        for classification in &element.classifications {
            println!("    - {}", classification.name);
        }
    }
}

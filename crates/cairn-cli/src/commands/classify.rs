//! Classification commands

use clap::{Args, Subcommand};

use super::{parse_guid, parse_properties};
use crate::{AppContext, Cli};
use cairn_core::{AnchorRef, Classification};

#[derive(Args)]
pub struct ClassifyArgs {
    #[command(subcommand)]
    pub command: ClassifyCommands,
}

#[derive(Subcommand)]
pub enum ClassifyCommands {
    /// Attach or replace a classification
    Add {
        /// Element GUID
        guid: String,
        /// Classification name
        name: String,
        /// Property as key=value (repeatable)
        #[arg(short, long = "prop")]
        props: Vec<String>,
    },
    /// Anchor an element to another element
    Anchor {
        /// Element GUID
        guid: String,
        /// GUID of the anchor
        anchor: String,
        /// Type name of the anchor
        #[arg(long, default_value = "Referenceable")]
        anchor_type: String,
        /// Domain of the anchor
        #[arg(long)]
        domain: Option<String>,
        /// Scope GUID of the anchor
        #[arg(long)]
        scope: Option<String>,
    },
}

pub async fn run(args: &ClassifyArgs, _cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let catalog = &ctx.catalog;

    let (guid, classification) = match &args.command {
        ClassifyCommands::Add { guid, name, props } => {
            let mut classification = Classification::new(name.as_str());
            classification.properties = parse_properties(props)?;
            (parse_guid(guid)?, classification)
        }
        ClassifyCommands::Anchor {
            guid,
            anchor,
            anchor_type,
            domain,
            scope,
        } => {
            let mut anchor = AnchorRef::new(parse_guid(anchor)?, anchor_type.as_str());
            if let Some(domain) = domain {
                anchor = anchor.with_domain(domain.as_str());
            }
            if let Some(scope) = scope {
                anchor = anchor.with_scope(parse_guid(scope)?);
            }
            (parse_guid(guid)?, anchor.into_classification())
        }
    };

    let name = classification.name.clone();
    catalog
        .repository
        .classify_element(&catalog.caller, &guid, classification, &ctx.options)
        .await?;
    ctx.save()?;
    tracing::info!("Classified {} as {}", guid, name);
    println!("Classified element: {} ({})", guid, name);

    Ok(())
}

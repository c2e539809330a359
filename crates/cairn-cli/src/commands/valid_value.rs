//! Valid value commands

use clap::{Args, Subcommand};
use serde_json::json;

use super::parse_time;
use crate::output::{definition_line, to_json, OutputFormat};
use crate::{AppContext, Cli};
use cairn_core::{ValidValueKey, ValidValueManager, ValidValueProperties};

#[derive(Args)]
pub struct ValidValueArgs {
    #[command(subcommand)]
    pub command: ValidValueCommands,
}

/// Where a value sits in the hierarchy
#[derive(Args, Clone)]
pub struct ValuePathArgs {
    /// Type the value applies to; omit for any type
    #[arg(short = 't', long = "type")]
    pub type_name: Option<String>,

    /// Property the value applies to
    #[arg(short, long)]
    pub property: Option<String>,

    /// Map key the value applies to
    #[arg(short, long, requires = "property")]
    pub map: Option<String>,
}

impl ValuePathArgs {
    fn key(&self, value: &str) -> ValidValueKey {
        ValidValueKey::new(
            self.type_name.as_deref(),
            self.property.as_deref(),
            self.map.as_deref(),
            value,
        )
    }
}

/// Descriptive properties of a value or map name
#[derive(Args, Clone)]
pub struct DescriptionArgs {
    #[arg(long)]
    pub display_name: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    /// Keep the value but mark it as deprecated
    #[arg(long)]
    pub deprecated: bool,

    #[arg(long)]
    pub case_sensitive: bool,

    /// First time the value is in force (RFC 3339)
    #[arg(long)]
    pub effective_from: Option<String>,

    /// Time the value stops being in force (RFC 3339)
    #[arg(long)]
    pub effective_to: Option<String>,
}

impl DescriptionArgs {
    fn properties(&self) -> anyhow::Result<ValidValueProperties> {
        let mut properties = ValidValueProperties::new()
            .deprecated(self.deprecated)
            .case_sensitive(self.case_sensitive);
        if let Some(display_name) = &self.display_name {
            properties = properties.with_display_name(display_name.as_str());
        }
        if let Some(description) = &self.description {
            properties = properties.with_description(description.as_str());
        }
        if let Some(from) = &self.effective_from {
            properties = properties.effective_from(parse_time(from)?);
        }
        if let Some(to) = &self.effective_to {
            properties = properties.effective_to(parse_time(to)?);
        }
        Ok(properties)
    }
}

#[derive(Subcommand)]
pub enum ValidValueCommands {
    /// Create or update a valid value
    Set {
        #[command(flatten)]
        path: ValuePathArgs,
        /// Preferred value
        value: String,
        #[command(flatten)]
        description: DescriptionArgs,
    },
    /// Show the definition a value resolves to
    Get {
        #[command(flatten)]
        path: ValuePathArgs,
        /// Preferred value
        value: String,
    },
    /// Delete a valid value
    Delete {
        #[command(flatten)]
        path: ValuePathArgs,
        /// Preferred value
        value: String,
    },
    /// List the valid values of a type and property
    List {
        /// Type the values apply to; omit for any type
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,
        /// Property the values apply to
        #[arg(short, long)]
        property: Option<String>,
        /// First result to return
        #[arg(long, default_value = "0")]
        start: usize,
        /// Results per page
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Check a value against the valid values. Exits 1 when invalid.
    Validate {
        #[command(flatten)]
        path: ValuePathArgs,
        /// Value to check
        value: String,
    },
    /// Set up or check a map name of a property
    MapName {
        /// Type the map applies to; omit for any type
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,
        /// Map-valued property
        #[arg(short, long)]
        property: String,
        /// Map key
        map_name: String,
        /// Check the map name instead of setting it up. Exits 1 when invalid.
        #[arg(long)]
        check: bool,
        #[command(flatten)]
        description: DescriptionArgs,
    },
}

pub async fn run(args: &ValidValueArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let catalog = &ctx.catalog;
    let format = cli.output_format();

    match &args.command {
        ValidValueCommands::Set {
            path,
            value,
            description,
        } => {
            let key = path.key(value);
            let guid = ValidValueManager::set_up_value(catalog, &key, &description.properties()?, &ctx.options).await?;
            ctx.save()?;

            match format {
                OutputFormat::Json => println!("{}", to_json(&json!({ "guid": guid, "qualifiedName": key.qualified_name() }))?),
                OutputFormat::Table => println!("Set valid value: {} ({})", key.qualified_name(), guid),
            }
        }
        ValidValueCommands::Get { path, value } => {
            let definition = ValidValueManager::get_value(catalog, &path.key(value), &ctx.options).await?;
            match format {
                OutputFormat::Json => println!("{}", to_json(&definition)?),
                OutputFormat::Table => {
                    println!("Valid value: {}", definition.qualified_name);
                    println!("  GUID: {}", definition.guid);
                    if let Some(preferred_value) = &definition.preferred_value {
                        println!("  Preferred value: {}", preferred_value);
                    }
                    if let Some(display_name) = &definition.display_name {
                        println!("  Display name: {}", display_name);
                    }
                    if let Some(description) = &definition.description {
                        println!("  Description: {}", description);
                    }
                    if let Some(category) = &definition.category {
                        println!("  Category: {}", category);
                    }
                    println!("  Deprecated: {}", definition.is_deprecated);
                    println!("  Case sensitive: {}", definition.is_case_sensitive);
                    if let Some(from) = definition.effective.from {
                        println!("  Effective from: {}", from.to_rfc3339());
                    }
                    if let Some(to) = definition.effective.to {
                        println!("  Effective to: {}", to.to_rfc3339());
                    }
                }
            }
        }
        ValidValueCommands::Delete { path, value } => {
            let key = path.key(value);
            ValidValueManager::delete_leaf_value(catalog, &key, &ctx.options).await?;
            ctx.save()?;
            println!("Deleted valid value: {}", key.qualified_name());
        }
        ValidValueCommands::List {
            type_name,
            property,
            start,
            page_size,
        } => {
            let details = ValidValueManager::list_valid_values(
                catalog,
                type_name.as_deref(),
                property.as_deref(),
                &ctx.options,
                &ctx.paging(*start, *page_size),
            )
            .await?;

            match format {
                OutputFormat::Json => println!("{}", to_json(&details)?),
                OutputFormat::Table if details.is_empty() => println!("No valid values found"),
                OutputFormat::Table => {
                    println!("Valid values ({} found):", details.len());
                    for detail in &details {
                        println!("  {}", definition_line(&detail.definition));
                        for map_value in &detail.map_values {
                            println!("    {}", definition_line(map_value));
                        }
                    }
                }
            }
        }
        ValidValueCommands::Validate { path, value } => {
            let valid = match (&path.property, &path.map) {
                (Some(property), Some(map)) => {
                    ValidValueManager::is_valid_map_value(
                        catalog,
                        path.type_name.as_deref(),
                        property,
                        map,
                        value,
                        &ctx.options,
                    )
                    .await?
                }
                _ => {
                    ValidValueManager::is_valid_value(
                        catalog,
                        path.type_name.as_deref(),
                        path.property.as_deref(),
                        value,
                        &ctx.options,
                    )
                    .await?
                }
            };
            report_validity(value, valid, format)?;
        }
        ValidValueCommands::MapName {
            type_name,
            property,
            map_name,
            check,
            description,
        } => {
            if *check {
                let valid =
                    ValidValueManager::is_valid_map_name(catalog, type_name.as_deref(), property, map_name, &ctx.options)
                        .await?;
                report_validity(map_name, valid, format)?;
            } else {
                let guid = ValidValueManager::set_up_map_name(
                    catalog,
                    type_name.as_deref(),
                    property,
                    map_name,
                    &description.properties()?,
                    &ctx.options,
                )
                .await?;
                ctx.save()?;
                println!("Set map name: {} ({})", map_name, guid);
            }
        }
    }

    Ok(())
}

fn report_validity(value: &str, valid: bool, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(&json!({ "value": value, "valid": valid }))?),
        OutputFormat::Table if valid => println!("'{}' is valid", value),
        OutputFormat::Table => println!("'{}' is not valid", value),
    }
    if !valid {
        std::process::exit(1);
    }
    Ok(())
}

//! Output formatting utilities

use cairn_core::valid_values::ValidValueDefinition;
use cairn_core::{Element, Relationship};
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Table,
        }
    }
}

/// Render as pretty JSON
pub fn to_json<T: Serialize>(data: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// One-line summary of an element
pub fn element_line(element: &Element) -> String {
    let label = element
        .string_property("name")
        .or_else(|| element.string_property("displayName"))
        .or_else(|| element.qualified_name())
        .unwrap_or("-");
    format!(
        "{}  {:<24} {:<32} v{} {}",
        element.guid,
        element.type_name,
        label,
        element.version,
        element.status.as_str()
    )
}

/// One-line summary of a relationship
pub fn relationship_line(relationship: &Relationship) -> String {
    format!(
        "{}  {:<24} {} -> {} v{}",
        relationship.guid, relationship.type_name, relationship.end1, relationship.end2, relationship.version
    )
}

/// One-line summary of a valid value definition
pub fn definition_line(definition: &ValidValueDefinition) -> String {
    let mut line = format!("{}  {}", definition.guid, definition.qualified_name);
    if let Some(description) = &definition.description {
        line.push_str(&format!("  \"{}\"", description));
    }
    if definition.is_deprecated {
        line.push_str("  (deprecated)");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!(OutputFormat::from("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from("table"), OutputFormat::Table);
        assert_eq!(OutputFormat::from("csv"), OutputFormat::Table);
    }

    #[test]
    fn test_element_line_prefers_name() {
        let element = Element::new("Asset")
            .with_qualified_name("Asset::Payroll")
            .with_property("name", "Payroll");
        let line = element_line(&element);
        assert!(line.contains("Payroll"));
        assert!(line.starts_with(&element.guid.to_string()));
    }
}

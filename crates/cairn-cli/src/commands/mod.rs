//! CLI command implementations

pub mod classify;
pub mod completions;
pub mod config;
pub mod consistent;
pub mod element;
pub mod graph;
pub mod history;
pub mod relationship;
pub mod search;
pub mod valid_value;

use cairn_core::{Guid, Properties};
use chrono::{DateTime, Utc};

/// Parse an RFC 3339 timestamp
pub fn parse_time(s: &str) -> anyhow::Result<DateTime<Utc>> {
    let time = DateTime::parse_from_rfc3339(s)
        .map_err(|e| anyhow::anyhow!("Invalid time '{}': {}. Expected RFC 3339, e.g. 2024-01-31T12:00:00Z", s, e))?;
    Ok(time.with_timezone(&Utc))
}

pub fn parse_guid(s: &str) -> anyhow::Result<Guid> {
    s.parse::<Guid>()
        .map_err(|e| anyhow::anyhow!("Invalid GUID '{}': {}", s, e))
}

/// Parse `key=value` pairs. Values that read as JSON keep their type,
/// anything else is stored as a string.
pub fn parse_properties(pairs: &[String]) -> anyhow::Result<Properties> {
    let mut properties = Properties::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            anyhow::bail!("Invalid property '{}', expected key=value", pair);
        };
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("Invalid property '{}', key is empty", pair);
        }
        let value = serde_json::from_str(value).unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        properties.insert(key.to_string(), value);
    }
    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_properties_keeps_json_types() {
        let properties = parse_properties(&[
            "name=Payroll".to_string(),
            "rows=42".to_string(),
            "active=true".to_string(),
            "note=a=b".to_string(),
        ])
        .unwrap();

        assert_eq!(properties["name"], json!("Payroll"));
        assert_eq!(properties["rows"], json!(42));
        assert_eq!(properties["active"], json!(true));
        assert_eq!(properties["note"], json!("a=b"));
    }

    #[test]
    fn test_parse_properties_rejects_missing_value() {
        assert!(parse_properties(&["name".to_string()]).is_err());
        assert!(parse_properties(&["=x".to_string()]).is_err());
    }

    #[test]
    fn test_parse_time() {
        let time = parse_time("2024-01-31T12:00:00+01:00").unwrap();
        assert_eq!(time.to_rfc3339(), "2024-01-31T11:00:00+00:00");
        assert!(parse_time("yesterday").is_err());
    }
}

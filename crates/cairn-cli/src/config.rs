//! CLI configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "CAIRN_CONFIG";

pub const DEFAULT_USER_ID: &str = "cairn";

/// Get default snapshot file
pub fn default_data_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cairn")
        .join("catalog.json")
}

/// Location of the config file
pub fn config_file_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cairn")
        .join("config.toml")
}

/// Configuration for the CLI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_file: Option<String>,
    pub user_id: Option<String>,
    pub zones: Vec<String>,
    pub page_size: Option<usize>,
    pub for_lineage: bool,
    pub for_duplicate_processing: bool,
}

impl Config {
    /// Load the config file. A missing or unreadable file gives the defaults.
    pub fn load() -> Self {
        let path = config_file_path();
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring invalid config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &[
            "data_file",
            "user_id",
            "zones",
            "page_size",
            "for_lineage",
            "for_duplicate_processing",
        ]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let unset = || "(not set)".to_string();
        match key {
            "data_file" => Some(self.data_file.clone().unwrap_or_else(unset)),
            "user_id" => Some(self.user_id.clone().unwrap_or_else(unset)),
            "zones" => Some(self.zones.join(",")),
            "page_size" => Some(self.page_size.map(|n| n.to_string()).unwrap_or_else(unset)),
            "for_lineage" => Some(self.for_lineage.to_string()),
            "for_duplicate_processing" => Some(self.for_duplicate_processing.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let optional = |value: &str| (!value.is_empty()).then(|| value.to_string());
        match key {
            "data_file" => self.data_file = optional(value),
            "user_id" => self.user_id = optional(value),
            "zones" => {
                self.zones = value
                    .split(',')
                    .map(str::trim)
                    .filter(|zone| !zone.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            "page_size" => {
                self.page_size = if value.is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(|_| anyhow::anyhow!("page_size must be a number, got '{}'", value))?)
                }
            }
            "for_lineage" => self.for_lineage = parse_bool(key, value)?,
            "for_duplicate_processing" => self.for_duplicate_processing = parse_bool(key, value)?,
            _ => anyhow::bail!("Unknown config key: {}. Available keys: {}", key, Self::keys().join(", ")),
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => anyhow::bail!("{} must be true or false, got '{}'", key, value),
    }
}

//! JSON snapshot persistence for the in-memory repository
//!
//! A snapshot carries a format version so older files can be upgraded and
//! files from newer releases are refused rather than misread.

use crate::error::{StorageError, StorageResult};
use crate::memory::{MemoryRepository, MemoryState};
use crate::versioned::Versioned;
use cairn_core::{Element, Guid, Relationship, TypeDef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Snapshot format information
#[derive(Debug, Clone)]
pub struct SnapshotFormat {
    pub version: u32,
    pub description: &'static str,
}

/// All snapshot formats this build can read
pub fn get_formats() -> Vec<SnapshotFormat> {
    vec![SnapshotFormat {
        version: 1,
        description: "Versioned elements, relationships and type definitions",
    }]
}

/// Full revision history of one stored item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record<T> {
    pub guid: Guid,
    pub history: Versioned<T>,
}

/// Serialized form of a whole repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,

    #[serde(default)]
    pub type_defs: Vec<TypeDef>,

    #[serde(default)]
    pub elements: Vec<Record<Element>>,

    #[serde(default)]
    pub relationships: Vec<Record<Relationship>>,
}

impl Snapshot {
    /// Refuse versions this build does not understand
    pub fn check_version(&self) -> StorageResult<()> {
        if self.version > SNAPSHOT_VERSION {
            return Err(StorageError::Snapshot(format!(
                "snapshot version {} is newer than supported version {}",
                self.version, SNAPSHOT_VERSION
            )));
        }
        if !get_formats().iter().any(|f| f.version == self.version) {
            return Err(StorageError::Snapshot(format!(
                "unknown snapshot version {}",
                self.version
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> StorageResult<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    pub fn to_json(&self) -> StorageResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl MemoryRepository {
    /// Capture the whole store, history included
    pub fn to_snapshot(&self) -> StorageResult<Snapshot> {
        let state = self.read()?;

        let mut type_defs: Vec<TypeDef> = state.type_defs.values().cloned().collect();
        type_defs.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Snapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            type_defs,
            elements: state
                .elements
                .iter()
                .map(|(guid, history)| Record {
                    guid: guid.clone(),
                    history: history.clone(),
                })
                .collect(),
            relationships: state
                .relationships
                .iter()
                .map(|(guid, history)| Record {
                    guid: guid.clone(),
                    history: history.clone(),
                })
                .collect(),
        })
    }

    pub fn from_snapshot(snapshot: Snapshot) -> StorageResult<Self> {
        snapshot.check_version()?;

        let mut state = MemoryState::default();
        for type_def in snapshot.type_defs {
            state.type_defs.insert(type_def.name.clone(), type_def);
        }
        for record in snapshot.elements {
            state.elements.insert(record.guid, record.history);
        }
        for record in snapshot.relationships {
            state.relationships.insert(record.guid, record.history);
        }

        tracing::debug!(
            "Loaded snapshot v{}: {} elements, {} relationships",
            snapshot.version,
            state.elements.len(),
            state.relationships.len()
        );
        Ok(Self::from_state(state))
    }

    /// Load from `path`; a missing file gives an empty repository
    pub fn load(path: &Path) -> StorageResult<Self> {
        if !path.exists() {
            tracing::debug!("No snapshot at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_snapshot(Snapshot::from_json(&json)?)
    }

    /// Write to `path` through a temporary file so a failed save never
    /// truncates the previous snapshot
    pub fn save(&self, path: &Path) -> StorageResult<()> {
        let json = self.to_snapshot()?.to_json()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;

        tracing::info!("Saved snapshot to {}", path.display());
        Ok(())
    }
}

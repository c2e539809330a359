//! Relationship (edge) types and operations

use crate::element::{EffectiveWindow, ElementStatus, Guid, Properties};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which end of a relationship an element must occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndSelector {
    End1,
    End2,
    #[default]
    Either,
}

/// A typed link between two elements.
///
/// End order is significant: `end1` and `end2` are never swapped or sorted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    /// Unique identifier, stable across every retrieval path
    pub guid: Guid,

    /// Type of relationship (e.g. "ValidValueMember")
    pub type_name: String,

    pub end1: Guid,
    pub end2: Guid,

    #[serde(default)]
    pub properties: Properties,

    pub status: ElementStatus,

    #[serde(default)]
    pub effective: EffectiveWindow,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub version: u64,
}

impl Relationship {
    /// Create a new relationship between two elements
    pub fn new(type_name: impl Into<String>, end1: Guid, end2: Guid) -> Self {
        let now = Utc::now();
        Self {
            guid: Guid::new(),
            type_name: type_name.into(),
            end1,
            end2,
            properties: Properties::new(),
            status: ElementStatus::Active,
            effective: EffectiveWindow::default(),
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_effective(mut self, effective: EffectiveWindow) -> Self {
        self.effective = effective;
        self
    }

    /// Whether `guid` sits at the selected end
    pub fn has_end(&self, guid: &Guid, selector: EndSelector) -> bool {
        match selector {
            EndSelector::End1 => &self.end1 == guid,
            EndSelector::End2 => &self.end2 == guid,
            EndSelector::Either => &self.end1 == guid || &self.end2 == guid,
        }
    }

    /// The end opposite `guid`, or `None` if `guid` is not an end at all
    pub fn other_end(&self, guid: &Guid) -> Option<&Guid> {
        if &self.end1 == guid {
            Some(&self.end2)
        } else if &self.end2 == guid {
            Some(&self.end1)
        } else {
            None
        }
    }

    /// True when this relationship joins `a` and `b` in either order
    pub fn connects(&self, a: &Guid, b: &Guid) -> bool {
        (&self.end1 == a && &self.end2 == b) || (&self.end1 == b && &self.end2 == a)
    }

    pub fn is_effective_at(&self, effective_time: Option<DateTime<Utc>>) -> bool {
        self.status != ElementStatus::Deleted && self.effective.is_effective_at(effective_time)
    }
}

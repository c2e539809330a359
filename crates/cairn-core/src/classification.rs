//! Classification types - named tags attached to a single element

use crate::element::{EffectiveWindow, Guid, Properties};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification marking an element as owned by an anchor
pub const ANCHORS_CLASSIFICATION: &str = "Anchors";

/// Classification marking an element as logically deleted but kept for lineage
pub const MEMENTO_CLASSIFICATION: &str = "Memento";

/// Classification restricting an element to a set of governance zones
pub const ZONE_MEMBERSHIP_CLASSIFICATION: &str = "AssetZoneMembership";

/// Property of the zone classification listing its zone names
pub const ZONE_MEMBERSHIP_PROPERTY: &str = "zoneMembership";

pub const ANCHOR_GUID_PROPERTY: &str = "anchorGUID";
pub const ANCHOR_TYPE_NAME_PROPERTY: &str = "anchorTypeName";
pub const ANCHOR_DOMAIN_NAME_PROPERTY: &str = "anchorDomainName";
pub const ANCHOR_SCOPE_GUID_PROPERTY: &str = "anchorScopeGUID";

/// A classification attached to an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Classification name, unique per element
    pub name: String,

    #[serde(default)]
    pub properties: Properties,

    #[serde(default)]
    pub effective: EffectiveWindow,

    /// When this classification was attached
    pub created_at: DateTime<Utc>,
}

impl Classification {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Properties::new(),
            effective: EffectiveWindow::default(),
            created_at: Utc::now(),
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

    pub fn string_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(|v| v.as_str())
    }
}

/// Reference from an anchored element to the root that owns it.
///
/// Anchors are always roots: an anchor never has an anchor of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorRef {
    pub anchor_guid: Guid,
    pub anchor_type_name: String,

    /// Domain of the anchor type, e.g. "Asset" for every asset subtype
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_domain_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_scope_guid: Option<Guid>,
}

impl AnchorRef {
    pub fn new(anchor_guid: Guid, anchor_type_name: impl Into<String>) -> Self {
        Self {
            anchor_guid,
            anchor_type_name: anchor_type_name.into(),
            anchor_domain_name: None,
            anchor_scope_guid: None,
        }
    }

    pub fn with_domain(mut self, domain_name: impl Into<String>) -> Self {
        self.anchor_domain_name = Some(domain_name.into());
        self
    }

    pub fn with_scope(mut self, scope_guid: Guid) -> Self {
        self.anchor_scope_guid = Some(scope_guid);
        self
    }

    /// Read an anchor reference back out of an `Anchors` classification.
    /// Returns `None` when the anchor GUID is missing or malformed.
    pub fn from_classification(classification: &Classification) -> Option<Self> {
        let anchor_guid = classification
            .string_property(ANCHOR_GUID_PROPERTY)
            .and_then(|s| Guid::from_string(s).ok())?;
        Some(Self {
            anchor_guid,
            anchor_type_name: classification
                .string_property(ANCHOR_TYPE_NAME_PROPERTY)
                .unwrap_or_default()
                .to_string(),
            anchor_domain_name: classification
                .string_property(ANCHOR_DOMAIN_NAME_PROPERTY)
                .map(str::to_string),
            anchor_scope_guid: classification
                .string_property(ANCHOR_SCOPE_GUID_PROPERTY)
                .and_then(|s| Guid::from_string(s).ok()),
        })
    }

    pub fn into_classification(self) -> Classification {
        let mut classification = Classification::new(ANCHORS_CLASSIFICATION)
            .with_property(ANCHOR_GUID_PROPERTY, self.anchor_guid.to_string())
            .with_property(ANCHOR_TYPE_NAME_PROPERTY, self.anchor_type_name);
        if let Some(domain) = self.anchor_domain_name {
            classification = classification.with_property(ANCHOR_DOMAIN_NAME_PROPERTY, domain);
        }
        if let Some(scope) = self.anchor_scope_guid {
            classification = classification.with_property(ANCHOR_SCOPE_GUID_PROPERTY, scope.to_string());
        }
        classification
    }
}

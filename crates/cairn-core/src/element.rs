//! Element (entity) types and operations

use crate::classification::{AnchorRef, Classification, ANCHORS_CLASSIFICATION};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ulid::Ulid;

/// Property bag shared by elements, relationships and classifications.
pub type Properties = BTreeMap<String, serde_json::Value>;

/// Property holding an element's unique name.
pub const QUALIFIED_NAME_PROPERTY: &str = "qualifiedName";

/// Globally unique identifier for elements and relationships
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Guid(pub Ulid);

impl Guid {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for Guid {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Guid {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

/// Lifecycle status of an element or relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementStatus {
    Unknown,
    Draft,
    Prepared,
    Proposed,
    Approved,
    Rejected,
    #[default]
    Active,
    Deprecated,
    Other,
    Deleted,
}

impl ElementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Draft => "DRAFT",
            Self::Prepared => "PREPARED",
            Self::Proposed => "PROPOSED",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Active => "ACTIVE",
            Self::Deprecated => "DEPRECATED",
            Self::Other => "OTHER",
            Self::Deleted => "DELETED",
        }
    }
}

impl std::fmt::Display for ElementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `[from, to)` window during which a property set is active.
///
/// An open bound (`None`) is unconditionally effective on that side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
}

impl EffectiveWindow {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    /// Whether the window covers `time`. A missing time matches any window.
    pub fn is_effective_at(&self, time: Option<DateTime<Utc>>) -> bool {
        let Some(time) = time else {
            return true;
        };
        if let Some(from) = self.from {
            if time < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if time >= to {
                return false;
            }
        }
        true
    }

    /// A window whose end precedes its start can never be effective.
    pub fn is_well_formed(&self) -> bool {
        match (self.from, self.to) {
            (Some(from), Some(to)) => from <= to,
            _ => true,
        }
    }
}

/// An element in the catalog (a node)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier
    pub guid: Guid,

    /// Open type system name, e.g. "Asset" or "ValidValueDefinition"
    pub type_name: String,

    /// Typed properties
    #[serde(default)]
    pub properties: Properties,

    pub status: ElementStatus,

    #[serde(default)]
    pub effective: EffectiveWindow,

    /// At most one classification per name
    #[serde(default)]
    pub classifications: Vec<Classification>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Incremented on every stored change
    #[serde(default)]
    pub version: u64,
}

impl Element {
    /// Create a new element
    pub fn new(type_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            guid: Guid::new(),
            type_name: type_name.into(),
            properties: Properties::new(),
            status: ElementStatus::Active,
            effective: EffectiveWindow::default(),
            classifications: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_qualified_name(self, qualified_name: impl Into<String>) -> Self {
        self.with_property(QUALIFIED_NAME_PROPERTY, qualified_name.into())
    }

    pub fn with_status(mut self, status: ElementStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_effective(mut self, effective: EffectiveWindow) -> Self {
        self.effective = effective;
        self
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classify(classification);
        self
    }

    pub fn with_anchor(mut self, anchor: AnchorRef) -> Self {
        self.classify(anchor.into_classification());
        self
    }

    /// String value of a property, if present and a string
    pub fn string_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(|v| v.as_str())
    }

    pub fn bool_property(&self, name: &str) -> Option<bool> {
        self.properties.get(name).and_then(|v| v.as_bool())
    }

    pub fn qualified_name(&self) -> Option<&str> {
        self.string_property(QUALIFIED_NAME_PROPERTY)
    }

    /// Attach a classification, replacing any existing one of the same name
    pub fn classify(&mut self, classification: Classification) {
        match self
            .classifications
            .iter_mut()
            .find(|c| c.name == classification.name)
        {
            Some(existing) => *existing = classification,
            None => self.classifications.push(classification),
        }
        self.updated_at = Utc::now();
    }

    /// Remove a classification by name
    pub fn declassify(&mut self, name: &str) -> bool {
        if let Some(pos) = self.classifications.iter().position(|c| c.name == name) {
            self.classifications.remove(pos);
            self.updated_at = Utc::now();
            true
        } else {
            false
        }
    }

    pub fn classification(&self, name: &str) -> Option<&Classification> {
        self.classifications.iter().find(|c| c.name == name)
    }

    pub fn has_classification(&self, name: &str) -> bool {
        self.classification(name).is_some()
    }

    /// The element's anchor reference, read from its `Anchors` classification
    pub fn anchor(&self) -> Option<AnchorRef> {
        self.classification(ANCHORS_CLASSIFICATION)
            .and_then(AnchorRef::from_classification)
    }

    /// Whether the element, its status and its effective window are live
    /// at `effective_time`.
    pub fn is_effective_at(&self, effective_time: Option<DateTime<Utc>>) -> bool {
        self.status != ElementStatus::Deleted && self.effective.is_effective_at(effective_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_element_creation() {
        let element = Element::new("Asset").with_qualified_name("Asset:payroll");

        assert_eq!(element.type_name, "Asset");
        assert_eq!(element.qualified_name(), Some("Asset:payroll"));
        assert_eq!(element.status, ElementStatus::Active);
        assert!(element.classifications.is_empty());
        assert!(element.anchor().is_none());
    }

    #[test]
    fn test_classify_replaces_same_name() {
        let mut element = Element::new("Asset");
        element.classify(Classification::new("Confidentiality").with_property("level", 1));
        element.classify(Classification::new("Confidentiality").with_property("level", 3));

        assert_eq!(element.classifications.len(), 1);
        assert_eq!(
            element.classification("Confidentiality").and_then(|c| c.properties.get("level")),
            Some(&serde_json::json!(3))
        );

        assert!(element.declassify("Confidentiality"));
        assert!(!element.declassify("Confidentiality"));
    }

    #[test]
    fn test_effective_window() {
        let now = Utc::now();
        let window = EffectiveWindow::new(Some(now), Some(now + Duration::days(1)));

        assert!(window.is_effective_at(None));
        assert!(window.is_effective_at(Some(now)));
        assert!(!window.is_effective_at(Some(now - Duration::seconds(1))));
        // End bound is exclusive
        assert!(!window.is_effective_at(Some(now + Duration::days(1))));
        assert!(EffectiveWindow::default().is_effective_at(Some(now)));
    }

    #[test]
    fn test_malformed_window() {
        let now = Utc::now();
        assert!(!EffectiveWindow::new(Some(now), Some(now - Duration::hours(1))).is_well_formed());
        assert!(EffectiveWindow::new(None, Some(now)).is_well_formed());
    }

    #[test]
    fn test_deleted_element_not_effective() {
        let element = Element::new("Asset").with_status(ElementStatus::Deleted);
        assert!(!element.is_effective_at(None));
    }

    #[test]
    fn test_guid_round_trip_through_string() {
        let guid = Guid::new();
        let parsed: Guid = guid.to_string().parse().unwrap();
        assert_eq!(parsed, guid);
        assert!(Guid::from_string("not-a-guid").is_err());
    }
}

//! Search condition trees and the builder that assembles them
//!
//! Conditions are pure data: the repository evaluates them. LIKE values are
//! regular expressions; case handling is left to the evaluator.

use crate::classification::{
    ANCHORS_CLASSIFICATION, ANCHOR_DOMAIN_NAME_PROPERTY, ANCHOR_GUID_PROPERTY,
    ANCHOR_SCOPE_GUID_PROPERTY,
};
use crate::element::{Guid, QUALIFIED_NAME_PROPERTY};
use serde::{Deserialize, Serialize};

/// Properties searched by every free-text query, in this order.
///
/// Anchor-domain and anchor-scope searches must use this list unchanged so
/// results stay consistent across call sites.
pub const TEXT_SEARCH_PROPERTIES: [&str; 11] = [
    "qualifiedName",
    "name",
    "displayName",
    "deployedImplementationType",
    "resourceName",
    "pathName",
    "identifier",
    "title",
    "summary",
    "text",
    "description",
];

/// How the conditions of one level combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchCriteria {
    #[default]
    All,
    Any,
    None,
}

/// Comparison applied to a single property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyComparison {
    Eq,
    Neq,
    /// Regular-expression match
    Like,
    Lt,
    Lte,
    Gt,
    Gte,
    IsNull,
    NotNull,
}

/// `{property} {operator} {value}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyCondition {
    pub property_name: String,
    pub operator: PropertyComparison,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl PropertyCondition {
    pub fn new(
        property_name: impl Into<String>,
        operator: PropertyComparison,
        value: Option<serde_json::Value>,
    ) -> Self {
        Self {
            property_name: property_name.into(),
            operator,
            value,
        }
    }

    pub fn like(property_name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(
            property_name,
            PropertyComparison::Like,
            Some(serde_json::Value::String(pattern.into())),
        )
    }

    pub fn equals(property_name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self::new(property_name, PropertyComparison::Eq, Some(value.into()))
    }
}

/// A flat list of property conditions and how they combine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchProperties {
    pub conditions: Vec<PropertyCondition>,
    pub match_criteria: MatchCriteria,
}

impl SearchProperties {
    pub fn new(match_criteria: MatchCriteria) -> Self {
        Self {
            conditions: Vec::new(),
            match_criteria,
        }
    }

    pub fn with_condition(mut self, condition: PropertyCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// "Element carries classification `name` whose properties match"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationCondition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_properties: Option<SearchProperties>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchClassifications {
    pub conditions: Vec<ClassificationCondition>,
    pub match_criteria: MatchCriteria,
}

/// Pure constructor for condition trees
pub struct SearchConditionBuilder;

impl SearchConditionBuilder {
    /// "Element matches if ANY of `property_names` is LIKE `search_string`".
    ///
    /// Returns `None` when there is nothing to search for, so the clause is
    /// omitted rather than matching nothing.
    pub fn text_search(search_string: Option<&str>, property_names: &[&str]) -> Option<SearchProperties> {
        let search_string = search_string.filter(|s| !s.is_empty())?;
        if property_names.is_empty() {
            return None;
        }

        let conditions = property_names
            .iter()
            .map(|name| PropertyCondition::like(*name, search_string))
            .collect();

        Some(SearchProperties {
            conditions,
            match_criteria: MatchCriteria::Any,
        })
    }

    /// Text search over [`TEXT_SEARCH_PROPERTIES`]
    pub fn default_text_search(search_string: Option<&str>) -> Option<SearchProperties> {
        Self::text_search(search_string, &TEXT_SEARCH_PROPERTIES)
    }

    /// "Element carries classification `Anchors` where `property_name` EQ
    /// `scoping_value`", with ALL at both levels.
    pub fn anchor_classification(property_name: &str, scoping_value: Option<&str>) -> Option<SearchClassifications> {
        let scoping_value = scoping_value.filter(|s| !s.is_empty())?;

        let match_properties = SearchProperties::new(MatchCriteria::All)
            .with_condition(PropertyCondition::equals(property_name, scoping_value));

        Some(SearchClassifications {
            conditions: vec![ClassificationCondition {
                name: ANCHORS_CLASSIFICATION.to_string(),
                match_properties: Some(match_properties),
            }],
            match_criteria: MatchCriteria::All,
        })
    }

    /// Elements anchored to `anchor_guid`
    pub fn anchored_to(anchor_guid: &Guid) -> Option<SearchClassifications> {
        let anchor_guid = anchor_guid.to_string();
        Self::anchor_classification(ANCHOR_GUID_PROPERTY, Some(anchor_guid.as_str()))
    }

    /// Elements whose anchor belongs to the domain `domain_name`
    pub fn anchor_domain(domain_name: Option<&str>) -> Option<SearchClassifications> {
        Self::anchor_classification(ANCHOR_DOMAIN_NAME_PROPERTY, domain_name)
    }

    /// Elements whose anchor sits under `scope_guid`
    pub fn anchor_scope(scope_guid: Option<&Guid>) -> Option<SearchClassifications> {
        let scope = scope_guid.map(|g| g.to_string());
        Self::anchor_classification(ANCHOR_SCOPE_GUID_PROPERTY, scope.as_deref())
    }

    /// Exact match on `qualifiedName`, used for unique-name lookups
    pub fn qualified_name(qualified_name: &str) -> SearchProperties {
        SearchProperties::new(MatchCriteria::All)
            .with_condition(PropertyCondition::equals(QUALIFIED_NAME_PROPERTY, qualified_name))
    }
}

//! Compiled property and classification matchers
//!
//! LIKE values are compiled once into case-insensitive regular expressions
//! and matched anywhere in the property text. Ordering comparisons work on
//! numbers and strings; mismatched kinds never match.

use std::cmp::Ordering;

use cairn_core::{
    Element, FindQuery, MatchCriteria, PropertyComparison, PropertyCondition, SearchClassifications,
    SearchProperties,
};
use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde_json::Value;

use crate::traits::{ElementMatcher, PropertySource, Result, SearchError};

/// Patterns longer than this are rejected instead of compiled
const REGEX_SIZE_LIMIT: usize = 1 << 20;

enum CompiledCondition {
    Like { property: String, pattern: Regex },
    Compare { property: String, operator: PropertyComparison, value: Value },
    IsNull { property: String },
    NotNull { property: String },
}

impl CompiledCondition {
    fn compile(condition: &PropertyCondition) -> Result<Self> {
        let property = condition.property_name.clone();
        match condition.operator {
            PropertyComparison::IsNull => Ok(Self::IsNull { property }),
            PropertyComparison::NotNull => Ok(Self::NotNull { property }),
            PropertyComparison::Like => {
                let pattern = match &condition.value {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => return Err(SearchError::MissingValue { property }),
                };
                let regex = RegexBuilder::new(&pattern)
                    .case_insensitive(true)
                    .size_limit(REGEX_SIZE_LIMIT)
                    .build()
                    .map_err(|source| SearchError::InvalidPattern { pattern, source })?;
                Ok(Self::Like { property, pattern: regex })
            }
            operator => {
                let value = condition
                    .value
                    .clone()
                    .ok_or_else(|| SearchError::MissingValue { property: property.clone() })?;
                Ok(Self::Compare { property, operator, value })
            }
        }
    }

    fn matches<S: PropertySource + ?Sized>(&self, source: &S) -> bool {
        match self {
            Self::IsNull { property } => matches!(source.property(property), None | Some(Value::Null)),
            Self::NotNull { property } => !matches!(source.property(property), None | Some(Value::Null)),
            Self::Like { property, pattern } => match source.property(property) {
                Some(value) => like(pattern, value),
                None => false,
            },
            Self::Compare { property, operator, value } => match source.property(property) {
                Some(actual) if !actual.is_null() => compare(*operator, actual, value),
                _ => false,
            },
        }
    }
}

fn like(pattern: &Regex, value: &Value) -> bool {
    match value {
        Value::String(s) => pattern.is_match(s),
        Value::Number(n) => pattern.is_match(&n.to_string()),
        Value::Bool(b) => pattern.is_match(if *b { "true" } else { "false" }),
        Value::Array(items) => items.iter().any(|item| like(pattern, item)),
        Value::Object(map) => map.values().any(|item| like(pattern, item)),
        Value::Null => false,
    }
}

fn ordering(actual: &Value, expected: &Value) -> Option<Ordering> {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn compare(operator: PropertyComparison, actual: &Value, expected: &Value) -> bool {
    match operator {
        PropertyComparison::Eq => values_equal(actual, expected),
        PropertyComparison::Neq => same_kind(actual, expected) && !values_equal(actual, expected),
        PropertyComparison::Lt => ordering(actual, expected) == Some(Ordering::Less),
        PropertyComparison::Lte => matches!(ordering(actual, expected), Some(Ordering::Less | Ordering::Equal)),
        PropertyComparison::Gt => ordering(actual, expected) == Some(Ordering::Greater),
        PropertyComparison::Gte => matches!(ordering(actual, expected), Some(Ordering::Greater | Ordering::Equal)),
        PropertyComparison::Like | PropertyComparison::IsNull | PropertyComparison::NotNull => false,
    }
}

/// Values of different kinds are never comparable, not even for inequality
fn same_kind(actual: &Value, expected: &Value) -> bool {
    std::mem::discriminant(actual) == std::mem::discriminant(expected)
}

/// Numbers compare by value so `1` equals `1.0`
fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => actual == expected,
    }
}

fn combine(criteria: MatchCriteria, mut results: impl Iterator<Item = bool>) -> bool {
    match criteria {
        MatchCriteria::All => results.all(|r| r),
        MatchCriteria::Any => results.any(|r| r),
        MatchCriteria::None => !results.any(|r| r),
    }
}

/// A compiled [`SearchProperties`]. An empty condition list matches everything.
pub struct PropertyMatcher {
    conditions: Vec<CompiledCondition>,
    match_criteria: MatchCriteria,
}

impl PropertyMatcher {
    pub fn compile(properties: &SearchProperties) -> Result<Self> {
        let conditions = properties
            .conditions
            .iter()
            .map(CompiledCondition::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            conditions,
            match_criteria: properties.match_criteria,
        })
    }

    pub fn matches<S: PropertySource + ?Sized>(&self, source: &S) -> bool {
        if self.conditions.is_empty() {
            return true;
        }
        combine(self.match_criteria, self.conditions.iter().map(|c| c.matches(source)))
    }
}

struct CompiledClassificationCondition {
    name: String,
    properties: Option<PropertyMatcher>,
}

/// A compiled [`SearchClassifications`]. Only classifications effective at
/// the query's effective time take part.
pub struct ClassificationMatcher {
    conditions: Vec<CompiledClassificationCondition>,
    match_criteria: MatchCriteria,
    effective_time: Option<DateTime<Utc>>,
}

impl ClassificationMatcher {
    pub fn compile(classifications: &SearchClassifications, effective_time: Option<DateTime<Utc>>) -> Result<Self> {
        let conditions = classifications
            .conditions
            .iter()
            .map(|c| {
                Ok(CompiledClassificationCondition {
                    name: c.name.clone(),
                    properties: c.match_properties.as_ref().map(PropertyMatcher::compile).transpose()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            conditions,
            match_criteria: classifications.match_criteria,
            effective_time,
        })
    }

    pub fn matches(&self, element: &Element) -> bool {
        if self.conditions.is_empty() {
            return true;
        }
        combine(
            self.match_criteria,
            self.conditions.iter().map(|condition| {
                element
                    .classification(&condition.name)
                    .filter(|c| c.effective.is_effective_at(self.effective_time))
                    .map_or(false, |c| condition.properties.as_ref().map_or(true, |p| p.matches(c)))
            }),
        )
    }
}

/// Property and classification conditions of a [`FindQuery`], compiled.
/// Type filtering needs the type hierarchy and is left to the repository.
pub struct ElementFilter {
    properties: Option<PropertyMatcher>,
    classifications: Option<ClassificationMatcher>,
}

impl ElementFilter {
    pub fn compile(query: &FindQuery, effective_time: Option<DateTime<Utc>>) -> Result<Self> {
        let properties = query
            .search_properties
            .as_ref()
            .map(PropertyMatcher::compile)
            .transpose()?;
        let classifications = query
            .search_classifications
            .as_ref()
            .map(|c| ClassificationMatcher::compile(c, effective_time))
            .transpose()?;

        tracing::trace!(
            "Compiled filter: {} property conditions, {} classification conditions",
            query.search_properties.as_ref().map_or(0, |p| p.conditions.len()),
            query.search_classifications.as_ref().map_or(0, |c| c.conditions.len())
        );

        Ok(Self {
            properties,
            classifications,
        })
    }
}

impl ElementMatcher for ElementFilter {
    fn matches(&self, element: &Element) -> bool {
        self.properties.as_ref().map_or(true, |p| p.matches(element))
            && self.classifications.as_ref().map_or(true, |c| c.matches(element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::{AnchorRef, Classification, EffectiveWindow, Guid, SearchConditionBuilder};
    use chrono::Duration;
    use serde_json::json;

    fn asset(name: &str) -> Element {
        Element::new("Asset")
            .with_qualified_name(format!("Asset::{}", name))
            .with_property("name", name)
            .with_property("size", 42)
    }

    fn filter(query: &FindQuery) -> ElementFilter {
        ElementFilter::compile(query, None).unwrap()
    }

    #[test]
    fn test_text_search_is_case_insensitive_regex() {
        let query = FindQuery::new().with_properties(SearchConditionBuilder::default_text_search(Some("pay.*ll")));

        assert!(filter(&query).matches(&asset("Payroll")));
        assert!(!filter(&query).matches(&asset("Ledger")));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let query = FindQuery::new().with_properties(SearchConditionBuilder::default_text_search(Some("(unclosed")));
        let err = ElementFilter::compile(&query, None).err().unwrap();
        assert!(matches!(err, SearchError::InvalidPattern { .. }));
        assert!(cairn_core::Error::from(err).is_client_error());
    }

    #[test]
    fn test_qualified_name_is_exact() {
        let query = FindQuery::new().with_properties(Some(SearchConditionBuilder::qualified_name("Asset::Pay")));
        assert!(!filter(&query).matches(&asset("Payroll")));
        assert!(filter(&query).matches(&asset("Pay")));
    }

    #[test]
    fn test_comparisons() {
        let element = asset("Payroll");
        let check = |operator, value: Value| {
            PropertyMatcher::compile(
                &SearchProperties::new(MatchCriteria::All)
                    .with_condition(PropertyCondition::new("size", operator, Some(value))),
            )
            .unwrap()
            .matches(&element)
        };

        assert!(check(PropertyComparison::Eq, json!(42.0)));
        assert!(check(PropertyComparison::Neq, json!(7)));
        assert!(check(PropertyComparison::Gt, json!(7)));
        assert!(check(PropertyComparison::Lte, json!(42)));
        assert!(!check(PropertyComparison::Lt, json!(42)));
        assert!(!check(PropertyComparison::Gt, json!("7")));
        assert!(!check(PropertyComparison::Neq, json!("7")));
        assert!(!check(PropertyComparison::Eq, json!("42")));
    }

    #[test]
    fn test_null_checks() {
        let element = asset("Payroll").with_property("owner", Value::Null);
        let matcher = |operator, property: &str| {
            PropertyMatcher::compile(
                &SearchProperties::new(MatchCriteria::All).with_condition(PropertyCondition::new(property, operator, None)),
            )
            .unwrap()
            .matches(&element)
        };

        assert!(matcher(PropertyComparison::IsNull, "owner"));
        assert!(matcher(PropertyComparison::IsNull, "missing"));
        assert!(matcher(PropertyComparison::NotNull, "name"));
        assert!(!matcher(PropertyComparison::NotNull, "owner"));
    }

    #[test]
    fn test_match_criteria_none() {
        let properties = SearchProperties::new(MatchCriteria::None)
            .with_condition(PropertyCondition::equals("name", "Payroll"));
        let matcher = PropertyMatcher::compile(&properties).unwrap();

        assert!(!matcher.matches(&asset("Payroll")));
        assert!(matcher.matches(&asset("Ledger")));
    }

    #[test]
    fn test_anchor_classification_match() {
        let anchor = Guid::new();
        let anchored = asset("Column").with_anchor(AnchorRef::new(anchor.clone(), "Asset").with_domain("Asset"));
        let other = asset("Loose");

        let query = FindQuery::new().with_classifications(SearchConditionBuilder::anchored_to(&anchor));
        assert!(filter(&query).matches(&anchored));
        assert!(!filter(&query).matches(&other));

        let query = FindQuery::new().with_classifications(SearchConditionBuilder::anchor_domain(Some("Glossary")));
        assert!(!filter(&query).matches(&anchored));
    }

    #[test]
    fn test_ineffective_classification_ignored() {
        let now = Utc::now();
        let element = asset("Payroll").with_classification(
            Classification::new("Confidentiality")
                .with_effective(EffectiveWindow::new(Some(now + Duration::days(1)), None)),
        );
        let conditions = SearchClassifications {
            conditions: vec![cairn_core::ClassificationCondition {
                name: "Confidentiality".to_string(),
                match_properties: None,
            }],
            match_criteria: MatchCriteria::All,
        };

        assert!(ClassificationMatcher::compile(&conditions, None).unwrap().matches(&element));
        assert!(!ClassificationMatcher::compile(&conditions, Some(now)).unwrap().matches(&element));
    }
}

//! Seams between stored items and the matchers

use cairn_core::{Classification, Element, Relationship};
use serde_json::Value;

pub use crate::error::{SearchError, SearchResult as Result};

/// Anything carrying a property bag conditions can be evaluated against
pub trait PropertySource {
    fn property(&self, name: &str) -> Option<&Value>;
}

impl PropertySource for Element {
    fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

impl PropertySource for Classification {
    fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

impl PropertySource for Relationship {
    fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

/// A compiled filter over elements
pub trait ElementMatcher: Send + Sync {
    fn matches(&self, element: &Element) -> bool;
}

//! Cairn Search - Condition evaluation for the metadata catalog
//!
//! Compiles the condition trees built by `cairn_core::SearchConditionBuilder`
//! into matchers that repositories run over stored elements, and orders
//! results by a `SequencingOrder`.

pub mod error;
pub mod matcher;
pub mod sequencing;
pub mod traits;

pub use error::{SearchError, SearchResult};
pub use matcher::{ClassificationMatcher, ElementFilter, PropertyMatcher};
pub use sequencing::{sort_elements, sort_relationships};
pub use traits::{ElementMatcher, PropertySource};

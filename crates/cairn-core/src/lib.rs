//! Cairn Core - Anchored graph retrieval and valid value engine
//!
//! This crate provides the data model, the repository trait and the query
//! layer of the Cairn metadata catalog: search condition building, anchored
//! graph assembly, valid value hierarchy management and history queries.

pub mod anchor_graph;
pub mod anchor_search;
pub mod classification;
pub mod conditions;
pub mod context;
pub mod element;
pub mod error;
pub mod history;
pub mod limits;
pub mod query;
pub mod relationship;
pub mod repository;
pub mod typedef;
pub mod valid_values;

pub use anchor_graph::{AnchorGraph, AnchorGraphAssembler};
pub use anchor_search::{AnchorSearch, AnchorSearchMatches};
pub use classification::{AnchorRef, Classification};
pub use conditions::{
    ClassificationCondition, MatchCriteria, PropertyComparison, PropertyCondition, SearchClassifications,
    SearchConditionBuilder, SearchProperties,
};
pub use context::{CallContext, Caller};
pub use element::{EffectiveWindow, Element, ElementStatus, Guid, Properties};
pub use error::{Error, Result};
pub use history::{HistoryQueries, HistoryWindow};
pub use query::{FindQuery, Pagination, QueryOptions, SequencingOrder};
pub use relationship::{EndSelector, Relationship};
pub use repository::MetadataRepository;
pub use typedef::{AttributeDef, AttributeType, TypeDef, TypeDefCategory};
pub use valid_values::{
    ValidValueDefinition, ValidValueDetail, ValidValueKey, ValidValueManager, ValidValuePath, ValidValueProperties,
};

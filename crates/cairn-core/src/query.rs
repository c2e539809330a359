//! Query shaping types shared by every catalog operation

use crate::conditions::{SearchClassifications, SearchProperties};
use crate::error::{Error, Result};
use crate::limits::MAX_PAGE_SIZE;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order in which a repository returns results
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencingOrder {
    /// Repository default paging order
    #[default]
    Any,
    CreationDateRecent,
    CreationDateOldest,
    LastUpdateRecent,
    LastUpdateOldest,
    PropertyAscending(String),
    PropertyDescending(String),
    Guid,
}

/// Page window over a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Offset of the first result
    #[serde(default)]
    pub start_from: usize,

    /// Number of results per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            start_from: 0,
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    100
}

impl Pagination {
    /// A page size of zero asks for the largest page allowed.
    pub fn new(start_from: usize, page_size: usize) -> Self {
        let page_size = if page_size == 0 {
            MAX_PAGE_SIZE
        } else {
            page_size.min(MAX_PAGE_SIZE)
        };
        Self {
            start_from,
            page_size,
        }
    }

    /// The largest single page starting at zero
    pub fn max() -> Self {
        Self::new(0, MAX_PAGE_SIZE)
    }

    /// The page that follows this one
    pub fn next(&self) -> Self {
        Self {
            start_from: self.start_from + self.page_size,
            page_size: self.page_size,
        }
    }

    /// Cut this page's window out of a full result list
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.start_from)
            .take(self.page_size)
            .collect()
    }

    /// A page shorter than the window means there are no more results
    pub fn is_last_page(&self, returned: usize) -> bool {
        returned < self.page_size
    }
}

/// Time and visibility modifiers carried on every call.
///
/// These are forwarded unchanged to every repository call, including calls
/// made internally while assembling graphs and hierarchies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Only return elements effective at this time. `None` ignores effectivity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_time: Option<DateTime<Utc>>,

    /// Reconstruct state as it was at this instant. `None` reads current state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of_time: Option<DateTime<Utc>>,

    /// Include archived and memento-flagged elements
    #[serde(default)]
    pub for_lineage: bool,

    /// Suppress duplicate-resolution merging
    #[serde(default)]
    pub for_duplicate_processing: bool,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effective_at(mut self, time: DateTime<Utc>) -> Self {
        self.effective_time = Some(time);
        self
    }

    pub fn as_of(mut self, time: DateTime<Utc>) -> Self {
        self.as_of_time = Some(time);
        self
    }

    pub fn for_lineage(mut self, for_lineage: bool) -> Self {
        self.for_lineage = for_lineage;
        self
    }

    pub fn for_duplicate_processing(mut self, for_duplicate_processing: bool) -> Self {
        self.for_duplicate_processing = for_duplicate_processing;
        self
    }

    pub fn is_historical(&self) -> bool {
        self.as_of_time.is_some()
    }

    /// Reject an as-of time that lies in the future
    pub fn validate(&self) -> Result<()> {
        if let Some(as_of) = self.as_of_time {
            if as_of > Utc::now() {
                return Err(Error::invalid_parameter(
                    "asOfTime",
                    format!("{} is in the future", as_of.to_rfc3339()),
                ));
            }
        }
        Ok(())
    }
}

/// Element search request evaluated by the repository
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindQuery {
    /// Restrict to this type and its subtypes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    /// Further restrict to any of these subtypes
    #[serde(default)]
    pub subtype_names: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_properties: Option<SearchProperties>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_classifications: Option<SearchClassifications>,

    #[serde(default)]
    pub sequencing: SequencingOrder,
}

impl FindQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of_type(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Default::default()
        }
    }

    pub fn with_subtype(mut self, subtype_name: impl Into<String>) -> Self {
        self.subtype_names.push(subtype_name.into());
        self
    }

    pub fn with_properties(mut self, conditions: Option<SearchProperties>) -> Self {
        self.search_properties = conditions;
        self
    }

    pub fn with_classifications(mut self, conditions: Option<SearchClassifications>) -> Self {
        self.search_classifications = conditions;
        self
    }

    pub fn sequenced_by(mut self, sequencing: SequencingOrder) -> Self {
        self.sequencing = sequencing;
        self
    }
}

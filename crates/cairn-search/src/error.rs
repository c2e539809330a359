//! Search error types

use thiserror::Error;

/// Result type alias for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Search-specific error types
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Condition on '{property}' needs a value")]
    MissingValue { property: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SearchError> for cairn_core::Error {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidPattern { pattern, source } => {
                cairn_core::Error::invalid_parameter("searchString", format!("'{}' is not a valid pattern: {}", pattern, source))
            }
            SearchError::MissingValue { property } => {
                cairn_core::Error::invalid_parameter(property, "comparison needs a value")
            }
            SearchError::Internal(msg) => cairn_core::Error::Internal(msg),
        }
    }
}

//! Error types for Cairn Core

use crate::element::Guid;
use thiserror::Error;

/// Result type alias using Cairn's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Cairn error types
#[derive(Error, Debug)]
pub enum Error {
    /// A required parameter was missing, blank or out of range.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Unknown qualified name: {0}")]
    UnknownQualifiedName(String),

    #[error("Element not found: {0}")]
    ElementNotFound(Guid),

    #[error("Relationship not found: {0}")]
    RelationshipNotFound(Guid),

    #[error("User {user} is not authorized to access {guid}")]
    NotAuthorized { user: String, guid: Guid },

    #[error("Type not known: {0}")]
    UnknownType(String),

    /// Connectivity or internal repository fault. Always fatal.
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// True when the caller simply cannot see the requested element, either
    /// because it does not exist or because it is outside their zones.
    pub fn is_not_visible(&self) -> bool {
        matches!(self, Self::ElementNotFound(_) | Self::NotAuthorized { .. })
    }

    /// True for errors the caller caused and cannot fix by retrying.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. }
                | Self::UnknownQualifiedName(_)
                | Self::ElementNotFound(_)
                | Self::RelationshipNotFound(_)
                | Self::NotAuthorized { .. }
                | Self::UnknownType(_)
        )
    }
}

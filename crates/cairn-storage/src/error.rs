//! Storage error types

use cairn_core::Guid;
use thiserror::Error;

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Storage-specific error types
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Repository is offline")]
    Offline,

    #[error("Element not found: {0}")]
    ElementNotFound(Guid),

    #[error("Relationship not found: {0}")]
    RelationshipNotFound(Guid),

    #[error("User {user} is not authorized to access {guid}")]
    NotAuthorized { user: String, guid: Guid },

    #[error("Duplicate identifier: {0}")]
    DuplicateGuid(Guid),

    #[error("Property {property} of {type_name}: {reason}")]
    InvalidProperty {
        type_name: String,
        property: String,
        reason: String,
    },

    #[error("Type {type_name} is not a {expected} type")]
    WrongTypeCategory { type_name: String, expected: String },

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Search error: {0}")]
    Search(#[from] cairn_search::SearchError),
}

impl From<StorageError> for cairn_core::Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ElementNotFound(guid) => cairn_core::Error::ElementNotFound(guid),
            StorageError::RelationshipNotFound(guid) => cairn_core::Error::RelationshipNotFound(guid),
            StorageError::NotAuthorized { user, guid } => cairn_core::Error::NotAuthorized { user, guid },
            StorageError::DuplicateGuid(guid) => {
                cairn_core::Error::invalid_parameter("guid", format!("{} is already in use", guid))
            }
            StorageError::InvalidProperty {
                type_name,
                property,
                reason,
            } => cairn_core::Error::invalid_parameter(property, format!("{} ({})", reason, type_name)),
            StorageError::WrongTypeCategory { type_name, expected } => {
                cairn_core::Error::invalid_parameter("typeName", format!("{} is not a {} type", type_name, expected))
            }
            StorageError::Search(e) => e.into(),
            StorageError::Serialization(e) => cairn_core::Error::Serialization(e),
            other @ (StorageError::Database(_)
            | StorageError::Offline
            | StorageError::Snapshot(_)
            | StorageError::Io(_)) => cairn_core::Error::Repository(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_is_fatal_repository_error() {
        let err: cairn_core::Error = StorageError::Offline.into();
        assert!(matches!(err, cairn_core::Error::Repository(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_visibility_errors_keep_meaning() {
        let guid = Guid::new();
        let err: cairn_core::Error = StorageError::NotAuthorized {
            user: "erinoverview".to_string(),
            guid: guid.clone(),
        }
        .into();
        assert!(err.is_not_visible());

        let err: cairn_core::Error = StorageError::ElementNotFound(guid).into();
        assert!(err.is_not_visible());
    }
}

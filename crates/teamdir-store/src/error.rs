//! Store error types.

use thiserror::Error;

/// Errors surfaced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record matched the given key.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A unique natural key is already taken.
    #[error("{entity} with {field} '{value}' already exists")]
    Duplicate {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// The backing storage failed.
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl StoreError {
    /// Create a not-found error.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create a duplicate-key error.
    pub fn duplicate(
        entity: &'static str,
        field: &'static str,
        value: impl Into<String>,
    ) -> Self {
        StoreError::Duplicate {
            entity,
            field,
            value: value.into(),
        }
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        StoreError::Storage {
            message: message.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = StoreError::not_found("Team", "eng");
        assert_eq!(err.to_string(), "Team not found: eng");

        let err = StoreError::duplicate("Principal", "username", "alice");
        assert_eq!(
            err.to_string(),
            "Principal with username 'alice' already exists"
        );
    }
}

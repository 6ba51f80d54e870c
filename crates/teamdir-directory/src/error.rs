//! Directory error types
//!
//! Error definitions with transient/permanent classification.

use thiserror::Error;

/// Error that can occur during directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Expected unique directory entry is absent. Never silently
    /// treated as success; aborts the current reconciliation or import
    /// record.
    #[error("no {kind} found in directory with the name {name}")]
    EntryNotFound {
        /// Entry kind ("group", "user").
        kind: &'static str,
        /// The natural key that matched nothing.
        name: String,
    },

    /// More than one directory entry matched a key expected to be
    /// unique. A configuration/data integrity problem, not retried.
    #[error("{count} {kind} entries found in directory for {name}, expected exactly one")]
    AmbiguousEntry {
        /// Entry kind ("group", "user").
        kind: &'static str,
        /// The ambiguous natural key.
        name: String,
        /// Number of entries matched.
        count: usize,
    },

    /// A directory round trip did not complete within the configured
    /// bound. The whole reconciliation fails; no automatic retry.
    #[error("directory operation timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The directory could not be reached or refused the connection.
    #[error("directory unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The bind credentials were rejected.
    #[error("directory bind failed: invalid credentials")]
    AuthenticationFailed,

    /// A search or modify was accepted by the server but failed.
    #[error("directory operation failed: {message}")]
    OperationFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The client configuration is invalid.
    #[error("invalid directory configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl DirectoryError {
    /// Check if this error is transient. Transient failures abort the
    /// current reconciliation with local state unchanged; the caller
    /// may re-issue the whole operation.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DirectoryError::Timeout { .. } | DirectoryError::Unavailable { .. }
        )
    }

    /// Create a group-not-found error.
    pub fn group_not_found(name: impl Into<String>) -> Self {
        DirectoryError::EntryNotFound {
            kind: "group",
            name: name.into(),
        }
    }

    /// Create a user-not-found error.
    pub fn user_not_found(name: impl Into<String>) -> Self {
        DirectoryError::EntryNotFound {
            kind: "user",
            name: name.into(),
        }
    }

    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        DirectoryError::Unavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Create an unavailable error with source.
    pub fn unavailable_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::Unavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an operation-failed error.
    pub fn operation_failed(message: impl Into<String>) -> Self {
        DirectoryError::OperationFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create an operation-failed error with source.
    pub fn operation_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::OperationFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        DirectoryError::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(DirectoryError::Timeout { timeout_secs: 30 }.is_transient());
        assert!(DirectoryError::unavailable("connection refused").is_transient());

        assert!(!DirectoryError::group_not_found("eng").is_transient());
        assert!(!DirectoryError::AuthenticationFailed.is_transient());
        assert!(!DirectoryError::AmbiguousEntry {
            kind: "group",
            name: "eng".to_string(),
            count: 2,
        }
        .is_transient());
    }

    #[test]
    fn test_display() {
        let err = DirectoryError::group_not_found("eng");
        assert_eq!(err.to_string(), "no group found in directory with the name eng");

        let err = DirectoryError::AmbiguousEntry {
            kind: "user",
            name: "alice".to_string(),
            count: 3,
        };
        assert_eq!(
            err.to_string(),
            "3 user entries found in directory for alice, expected exactly one"
        );

        let err = DirectoryError::Timeout { timeout_secs: 10 };
        assert_eq!(err.to_string(), "directory operation timed out after 10 seconds");
    }

    #[test]
    fn test_source_is_preserved() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = DirectoryError::unavailable_with_source("bind", io);
        if let DirectoryError::Unavailable { source, .. } = &err {
            assert!(source.is_some());
        } else {
            panic!("expected Unavailable variant");
        }
    }
}

//! Error types for claim intake.

use thiserror::Error;

use teamdir_store::StoreError;

/// Errors raised while turning a userinfo document into a principal.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required claim is absent from the userinfo document.
    #[error("missing required claim '{claim}'")]
    MissingClaim {
        /// The bound claim name that was expected.
        claim: String,
    },

    /// A claim is present but has the wrong shape.
    #[error("invalid claim '{claim}': {message}")]
    InvalidClaim {
        /// The bound claim name.
        claim: String,
        /// What was wrong with it.
        message: String,
    },

    /// The intake configuration itself is unusable.
    #[error("invalid auth configuration: {message}")]
    InvalidConfiguration {
        /// What was wrong with it.
        message: String,
    },

    /// The local store rejected the upsert.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    pub fn missing_claim(claim: impl Into<String>) -> Self {
        Self::MissingClaim {
            claim: claim.into(),
        }
    }

    pub fn invalid_claim(claim: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidClaim {
            claim: claim.into(),
            message: message.into(),
        }
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// Convenience result type for claim intake.
pub type AuthResult<T> = std::result::Result<T, AuthError>;

//! Error types for the ZooCollab system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZooError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    /// The action requires an identity and none was supplied.
    #[error("Authentication required: {reason}")]
    Unauthenticated { reason: String },

    /// The actor is known but lacks the role or ownership required.
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ZooError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether the failure came from a collaborator (storage) rather than
    /// from a capability or input check. Callers may retry these.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

pub type ZooResult<T> = Result<T, ZooError>;

//! Authentication error types.

use thiserror::Error;
use zoocollab_core::error::ZooError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("authentication required")]
    NotAuthenticated,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for ZooError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => ZooError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::PasswordTooShort(_) => ZooError::Validation {
                message: err.to_string(),
            },
            AuthError::NotAuthenticated => ZooError::Unauthenticated {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => ZooError::Crypto(msg),
        }
    }
}

//! ZooCollab Auth: password authentication, JWT issuance/validation
//! and resolution of request credentials into an [`Actor`].
//!
//! [`Actor`]: zoocollab_core::models::actor::Actor

pub mod config;
pub mod error;
pub mod identity;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use identity::IdentityResolver;
pub use service::{AuthOutput, AuthService, LoginInput, RegisterInput};
pub use token::AccessTokenClaims;

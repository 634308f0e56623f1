//! Resolution of an incoming credential into an [`Actor`].

use tracing::debug;
use zoocollab_core::models::actor::Actor;

use crate::config::AuthConfig;
use crate::token::validate_access_token;

/// Turns a bearer credential into an [`Actor`].
///
/// Fails closed: a missing, malformed, expired or foreign token yields
/// [`Actor::Anonymous`], never an error. Rejections are logged at debug
/// level only.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    config: AuthConfig,
}

impl IdentityResolver {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    pub fn resolve(&self, credential: Option<&str>) -> Actor {
        let Some(raw) = credential else {
            return Actor::Anonymous;
        };
        let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
        if token.is_empty() {
            return Actor::Anonymous;
        }

        match validate_access_token(token, &self.config).and_then(|v| v.0.user_id()) {
            Ok(user_id) => Actor::Authenticated(user_id),
            Err(err) => {
                debug!(error = %err, "Rejected credential, treating caller as anonymous");
                Actor::Anonymous
            }
        }
    }
}

//! Request identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The identity (or lack thereof) making a request.
///
/// Derived from a credential on every request and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    Anonymous,
    Authenticated(Uuid),
}

impl Actor {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Actor::Anonymous => None,
            Actor::Authenticated(id) => Some(*id),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Actor::Anonymous)
    }
}

impl From<Option<Uuid>> for Actor {
    fn from(id: Option<Uuid>) -> Self {
        id.map_or(Actor::Anonymous, Actor::Authenticated)
    }
}

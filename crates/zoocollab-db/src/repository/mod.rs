//! SurrealDB repository implementations.

mod observation;
mod project;
mod user;

pub use observation::SurrealObservationRepository;
pub use project::SurrealProjectRepository;
pub use user::{SurrealUserRepository, hash_password};

use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}

pub(crate) fn parse_uuid(value: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

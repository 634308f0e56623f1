//! Database-specific error types and conversions.

use zoocollab_core::error::ZooError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Corrupt record: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    Conflict { entity: String },
}

impl DbError {
    /// Classify a failed statement: unique index violations become
    /// [`DbError::Conflict`], everything else a query failure.
    pub(crate) fn from_statement(err: surrealdb::Error, entity: &str) -> Self {
        let message = err.to_string();
        if message.contains("already contains") || message.contains("already exists") {
            DbError::Conflict {
                entity: entity.into(),
            }
        } else {
            DbError::Query(message)
        }
    }
}

impl From<DbError> for ZooError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ZooError::NotFound { entity, id },
            DbError::Conflict { entity } => ZooError::AlreadyExists { entity },
            other => ZooError::Database(other.to_string()),
        }
    }
}

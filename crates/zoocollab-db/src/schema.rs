//! Schema definitions and migration runner for SurrealDB.
//!
//! Tables are SCHEMAFULL. UUIDs are stored as strings and enums as their
//! canonical lowercase spelling guarded by ASSERT constraints.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD institution ON TABLE user TYPE string;
DEFINE FIELD specialization ON TABLE user TYPE option<string>;
DEFINE FIELD account_type ON TABLE user TYPE string \
    ASSERT $value IN ['researcher', 'administrator', 'student'];
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Projects
-- =======================================================================
DEFINE TABLE project SCHEMAFULL;
DEFINE FIELD title ON TABLE project TYPE string;
DEFINE FIELD description ON TABLE project TYPE string;
DEFINE FIELD start_date ON TABLE project TYPE datetime;
DEFINE FIELD end_date ON TABLE project TYPE option<datetime>;
DEFINE FIELD status ON TABLE project TYPE string \
    ASSERT $value IN ['planned', 'active', 'completed', 'suspended'];
DEFINE FIELD visibility ON TABLE project TYPE string \
    ASSERT $value IN ['public', 'private'];
DEFINE FIELD creator_id ON TABLE project TYPE string;
DEFINE FIELD target_species ON TABLE project TYPE array<object> \
    DEFAULT [];
DEFINE FIELD target_species[*].scientific_name ON TABLE project \
    TYPE string;
DEFINE FIELD target_species[*].common_name ON TABLE project \
    TYPE option<string>;
DEFINE FIELD created_at ON TABLE project TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE project TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_project_creator ON TABLE project COLUMNS creator_id;
DEFINE INDEX idx_project_visibility ON TABLE project COLUMNS visibility;

-- =======================================================================
-- Project memberships (creator is implicit and never stored here)
-- =======================================================================
DEFINE TABLE project_member SCHEMAFULL;
DEFINE FIELD project_id ON TABLE project_member TYPE string;
DEFINE FIELD user_id ON TABLE project_member TYPE string;
DEFINE FIELD role ON TABLE project_member TYPE string \
    ASSERT $value IN ['co-investigator', 'research-assistant', 'observer'];
DEFINE FIELD joined_date ON TABLE project_member TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_project_member_pair ON TABLE project_member \
    COLUMNS project_id, user_id UNIQUE;
DEFINE INDEX idx_project_member_user ON TABLE project_member \
    COLUMNS user_id;

-- =======================================================================
-- Observations
-- =======================================================================
DEFINE TABLE observation SCHEMAFULL;
DEFINE FIELD project_id ON TABLE observation TYPE string;
DEFINE FIELD observer_id ON TABLE observation TYPE string;
DEFINE FIELD scientific_name ON TABLE observation TYPE string;
DEFINE FIELD common_name ON TABLE observation TYPE option<string>;
DEFINE FIELD longitude ON TABLE observation TYPE float \
    ASSERT $value >= -180 AND $value <= 180;
DEFINE FIELD latitude ON TABLE observation TYPE float \
    ASSERT $value >= -90 AND $value <= 90;
DEFINE FIELD observation_date ON TABLE observation TYPE datetime;
DEFINE FIELD individual_count ON TABLE observation TYPE int DEFAULT 1 \
    ASSERT $value >= 1;
DEFINE FIELD notes ON TABLE observation TYPE option<string>;
DEFINE FIELD images ON TABLE observation TYPE array<string> DEFAULT [];
DEFINE FIELD created_at ON TABLE observation TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_observation_project ON TABLE observation \
    COLUMNS project_id;
DEFINE INDEX idx_observation_observer ON TABLE observation \
    COLUMNS observer_id;
";

/// Apply all pending migrations to the connected database.
///
/// Safe to call on every startup: applied versions are tracked in the
/// `_migration` table and skipped.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

        info!(version = migration.version, "Migration applied");
    }

    Ok(())
}

/// Raw DDL for schema version 1, for tests that bypass the runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

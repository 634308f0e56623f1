//! SurrealDB implementation of [`ProjectRepository`].
//!
//! Memberships live in the `project_member` table, guarded by a UNIQUE
//! index on `(project_id, user_id)`. That index is what serializes
//! concurrent `add_member` calls for the same pair: exactly one insert
//! wins, the other surfaces as `AlreadyExists`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use zoocollab_core::error::ZooResult;
use zoocollab_core::models::membership::{Membership, ProjectRole};
use zoocollab_core::models::observation::Species;
use zoocollab_core::models::project::{
    CreateProject, Project, ProjectStatus, UpdateProject, Visibility,
};
use zoocollab_core::repository::ProjectRepository;

use super::{CountRow, parse_uuid};
use crate::error::DbError;

#[derive(Debug, Clone, SurrealValue)]
struct SpeciesRow {
    scientific_name: String,
    common_name: Option<String>,
}

impl From<Species> for SpeciesRow {
    fn from(s: Species) -> Self {
        Self {
            scientific_name: s.scientific_name,
            common_name: s.common_name,
        }
    }
}

impl From<SpeciesRow> for Species {
    fn from(r: SpeciesRow) -> Self {
        Self {
            scientific_name: r.scientific_name,
            common_name: r.common_name,
        }
    }
}

#[derive(Debug, SurrealValue)]
struct ProjectRowWithId {
    record_id: String,
    title: String,
    description: String,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    status: String,
    visibility: String,
    creator_id: String,
    target_species: Vec<SpeciesRow>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct MemberRow {
    project_id: String,
    user_id: String,
    role: String,
    joined_date: DateTime<Utc>,
}

impl MemberRow {
    fn try_into_membership(self) -> Result<Membership, DbError> {
        let role = self
            .role
            .parse::<ProjectRole>()
            .map_err(|e| DbError::Decode(e.to_string()))?;
        Ok(Membership {
            user_id: parse_uuid(&self.user_id, "member")?,
            role,
            joined_date: self.joined_date,
        })
    }
}

impl ProjectRowWithId {
    fn try_into_project(self, members: Vec<Membership>) -> Result<Project, DbError> {
        Ok(Project {
            id: parse_uuid(&self.record_id, "project")?,
            title: self.title,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            status: self
                .status
                .parse::<ProjectStatus>()
                .map_err(DbError::Decode)?,
            visibility: self
                .visibility
                .parse::<Visibility>()
                .map_err(DbError::Decode)?,
            creator_id: parse_uuid(&self.creator_id, "creator")?,
            members,
            target_species: self.target_species.into_iter().map(Species::from).collect(),
            created_at: self.created_at,
        })
    }
}

/// Minimal projection used to tell whether an UPDATE matched a record.
#[derive(Debug, SurrealValue)]
struct TouchedRow {
    #[allow(dead_code)]
    updated_at: DateTime<Utc>,
}

const PROJECT_COLUMNS: &str = "meta::id(id) AS record_id, title, description, \
     start_date, end_date, status, visibility, creator_id, target_species, created_at";

/// SurrealDB implementation of the Project repository.
pub struct SurrealProjectRepository<C: Connection> {
    db: Surreal<C>,
}

// Manual impl: `derive(Clone)` would add a needless `C: Clone` bound.
impl<C: Connection> Clone for SurrealProjectRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealProjectRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Run a project SELECT and attach the member list of every project
    /// returned, preserving the row order of the SELECT.
    async fn fetch_projects(
        &self,
        query: String,
        binds: Vec<(&'static str, String)>,
    ) -> Result<Vec<Project>, DbError> {
        let mut builder = self.db.query(&query);
        for bind in binds {
            builder = builder.bind(bind);
        }
        let mut result = builder.await?;
        let rows: Vec<ProjectRowWithId> = result.take(0)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = rows.iter().map(|r| r.record_id.clone()).collect();
        let mut members = self.members_of(ids).await?;

        rows.into_iter()
            .map(|row| {
                let list = members.remove(&row.record_id).unwrap_or_default();
                row.try_into_project(list)
            })
            .collect()
    }

    async fn members_of(
        &self,
        project_ids: Vec<String>,
    ) -> Result<HashMap<String, Vec<Membership>>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT project_id, user_id, role, joined_date FROM project_member \
                 WHERE project_id IN $ids ORDER BY joined_date ASC",
            )
            .bind(("ids", project_ids))
            .await?;
        let rows: Vec<MemberRow> = result.take(0)?;

        let mut grouped: HashMap<String, Vec<Membership>> = HashMap::new();
        for row in rows {
            let key = row.project_id.clone();
            grouped
                .entry(key)
                .or_default()
                .push(row.try_into_membership()?);
        }
        Ok(grouped)
    }

    async fn exists(&self, id: &str) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query("SELECT count() AS total FROM type::record('project', $id) GROUP ALL")
            .bind(("id", id.to_string()))
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }

    async fn require(&self, id: &str) -> Result<(), DbError> {
        if self.exists(id).await? {
            Ok(())
        } else {
            Err(DbError::NotFound {
                entity: "project".into(),
                id: id.to_string(),
            })
        }
    }
}

impl<C: Connection> ProjectRepository for SurrealProjectRepository<C> {
    async fn create(&self, creator_id: Uuid, input: CreateProject) -> ZooResult<Project> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let species: Vec<SpeciesRow> = input.target_species.into_iter().map(Into::into).collect();

        let result = self
            .db
            .query(
                "CREATE type::record('project', $id) SET \
                 title = $title, description = $description, \
                 start_date = $start_date, end_date = $end_date, \
                 status = $status, visibility = $visibility, \
                 creator_id = $creator_id, target_species = $target_species",
            )
            .bind(("id", id_str.clone()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("start_date", input.start_date))
            .bind(("end_date", input.end_date))
            .bind((
                "status",
                input.status.unwrap_or_default().as_str().to_string(),
            ))
            .bind((
                "visibility",
                input.visibility.unwrap_or_default().as_str().to_string(),
            ))
            .bind(("creator_id", creator_id.to_string()))
            .bind(("target_species", species))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::from_statement(e, "project"))?;

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> ZooResult<Project> {
        let id_str = id.to_string();
        let projects = self
            .fetch_projects(
                format!("SELECT {PROJECT_COLUMNS} FROM type::record('project', $id)"),
                vec![("id", id_str.clone())],
            )
            .await?;

        let project = projects.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "project".into(),
            id: id_str,
        })?;
        Ok(project)
    }

    async fn update(&self, id: Uuid, input: UpdateProject) -> ZooResult<Project> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.start_date.is_some() {
            sets.push("start_date = $start_date");
        }
        if input.end_date.is_some() {
            sets.push("end_date = $end_date");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.visibility.is_some() {
            sets.push("visibility = $visibility");
        }
        if input.target_species.is_some() {
            sets.push("target_species = $target_species");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('project', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(start_date) = input.start_date {
            builder = builder.bind(("start_date", start_date));
        }
        if let Some(end_date) = input.end_date {
            // Some(None) clears the end date.
            builder = builder.bind(("end_date", end_date));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(visibility) = input.visibility {
            builder = builder.bind(("visibility", visibility.as_str().to_string()));
        }
        if let Some(species) = input.target_species {
            let rows: Vec<SpeciesRow> = species.into_iter().map(Into::into).collect();
            builder = builder.bind(("target_species", rows));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement(e, "project"))?;

        let updated: Vec<TouchedRow> = result.take(0).map_err(DbError::from)?;
        if updated.is_empty() {
            return Err(DbError::NotFound {
                entity: "project".into(),
                id: id_str,
            }
            .into());
        }

        self.get_by_id(id).await
    }

    async fn delete(&self, id: Uuid) -> ZooResult<()> {
        let id_str = id.to_string();
        self.require(&id_str).await?;

        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE observation WHERE project_id = $id; \
                 DELETE project_member WHERE project_id = $id; \
                 DELETE type::record('project', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list_public(&self) -> ZooResult<Vec<Project>> {
        Ok(self
            .fetch_projects(
                format!(
                    "SELECT {PROJECT_COLUMNS} FROM project \
                     WHERE visibility = 'public' ORDER BY created_at DESC"
                ),
                Vec::new(),
            )
            .await?)
    }

    async fn list_accessible(&self, user_id: Uuid) -> ZooResult<Vec<Project>> {
        Ok(self
            .fetch_projects(
                format!(
                    "SELECT {PROJECT_COLUMNS} FROM project \
                     WHERE visibility = 'public' OR creator_id = $user_id \
                     OR meta::id(id) IN (SELECT VALUE project_id FROM project_member \
                         WHERE user_id = $user_id) \
                     ORDER BY created_at DESC"
                ),
                vec![("user_id", user_id.to_string())],
            )
            .await?)
    }

    async fn list_for_user(&self, user_id: Uuid) -> ZooResult<Vec<Project>> {
        Ok(self
            .fetch_projects(
                format!(
                    "SELECT {PROJECT_COLUMNS} FROM project \
                     WHERE creator_id = $user_id \
                     OR meta::id(id) IN (SELECT VALUE project_id FROM project_member \
                         WHERE user_id = $user_id) \
                     ORDER BY created_at DESC"
                ),
                vec![("user_id", user_id.to_string())],
            )
            .await?)
    }

    async fn add_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
    ) -> ZooResult<Project> {
        let project_str = project_id.to_string();
        let user_str = user_id.to_string();
        self.require(&project_str).await?;

        let mut existing = self
            .db
            .query(
                "SELECT count() AS total FROM project_member \
                 WHERE project_id = $project_id AND user_id = $user_id GROUP ALL",
            )
            .bind(("project_id", project_str.clone()))
            .bind(("user_id", user_str.clone()))
            .await
            .map_err(DbError::from)?;
        let counts: Vec<CountRow> = existing.take(0).map_err(DbError::from)?;
        if counts.first().map(|r| r.total).unwrap_or(0) > 0 {
            return Err(DbError::Conflict {
                entity: "project_member".into(),
            }
            .into());
        }

        // The unique index still arbitrates between concurrent inserts
        // that both passed the count above.
        self.db
            .query(
                "CREATE project_member SET \
                 project_id = $project_id, user_id = $user_id, role = $role",
            )
            .bind(("project_id", project_str))
            .bind(("user_id", user_str))
            .bind(("role", role.as_str().to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(e, "project_member"))?;

        self.get_by_id(project_id).await
    }

    async fn remove_member(&self, project_id: Uuid, user_id: Uuid) -> ZooResult<()> {
        let user_str = user_id.to_string();

        let mut result = self
            .db
            .query(
                "DELETE project_member \
                 WHERE project_id = $project_id AND user_id = $user_id \
                 RETURN BEFORE",
            )
            .bind(("project_id", project_id.to_string()))
            .bind(("user_id", user_str.clone()))
            .await
            .map_err(DbError::from)?;

        let removed: Vec<MemberRow> = result.take(0).map_err(DbError::from)?;
        if removed.is_empty() {
            return Err(DbError::NotFound {
                entity: "project_member".into(),
                id: user_str,
            }
            .into());
        }
        Ok(())
    }

    async fn set_member_role(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
    ) -> ZooResult<()> {
        let user_str = user_id.to_string();

        let result = self
            .db
            .query(
                "UPDATE project_member SET role = $role \
                 WHERE project_id = $project_id AND user_id = $user_id",
            )
            .bind(("role", role.as_str().to_string()))
            .bind(("project_id", project_id.to_string()))
            .bind(("user_id", user_str.clone()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;
        let updated: Vec<MemberRow> = result.take(0).map_err(DbError::from)?;
        if updated.is_empty() {
            return Err(DbError::NotFound {
                entity: "project_member".into(),
                id: user_str,
            }
            .into());
        }
        Ok(())
    }
}

//! Project lifecycle and membership management.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;
use zoocollab_core::error::{ZooError, ZooResult};
use zoocollab_core::models::actor::Actor;
use zoocollab_core::models::membership::ProjectRole;
use zoocollab_core::models::project::{CreateProject, Project, UpdateProject};
use zoocollab_core::permission::Action;
use zoocollab_core::repository::{ProjectRepository, UserRepository};

use crate::guard::{authorize_project, require_user};

fn validate_dates(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> ZooResult<()> {
    match end {
        Some(end) if end < start => {
            Err(ZooError::validation("end date must not precede start date"))
        }
        _ => Ok(()),
    }
}

/// Project workflows. Update, delete and every membership change
/// require [`Action::ManageProject`], which only the creator holds.
pub struct ProjectService<P: ProjectRepository, U: UserRepository> {
    projects: P,
    users: U,
}

impl<P: ProjectRepository, U: UserRepository> ProjectService<P, U> {
    pub fn new(projects: P, users: U) -> Self {
        Self { projects, users }
    }

    pub async fn create_project(&self, actor: Actor, input: CreateProject) -> ZooResult<Project> {
        let creator_id = require_user(actor)?;
        if input.title.trim().is_empty() {
            return Err(ZooError::validation("title is required"));
        }
        validate_dates(input.start_date, input.end_date)?;

        let project = self.projects.create(creator_id, input).await?;
        info!(project_id = %project.id, creator_id = %creator_id, "Project created");
        Ok(project)
    }

    /// Fetch one project the actor may view.
    pub async fn get_project(&self, actor: Actor, id: Uuid) -> ZooResult<Project> {
        let project = self.projects.get_by_id(id).await?;
        authorize_project(actor, &project, Action::View)?;
        Ok(project)
    }

    /// Public projects plus the private ones the actor created or
    /// belongs to.
    pub async fn list_projects(&self, actor: Actor) -> ZooResult<Vec<Project>> {
        let user_id = require_user(actor)?;
        self.projects.list_accessible(user_id).await
    }

    pub async fn list_public_projects(&self) -> ZooResult<Vec<Project>> {
        self.projects.list_public().await
    }

    pub async fn update_project(
        &self,
        actor: Actor,
        id: Uuid,
        input: UpdateProject,
    ) -> ZooResult<Project> {
        let project = self.projects.get_by_id(id).await?;
        authorize_project(actor, &project, Action::ManageProject)?;

        if matches!(&input.title, Some(t) if t.trim().is_empty()) {
            return Err(ZooError::validation("title must not be empty"));
        }
        let start = input.start_date.unwrap_or(project.start_date);
        let end = match input.end_date {
            Some(end) => end,
            None => project.end_date,
        };
        validate_dates(start, end)?;

        self.projects.update(id, input).await
    }

    /// Delete a project with its memberships and observations.
    pub async fn delete_project(&self, actor: Actor, id: Uuid) -> ZooResult<()> {
        let project = self.projects.get_by_id(id).await?;
        authorize_project(actor, &project, Action::ManageProject)?;

        self.projects.delete(id).await?;
        info!(project_id = %id, "Project deleted");
        Ok(())
    }

    /// Add the user registered under `email` with `role`.
    ///
    /// The role string is parsed before anything is looked up, so an
    /// unknown role fails with `InvalidRole` whatever the other inputs.
    pub async fn add_member(
        &self,
        actor: Actor,
        project_id: Uuid,
        email: &str,
        role: &str,
    ) -> ZooResult<Project> {
        let role: ProjectRole = role.parse()?;

        let project = self.projects.get_by_id(project_id).await?;
        authorize_project(actor, &project, Action::ManageProject)?;

        let user = self.users.get_by_email(&email.trim().to_lowercase()).await?;
        if project.is_creator(user.id) {
            return Err(ZooError::validation(
                "the project creator cannot be added as a member",
            ));
        }
        if project.membership(user.id).is_some() {
            return Err(ZooError::AlreadyExists {
                entity: "project_member".into(),
            });
        }

        let updated = self.projects.add_member(project_id, user.id, role).await?;
        info!(project_id = %project_id, user_id = %user.id, role = %role, "Member added");
        Ok(updated)
    }

    pub async fn remove_member(
        &self,
        actor: Actor,
        project_id: Uuid,
        user_id: Uuid,
    ) -> ZooResult<()> {
        let project = self.projects.get_by_id(project_id).await?;
        authorize_project(actor, &project, Action::ManageProject)?;

        self.projects.remove_member(project_id, user_id).await?;
        info!(project_id = %project_id, user_id = %user_id, "Member removed");
        Ok(())
    }

    pub async fn set_member_role(
        &self,
        actor: Actor,
        project_id: Uuid,
        user_id: Uuid,
        role: &str,
    ) -> ZooResult<()> {
        let role: ProjectRole = role.parse()?;

        let project = self.projects.get_by_id(project_id).await?;
        authorize_project(actor, &project, Action::ManageProject)?;

        self.projects.set_member_role(project_id, user_id, role).await?;
        info!(project_id = %project_id, user_id = %user_id, role = %role, "Member role changed");
        Ok(())
    }
}

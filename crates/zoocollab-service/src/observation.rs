//! Observation workflows, each gated by the owning project's decision.

use tracing::info;
use uuid::Uuid;
use zoocollab_core::error::{ZooError, ZooResult};
use zoocollab_core::models::actor::Actor;
use zoocollab_core::models::observation::{
    Coordinates, CreateObservation, Observation, Species, UpdateObservation,
};
use zoocollab_core::models::project::Project;
use zoocollab_core::permission::{Action, PermissionSummary, summarize, summarize_batch};
use zoocollab_core::repository::{ObservationRepository, ProjectRepository};

use crate::guard::{authorize_observation, authorize_project};

fn validate_species(species: &Species) -> ZooResult<()> {
    if species.scientific_name.trim().is_empty() {
        return Err(ZooError::validation("scientific name is required"));
    }
    Ok(())
}

fn validate_coordinates(coordinates: &Coordinates) -> ZooResult<()> {
    if !coordinates.is_valid() {
        return Err(ZooError::validation(
            "longitude must be within [-180, 180] and latitude within [-90, 90]",
        ));
    }
    Ok(())
}

fn validate_count(count: Option<u32>) -> ZooResult<()> {
    if count == Some(0) {
        return Err(ZooError::validation("count must be at least 1"));
    }
    Ok(())
}

/// An observation together with the caller's affordances on it.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationWithPermissions {
    #[serde(flatten)]
    pub observation: Observation,
    pub permissions: PermissionSummary,
}

pub struct ObservationService<P: ProjectRepository, O: ObservationRepository> {
    projects: P,
    observations: O,
}

impl<P: ProjectRepository, O: ObservationRepository> ObservationService<P, O> {
    pub fn new(projects: P, observations: O) -> Self {
        Self {
            projects,
            observations,
        }
    }

    /// Resolve an observation and the project it belongs to.
    async fn resolve(&self, id: Uuid) -> ZooResult<(Project, Observation)> {
        let observation = self.observations.get_by_id(id).await?;
        let project = self.projects.get_by_id(observation.project_id).await?;
        Ok((project, observation))
    }

    /// Record an observation in a project. The observer is always the
    /// calling actor.
    pub async fn create_observation(
        &self,
        actor: Actor,
        input: CreateObservation,
    ) -> ZooResult<Observation> {
        let project = self.projects.get_by_id(input.project_id).await?;
        authorize_project(actor, &project, Action::AddObservations)?;
        let observer_id = actor
            .user_id()
            .ok_or_else(|| ZooError::Internal("authorized actor without identity".into()))?;

        validate_species(&input.species)?;
        validate_coordinates(&input.coordinates)?;
        validate_count(input.count)?;

        let observation = self.observations.create(observer_id, input).await?;
        info!(
            observation_id = %observation.id,
            project_id = %observation.project_id,
            "Observation recorded"
        );
        Ok(observation)
    }

    pub async fn get_observation(&self, actor: Actor, id: Uuid) -> ZooResult<Observation> {
        let (project, observation) = self.resolve(id).await?;
        authorize_observation(actor, &project, &observation, Action::View)?;
        Ok(observation)
    }

    /// Observations of a viewable project, newest observation date first.
    pub async fn list_project_observations(
        &self,
        actor: Actor,
        project_id: Uuid,
    ) -> ZooResult<Vec<Observation>> {
        let project = self.projects.get_by_id(project_id).await?;
        authorize_project(actor, &project, Action::View)?;
        self.observations.list_by_project(project_id).await
    }

    /// Partial update. Observer and project never change.
    pub async fn update_observation(
        &self,
        actor: Actor,
        id: Uuid,
        input: UpdateObservation,
    ) -> ZooResult<Observation> {
        let (project, observation) = self.resolve(id).await?;
        authorize_observation(actor, &project, &observation, Action::EditObservation)?;

        if let Some(species) = &input.species {
            validate_species(species)?;
        }
        if let Some(coordinates) = &input.coordinates {
            validate_coordinates(coordinates)?;
        }
        validate_count(input.count)?;

        self.observations.update(id, input).await
    }

    pub async fn delete_observation(&self, actor: Actor, id: Uuid) -> ZooResult<()> {
        let (project, observation) = self.resolve(id).await?;
        authorize_observation(actor, &project, &observation, Action::DeleteObservation)?;

        self.observations.delete(id).await?;
        info!(observation_id = %id, project_id = %project.id, "Observation deleted");
        Ok(())
    }

    /// What the actor may do with one observation.
    pub async fn observation_permissions(
        &self,
        actor: Actor,
        id: Uuid,
    ) -> ZooResult<PermissionSummary> {
        let (project, observation) = self.resolve(id).await?;
        authorize_observation(actor, &project, &observation, Action::View)?;

        summarize(actor, &project, &observation).ok_or_else(|| ZooError::not_found("observation", id))
    }

    /// Every observation of a project with the actor's affordances,
    /// evaluated against a single project lookup.
    pub async fn list_with_permissions(
        &self,
        actor: Actor,
        project_id: Uuid,
    ) -> ZooResult<Vec<ObservationWithPermissions>> {
        let project = self.projects.get_by_id(project_id).await?;
        authorize_project(actor, &project, Action::View)?;

        let observations = self.observations.list_by_project(project_id).await?;
        let summaries = summarize_batch(actor, &project, &observations)
            .ok_or_else(|| ZooError::not_found("project", project_id))?;

        Ok(observations
            .into_iter()
            .zip(summaries)
            .map(|(observation, (_, permissions))| ObservationWithPermissions {
                observation,
                permissions,
            })
            .collect())
    }
}

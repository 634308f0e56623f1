//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async and return
//! [`ZooError::NotFound`](crate::error::ZooError::NotFound) when an id
//! does not resolve. Membership mutations must be serialized per project
//! by the implementation; callers never re-check afterwards.

use uuid::Uuid;

use crate::error::ZooResult;
use crate::models::{
    membership::ProjectRole,
    observation::{CreateObservation, Observation, UpdateObservation},
    project::{CreateProject, Project, UpdateProject},
    user::{CreateUser, User},
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the email is taken.
    fn create(&self, input: CreateUser) -> impl Future<Output = ZooResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ZooResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = ZooResult<User>> + Send;
}

// ---------------------------------------------------------------------------
// Projects & membership
// ---------------------------------------------------------------------------

pub trait ProjectRepository: Send + Sync {
    fn create(
        &self,
        creator_id: Uuid,
        input: CreateProject,
    ) -> impl Future<Output = ZooResult<Project>> + Send;

    /// Fetch a project with its member list populated.
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ZooResult<Project>> + Send;

    fn update(
        &self,
        id: Uuid,
        input: UpdateProject,
    ) -> impl Future<Output = ZooResult<Project>> + Send;

    /// Delete a project together with its memberships and observations.
    fn delete(&self, id: Uuid) -> impl Future<Output = ZooResult<()>> + Send;

    /// All public projects, newest first.
    fn list_public(&self) -> impl Future<Output = ZooResult<Vec<Project>>> + Send;

    /// Public projects plus private ones the user created or belongs to,
    /// newest first.
    fn list_accessible(&self, user_id: Uuid)
    -> impl Future<Output = ZooResult<Vec<Project>>> + Send;

    /// Projects the user created or belongs to, regardless of visibility,
    /// newest first.
    fn list_for_user(&self, user_id: Uuid) -> impl Future<Output = ZooResult<Vec<Project>>> + Send;

    /// Append a membership. Fails with `AlreadyExists` when the user is
    /// already a member; two racing calls for the same pair never both
    /// succeed.
    fn add_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
    ) -> impl Future<Output = ZooResult<Project>> + Send;

    /// Fails with `NotFound` when the user is not a member.
    fn remove_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = ZooResult<()>> + Send;

    /// Fails with `NotFound` when the user is not a member.
    fn set_member_role(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
    ) -> impl Future<Output = ZooResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Observations
// ---------------------------------------------------------------------------

pub trait ObservationRepository: Send + Sync {
    fn create(
        &self,
        observer_id: Uuid,
        input: CreateObservation,
    ) -> impl Future<Output = ZooResult<Observation>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ZooResult<Observation>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateObservation,
    ) -> impl Future<Output = ZooResult<Observation>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = ZooResult<()>> + Send;

    /// Observations of one project, most recent `observation_date` first.
    fn list_by_project(
        &self,
        project_id: Uuid,
    ) -> impl Future<Output = ZooResult<Vec<Observation>>> + Send;

    /// Observations recorded by one user, most recently created first.
    fn list_by_observer(
        &self,
        observer_id: Uuid,
    ) -> impl Future<Output = ZooResult<Vec<Observation>>> + Send;
}

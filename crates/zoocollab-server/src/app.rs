//! Service wiring over one SurrealDB handle.

use surrealdb::{Connection, Surreal};
use zoocollab_auth::{AuthConfig, AuthService, IdentityResolver};
use zoocollab_db::repository::{
    SurrealObservationRepository, SurrealProjectRepository, SurrealUserRepository,
};
use zoocollab_service::{ObservationService, ProfileService, ProjectService};

/// Every service the application exposes, sharing one connection.
pub struct App<C: Connection> {
    pub identity: IdentityResolver,
    pub auth: AuthService<SurrealUserRepository<C>>,
    pub projects: ProjectService<SurrealProjectRepository<C>, SurrealUserRepository<C>>,
    pub observations:
        ObservationService<SurrealProjectRepository<C>, SurrealObservationRepository<C>>,
    pub profile: ProfileService<
        SurrealProjectRepository<C>,
        SurrealObservationRepository<C>,
        SurrealUserRepository<C>,
    >,
}

impl<C: Connection> App<C> {
    pub fn new(db: Surreal<C>, auth: AuthConfig) -> Self {
        let users = match &auth.pepper {
            Some(pepper) => SurrealUserRepository::with_pepper(db.clone(), pepper.clone()),
            None => SurrealUserRepository::new(db.clone()),
        };
        let projects = SurrealProjectRepository::new(db.clone());
        let observations = SurrealObservationRepository::new(db);

        Self {
            identity: IdentityResolver::new(auth.clone()),
            auth: AuthService::new(users.clone(), auth),
            projects: ProjectService::new(projects.clone(), users.clone()),
            observations: ObservationService::new(projects.clone(), observations.clone()),
            profile: ProfileService::new(projects, observations, users),
        }
    }
}

//! Integration tests for project and membership workflows.

use chrono::{Duration, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;
use zoocollab_core::error::ZooError;
use zoocollab_core::models::actor::Actor;
use zoocollab_core::models::membership::ProjectRole;
use zoocollab_core::models::observation::{Coordinates, CreateObservation, Species};
use zoocollab_core::models::project::{
    CreateProject, Project, ProjectStatus, UpdateProject, Visibility,
};
use zoocollab_core::models::user::CreateUser;
use zoocollab_core::repository::UserRepository;
use zoocollab_db::repository::{
    SurrealObservationRepository, SurrealProjectRepository, SurrealUserRepository,
};
use zoocollab_service::{ObservationService, ProjectService};

struct Fixture {
    projects: ProjectService<SurrealProjectRepository<Db>, SurrealUserRepository<Db>>,
    observations: ObservationService<SurrealProjectRepository<Db>, SurrealObservationRepository<Db>>,
    users: SurrealUserRepository<Db>,
}

async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    zoocollab_db::run_migrations(&db).await.unwrap();

    Fixture {
        projects: ProjectService::new(
            SurrealProjectRepository::new(db.clone()),
            SurrealUserRepository::new(db.clone()),
        ),
        observations: ObservationService::new(
            SurrealProjectRepository::new(db.clone()),
            SurrealObservationRepository::new(db.clone()),
        ),
        users: SurrealUserRepository::new(db),
    }
}

async fn register(fx: &Fixture, email: &str) -> Uuid {
    fx.users
        .create(CreateUser {
            name: "Researcher".into(),
            email: email.into(),
            password: "field-season".into(),
            institution: "Institute of Biology".into(),
            specialization: None,
            account_type: None,
        })
        .await
        .unwrap()
        .id
}

fn new_project(title: &str, visibility: Visibility) -> CreateProject {
    CreateProject {
        title: title.into(),
        description: "Transect survey".into(),
        start_date: Utc::now(),
        end_date: None,
        status: Some(ProjectStatus::Active),
        visibility: Some(visibility),
        target_species: Vec::new(),
    }
}

async fn create(fx: &Fixture, creator: Uuid, visibility: Visibility) -> Project {
    fx.projects
        .create_project(Actor::Authenticated(creator), new_project("Bears", visibility))
        .await
        .unwrap()
}

#[tokio::test]
async fn anonymous_cannot_create_or_list() {
    let fx = setup().await;
    let err = fx
        .projects
        .create_project(Actor::Anonymous, new_project("x", Visibility::Public))
        .await
        .unwrap_err();
    assert!(matches!(err, ZooError::Unauthenticated { .. }));

    let err = fx.projects.list_projects(Actor::Anonymous).await.unwrap_err();
    assert!(matches!(err, ZooError::Unauthenticated { .. }));
}

#[tokio::test]
async fn create_validates_title_and_dates() {
    let fx = setup().await;
    let actor = Actor::Authenticated(register(&fx, "a@example.org").await);

    let err = fx
        .projects
        .create_project(actor, new_project("   ", Visibility::Public))
        .await
        .unwrap_err();
    assert!(matches!(err, ZooError::Validation { .. }));

    let mut input = new_project("Backwards", Visibility::Public);
    input.end_date = Some(input.start_date - Duration::days(1));
    let err = fx.projects.create_project(actor, input).await.unwrap_err();
    assert!(matches!(err, ZooError::Validation { .. }));
}

#[tokio::test]
async fn only_creator_manages_project() {
    let fx = setup().await;
    let a = register(&fx, "a@example.org").await;
    let b = register(&fx, "b@example.org").await;
    let p = create(&fx, a, Visibility::Private).await;
    fx.projects
        .add_member(Actor::Authenticated(a), p.id, "b@example.org", "co-investigator")
        .await
        .unwrap();

    let change = UpdateProject {
        status: Some(ProjectStatus::Completed),
        ..Default::default()
    };
    let err = fx
        .projects
        .update_project(Actor::Authenticated(b), p.id, change.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, ZooError::Forbidden { .. }));

    let updated = fx
        .projects
        .update_project(Actor::Authenticated(a), p.id, change)
        .await
        .unwrap();
    assert_eq!(updated.status, ProjectStatus::Completed);

    let err = fx
        .projects
        .delete_project(Actor::Authenticated(b), p.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ZooError::Forbidden { .. }));
}

#[tokio::test]
async fn membership_rules() {
    let fx = setup().await;
    let a = register(&fx, "a@example.org").await;
    let b = register(&fx, "b@example.org").await;
    let creator = Actor::Authenticated(a);
    let p = create(&fx, a, Visibility::Private).await;

    // Creator cannot be added as a member.
    let err = fx
        .projects
        .add_member(creator, p.id, "a@example.org", "observer")
        .await
        .unwrap_err();
    assert!(matches!(err, ZooError::Validation { .. }));

    // Unknown email.
    let err = fx
        .projects
        .add_member(creator, p.id, "ghost@example.org", "observer")
        .await
        .unwrap_err();
    assert!(matches!(err, ZooError::NotFound { .. }));

    fx.projects
        .add_member(creator, p.id, " B@Example.org ", "observer")
        .await
        .unwrap();
    let err = fx
        .projects
        .add_member(creator, p.id, "b@example.org", "co-investigator")
        .await
        .unwrap_err();
    assert!(matches!(err, ZooError::AlreadyExists { .. }));

    // A member cannot manage membership.
    let err = fx
        .projects
        .remove_member(Actor::Authenticated(b), p.id, b)
        .await
        .unwrap_err();
    assert!(matches!(err, ZooError::Forbidden { .. }));

    let err = fx
        .projects
        .set_member_role(creator, p.id, b, "owner")
        .await
        .unwrap_err();
    assert!(matches!(err, ZooError::InvalidRole(_)));

    fx.projects
        .set_member_role(creator, p.id, b, "research-assistant")
        .await
        .unwrap();
    let reloaded = fx.projects.get_project(creator, p.id).await.unwrap();
    assert_eq!(reloaded.members[0].role, ProjectRole::ResearchAssistant);

    fx.projects.remove_member(creator, p.id, b).await.unwrap();
    let err = fx
        .projects
        .remove_member(creator, p.id, b)
        .await
        .unwrap_err();
    assert!(matches!(err, ZooError::NotFound { .. }));
    let err = fx
        .projects
        .set_member_role(creator, p.id, b, "observer")
        .await
        .unwrap_err();
    assert!(matches!(err, ZooError::NotFound { .. }));

    // Former member no longer sees the private project.
    let err = fx
        .projects
        .get_project(Actor::Authenticated(b), p.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ZooError::NotFound { .. }));
}

#[tokio::test]
async fn listings() {
    let fx = setup().await;
    let a = register(&fx, "a@example.org").await;
    let b = register(&fx, "b@example.org").await;
    let public = create(&fx, a, Visibility::Public).await;
    let private = create(&fx, a, Visibility::Private).await;

    let public_ids: Vec<Uuid> = fx
        .projects
        .list_public_projects()
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(public_ids, vec![public.id]);

    assert_eq!(
        fx.projects
            .list_projects(Actor::Authenticated(b))
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        fx.projects
            .list_projects(Actor::Authenticated(a))
            .await
            .unwrap()
            .len(),
        2
    );
    assert!(
        fx.projects
            .list_projects(Actor::Authenticated(a))
            .await
            .unwrap()
            .iter()
            .any(|p| p.id == private.id)
    );
}

#[tokio::test]
async fn delete_project_removes_observations() {
    let fx = setup().await;
    let a = register(&fx, "a@example.org").await;
    let creator = Actor::Authenticated(a);
    let p = create(&fx, a, Visibility::Public).await;

    let obs = fx
        .observations
        .create_observation(
            creator,
            CreateObservation {
                project_id: p.id,
                species: Species {
                    scientific_name: "Ursus arctos".into(),
                    common_name: Some("Brown bear".into()),
                },
                coordinates: Coordinates {
                    longitude: 25.3,
                    latitude: 45.6,
                },
                observation_date: Utc::now(),
                count: None,
                notes: None,
                images: Vec::new(),
            },
        )
        .await
        .unwrap();

    fx.projects.delete_project(creator, p.id).await.unwrap();

    let err = fx
        .observations
        .get_observation(creator, obs.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ZooError::NotFound { .. }));
    let err = fx.projects.get_project(creator, p.id).await.unwrap_err();
    assert!(matches!(err, ZooError::NotFound { .. }));
}

//! End-to-end access scenarios over in-memory SurrealDB: a private
//! project with mixed roles, a public project seen anonymously, and
//! rejection of unknown roles.

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;
use zoocollab_core::error::ZooError;
use zoocollab_core::models::actor::Actor;
use zoocollab_core::models::observation::{
    Coordinates, CreateObservation, Observation, Species, UpdateObservation,
};
use zoocollab_core::models::project::{CreateProject, Project, Visibility};
use zoocollab_core::models::user::CreateUser;
use zoocollab_core::permission::{DenialReason, EffectiveRole};
use zoocollab_core::repository::UserRepository;
use zoocollab_db::repository::{
    SurrealObservationRepository, SurrealProjectRepository, SurrealUserRepository,
};
use zoocollab_service::{ObservationService, ProjectService};

type Projects = ProjectService<SurrealProjectRepository<Db>, SurrealUserRepository<Db>>;
type Observations = ObservationService<SurrealProjectRepository<Db>, SurrealObservationRepository<Db>>;

struct World {
    projects: Projects,
    observations: Observations,
    users: SurrealUserRepository<Db>,
}

async fn setup() -> World {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    zoocollab_db::run_migrations(&db).await.unwrap();

    World {
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

async fn user(world: &World, email: &str) -> Actor {
    let user = world
        .users
        .create(CreateUser {
            name: email.split('@').next().unwrap().into(),
            email: email.into(),
            password: "field-season".into(),
            institution: "Natural History Museum".into(),
            specialization: None,
            account_type: None,
        })
        .await
        .unwrap();
    Actor::Authenticated(user.id)
}

async fn project(world: &World, creator: Actor, visibility: Visibility) -> Project {
    world
        .projects
        .create_project(
            creator,
            CreateProject {
                title: "Danube Delta herons".into(),
                description: "Breeding colony census".into(),
                start_date: Utc::now(),
                end_date: None,
                status: None,
                visibility: Some(visibility),
                target_species: Vec::new(),
            },
        )
        .await
        .unwrap()
}

async fn observe(world: &World, actor: Actor, project_id: Uuid) -> Observation {
    world
        .observations
        .create_observation(actor, sighting(project_id))
        .await
        .unwrap()
}

fn sighting(project_id: Uuid) -> CreateObservation {
    CreateObservation {
        project_id,
        species: Species {
            scientific_name: "Ardea cinerea".into(),
            common_name: Some("Grey heron".into()),
        },
        coordinates: Coordinates {
            longitude: 29.1,
            latitude: 45.2,
        },
        observation_date: Utc::now(),
        count: Some(3),
        notes: None,
        images: Vec::new(),
    }
}

fn note(text: &str) -> UpdateObservation {
    UpdateObservation {
        notes: Some(Some(text.into())),
        ..Default::default()
    }
}

#[tokio::test]
async fn private_project_with_research_assistant() {
    let world = setup().await;
    let a = user(&world, "a@example.org").await;
    let b = user(&world, "b@example.org").await;
    let c = user(&world, "c@example.org").await;

    let p = project(&world, a, Visibility::Private).await;
    let p = world
        .projects
        .add_member(a, p.id, "b@example.org", "asistent-cercetare")
        .await
        .unwrap();
    assert_eq!(p.members.len(), 1);
    assert_eq!(p.members[0].role.as_str(), "research-assistant");

    let o1 = observe(&world, b, p.id).await;
    let o2 = observe(&world, a, p.id).await;
    assert_eq!(o1.observer_id, b.user_id().unwrap());

    // Outsider: mutations forbidden, reads hidden.
    let err = world
        .observations
        .update_observation(c, o1.id, note("c"))
        .await
        .unwrap_err();
    match err {
        ZooError::Forbidden { reason } => {
            assert_eq!(reason, DenialReason::NotProjectMember.message())
        }
        other => panic!("expected Forbidden, got {other:?}"),
    }
    assert!(matches!(
        world.observations.get_observation(c, o1.id).await,
        Err(ZooError::NotFound { .. })
    ));
    assert!(matches!(
        world.projects.get_project(c, p.id).await,
        Err(ZooError::NotFound { .. })
    ));

    // Creator edits anything.
    let edited = world
        .observations
        .update_observation(a, o1.id, note("checked by A"))
        .await
        .unwrap();
    assert_eq!(edited.notes.as_deref(), Some("checked by A"));
    assert_eq!(edited.observer_id, o1.observer_id);

    // Research assistant edits own, not others'.
    world
        .observations
        .update_observation(b, o1.id, note("by B"))
        .await
        .unwrap();
    let err = world
        .observations
        .update_observation(b, o2.id, note("by B"))
        .await
        .unwrap_err();
    match err {
        ZooError::Forbidden { reason } => {
            assert_eq!(reason, DenialReason::NotObservationOwner.message())
        }
        other => panic!("expected Forbidden, got {other:?}"),
    }

    let summary = world
        .observations
        .observation_permissions(b, o2.id)
        .await
        .unwrap();
    assert_eq!(summary.user_role, Some(EffectiveRole::ResearchAssistant));
    assert!(!summary.can_edit);
    assert!(!summary.can_delete);
    assert!(!summary.is_owner);

    let summary = world
        .observations
        .observation_permissions(a, o1.id)
        .await
        .unwrap();
    assert_eq!(summary.user_role, Some(EffectiveRole::Creator));
    assert!(summary.can_edit && summary.can_delete && !summary.is_owner);
}

#[tokio::test]
async fn public_project_seen_anonymously() {
    let world = setup().await;
    let a = user(&world, "a@example.org").await;
    let q = project(&world, a, Visibility::Public).await;
    let obs = observe(&world, a, q.id).await;

    let seen = world
        .projects
        .get_project(Actor::Anonymous, q.id)
        .await
        .unwrap();
    assert_eq!(seen.id, q.id);

    let listed = world
        .observations
        .list_project_observations(Actor::Anonymous, q.id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    let with_permissions = world
        .observations
        .list_with_permissions(Actor::Anonymous, q.id)
        .await
        .unwrap();
    assert_eq!(with_permissions[0].observation.id, obs.id);
    assert_eq!(with_permissions[0].permissions.user_role, None);
    assert!(!with_permissions[0].permissions.can_edit);

    let err = world
        .observations
        .create_observation(Actor::Anonymous, sighting(q.id))
        .await
        .unwrap_err();
    assert!(matches!(err, ZooError::Unauthenticated { .. }), "got {err:?}");

    let err = world
        .observations
        .delete_observation(Actor::Anonymous, obs.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ZooError::Unauthenticated { .. }));
}

#[tokio::test]
async fn unknown_role_is_rejected_before_any_lookup() {
    let world = setup().await;
    let a = user(&world, "a@example.org").await;
    user(&world, "b@example.org").await;
    let p = project(&world, a, Visibility::Private).await;

    let err = world
        .projects
        .add_member(a, p.id, "b@example.org", "admin")
        .await
        .unwrap_err();
    assert!(matches!(err, ZooError::InvalidRole(_)));

    // Even a missing project or an unauthorized caller sees InvalidRole.
    let err = world
        .projects
        .add_member(Actor::Anonymous, Uuid::new_v4(), "nobody@example.org", "admin")
        .await
        .unwrap_err();
    assert!(matches!(err, ZooError::InvalidRole(_)));

    let reloaded = world.projects.get_project(a, p.id).await.unwrap();
    assert!(reloaded.members.is_empty());
}

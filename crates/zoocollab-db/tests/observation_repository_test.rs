//! Integration tests for the Observation repository using in-memory
//! SurrealDB.

use chrono::{Duration, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;
use zoocollab_core::error::ZooError;
use zoocollab_core::models::observation::{
    Coordinates, CreateObservation, Species, UpdateObservation,
};
use zoocollab_core::repository::ObservationRepository;
use zoocollab_db::repository::SurrealObservationRepository;

async fn setup() -> SurrealObservationRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    zoocollab_db::run_migrations(&db).await.unwrap();
    SurrealObservationRepository::new(db)
}

fn sighting(project_id: Uuid, days_ago: i64) -> CreateObservation {
    CreateObservation {
        project_id,
        species: Species {
            scientific_name: "Ciconia ciconia".into(),
            common_name: Some("White stork".into()),
        },
        coordinates: Coordinates {
            longitude: 28.7,
            latitude: 45.1,
        },
        observation_date: Utc::now() - Duration::days(days_ago),
        count: None,
        notes: Some("nesting pair".into()),
        images: vec!["stork-1.jpg".into()],
    }
}

#[tokio::test]
async fn create_defaults_count_to_one() {
    let repo = setup().await;
    let observer = Uuid::new_v4();
    let project = Uuid::new_v4();

    let obs = repo.create(observer, sighting(project, 0)).await.unwrap();
    assert_eq!(obs.count, 1);
    assert_eq!(obs.observer_id, observer);
    assert_eq!(obs.project_id, project);
    assert_eq!(obs.species.common_name.as_deref(), Some("White stork"));
    assert_eq!(obs.images, vec!["stork-1.jpg".to_string()]);
}

#[tokio::test]
async fn out_of_range_coordinates_are_rejected_by_schema() {
    let repo = setup().await;
    let mut input = sighting(Uuid::new_v4(), 0);
    input.coordinates.latitude = 91.0;

    assert!(repo.create(Uuid::new_v4(), input).await.is_err());
}

#[tokio::test]
async fn update_and_clear_notes() {
    let repo = setup().await;
    let obs = repo
        .create(Uuid::new_v4(), sighting(Uuid::new_v4(), 0))
        .await
        .unwrap();

    let updated = repo
        .update(
            obs.id,
            UpdateObservation {
                count: Some(4),
                notes: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.count, 4);
    assert_eq!(updated.notes, None);
    assert_eq!(updated.species.scientific_name, "Ciconia ciconia");

    let err = repo
        .update(
            Uuid::new_v4(),
            UpdateObservation {
                count: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ZooError::NotFound { .. }));
}

#[tokio::test]
async fn list_by_project_is_newest_observation_first() {
    let repo = setup().await;
    let project = Uuid::new_v4();
    let observer = Uuid::new_v4();

    let old = repo.create(observer, sighting(project, 10)).await.unwrap();
    let recent = repo.create(observer, sighting(project, 1)).await.unwrap();
    repo.create(observer, sighting(Uuid::new_v4(), 0))
        .await
        .unwrap();

    let ids: Vec<Uuid> = repo
        .list_by_project(project)
        .await
        .unwrap()
        .iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(ids, vec![recent.id, old.id]);

    assert_eq!(repo.list_by_observer(observer).await.unwrap().len(), 3);
}

#[tokio::test]
async fn delete_observation() {
    let repo = setup().await;
    let obs = repo
        .create(Uuid::new_v4(), sighting(Uuid::new_v4(), 0))
        .await
        .unwrap();

    repo.delete(obs.id).await.unwrap();
    let err = repo.get_by_id(obs.id).await.unwrap_err();
    assert!(matches!(err, ZooError::NotFound { .. }));

    let err = repo.delete(obs.id).await.unwrap_err();
    assert!(matches!(err, ZooError::NotFound { .. }));
}

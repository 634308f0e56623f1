//! SurrealDB implementation of [`ObservationRepository`].
//!
//! Species and coordinates are flattened into scalar columns so the
//! schema can constrain longitude and latitude ranges directly.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use zoocollab_core::error::ZooResult;
use zoocollab_core::models::observation::{
    Coordinates, CreateObservation, Observation, Species, UpdateObservation,
};
use zoocollab_core::repository::ObservationRepository;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ObservationRowWithId {
    record_id: String,
    project_id: String,
    observer_id: String,
    scientific_name: String,
    common_name: Option<String>,
    longitude: f64,
    latitude: f64,
    observation_date: DateTime<Utc>,
    individual_count: u32,
    notes: Option<String>,
    images: Vec<String>,
    created_at: DateTime<Utc>,
}

impl ObservationRowWithId {
    fn try_into_observation(self) -> Result<Observation, DbError> {
        Ok(Observation {
            id: parse_uuid(&self.record_id, "observation")?,
            project_id: parse_uuid(&self.project_id, "project")?,
            observer_id: parse_uuid(&self.observer_id, "observer")?,
            species: Species {
                scientific_name: self.scientific_name,
                common_name: self.common_name,
            },
            coordinates: Coordinates {
                longitude: self.longitude,
                latitude: self.latitude,
            },
            observation_date: self.observation_date,
            count: self.individual_count,
            notes: self.notes,
            images: self.images,
            created_at: self.created_at,
        })
    }
}

const OBSERVATION_SELECT: &str = "SELECT meta::id(id) AS record_id, project_id, observer_id, \
     scientific_name, common_name, longitude, latitude, observation_date, \
     individual_count, notes, images, created_at";

fn collect(rows: Vec<ObservationRowWithId>) -> Result<Vec<Observation>, DbError> {
    rows.into_iter()
        .map(ObservationRowWithId::try_into_observation)
        .collect()
}

/// SurrealDB implementation of the Observation repository.
pub struct SurrealObservationRepository<C: Connection> {
    db: Surreal<C>,
}

// Manual impl: `derive(Clone)` would add a needless `C: Clone` bound.
impl<C: Connection> Clone for SurrealObservationRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealObservationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ObservationRepository for SurrealObservationRepository<C> {
    async fn create(&self, observer_id: Uuid, input: CreateObservation) -> ZooResult<Observation> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('observation', $id) SET \
                 project_id = $project_id, observer_id = $observer_id, \
                 scientific_name = $scientific_name, common_name = $common_name, \
                 longitude = $longitude, latitude = $latitude, \
                 observation_date = $observation_date, \
                 individual_count = $individual_count, \
                 notes = $notes, images = $images",
            )
            .bind(("id", id_str))
            .bind(("project_id", input.project_id.to_string()))
            .bind(("observer_id", observer_id.to_string()))
            .bind(("scientific_name", input.species.scientific_name))
            .bind(("common_name", input.species.common_name))
            .bind(("longitude", input.coordinates.longitude))
            .bind(("latitude", input.coordinates.latitude))
            .bind(("observation_date", input.observation_date))
            .bind(("individual_count", input.count.unwrap_or(1)))
            .bind(("notes", input.notes))
            .bind(("images", input.images))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::from_statement(e, "observation"))?;

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> ZooResult<Observation> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "{OBSERVATION_SELECT} FROM type::record('observation', $id)"
            ))
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ObservationRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "observation".into(),
            id: id_str,
        })?;

        Ok(row.try_into_observation()?)
    }

    async fn update(&self, id: Uuid, input: UpdateObservation) -> ZooResult<Observation> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.species.is_some() {
            sets.push("scientific_name = $scientific_name");
            sets.push("common_name = $common_name");
        }
        if input.coordinates.is_some() {
            sets.push("longitude = $longitude");
            sets.push("latitude = $latitude");
        }
        if input.observation_date.is_some() {
            sets.push("observation_date = $observation_date");
        }
        if input.count.is_some() {
            sets.push("individual_count = $individual_count");
        }
        if input.notes.is_some() {
            sets.push("notes = $notes");
        }
        if input.images.is_some() {
            sets.push("images = $images");
        }
        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE type::record('observation', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(species) = input.species {
            builder = builder
                .bind(("scientific_name", species.scientific_name))
                .bind(("common_name", species.common_name));
        }
        if let Some(coordinates) = input.coordinates {
            builder = builder
                .bind(("longitude", coordinates.longitude))
                .bind(("latitude", coordinates.latitude));
        }
        if let Some(observation_date) = input.observation_date {
            builder = builder.bind(("observation_date", observation_date));
        }
        if let Some(count) = input.count {
            builder = builder.bind(("individual_count", count));
        }
        if let Some(notes) = input.notes {
            builder = builder.bind(("notes", notes));
        }
        if let Some(images) = input.images {
            builder = builder.bind(("images", images));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement(e, "observation"))?;

        let rows: Vec<TouchedRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "observation".into(),
                id: id_str,
            }
            .into());
        }

        self.get_by_id(id).await
    }

    async fn delete(&self, id: Uuid) -> ZooResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("DELETE type::record('observation', $id) RETURN BEFORE")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TouchedRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "observation".into(),
                id: id_str,
            }
            .into());
        }
        Ok(())
    }

    async fn list_by_project(&self, project_id: Uuid) -> ZooResult<Vec<Observation>> {
        let mut result = self
            .db
            .query(format!(
                "{OBSERVATION_SELECT} FROM observation \
                 WHERE project_id = $project_id ORDER BY observation_date DESC"
            ))
            .bind(("project_id", project_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ObservationRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }

    async fn list_by_observer(&self, observer_id: Uuid) -> ZooResult<Vec<Observation>> {
        let mut result = self
            .db
            .query(format!(
                "{OBSERVATION_SELECT} FROM observation \
                 WHERE observer_id = $observer_id ORDER BY created_at DESC"
            ))
            .bind(("observer_id", observer_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ObservationRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }
}

/// Minimal projection used to tell whether a write matched a record.
#[derive(Debug, SurrealValue)]
struct TouchedRow {
    #[allow(dead_code)]
    project_id: String,
}

//! Species observation domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub scientific_name: String,
    pub common_name: Option<String>,
}

/// WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        (-180.0..=180.0).contains(&self.longitude) && (-90.0..=90.0).contains(&self.latitude)
    }
}

/// A geolocated sighting recorded inside exactly one project.
///
/// `observer_id` is fixed at creation and is the only ownership anchor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub id: Uuid,
    pub project_id: Uuid,
    pub observer_id: Uuid,
    pub species: Species,
    pub coordinates: Coordinates,
    pub observation_date: DateTime<Utc>,
    pub count: u32,
    pub notes: Option<String>,
    /// Paths to stored image files.
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateObservation {
    pub project_id: Uuid,
    pub species: Species,
    pub coordinates: Coordinates,
    pub observation_date: DateTime<Utc>,
    /// Defaults to 1.
    pub count: Option<u32>,
    pub notes: Option<String>,
    pub images: Vec<String>,
}

/// Partial update. Project and observer are not editable.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateObservation {
    pub species: Option<Species>,
    pub coordinates: Option<Coordinates>,
    pub observation_date: Option<DateTime<Utc>>,
    pub count: Option<u32>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub notes: Option<Option<String>>,
    pub images: Option<Vec<String>>,
}

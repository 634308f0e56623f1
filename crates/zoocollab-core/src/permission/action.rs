use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Everything an actor can ask to do inside a project.
///
/// The first six are coarse capabilities answered by the role table.
/// `EditObservation`/`DeleteObservation` are scoped to one observation
/// and subject to the ownership override. `ManageProject` covers the
/// creator-only project mutations (settings, membership, deletion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    AddObservations,
    EditOwnObservations,
    EditAllObservations,
    DeleteOwnObservations,
    DeleteAllObservations,
    EditObservation,
    DeleteObservation,
    ManageProject,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::View,
        Action::AddObservations,
        Action::EditOwnObservations,
        Action::EditAllObservations,
        Action::DeleteOwnObservations,
        Action::DeleteAllObservations,
        Action::EditObservation,
        Action::DeleteObservation,
        Action::ManageProject,
    ];

    /// Whether the action targets one specific observation.
    pub fn is_observation_scoped(&self) -> bool {
        matches!(self, Action::EditObservation | Action::DeleteObservation)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::AddObservations => "add_observations",
            Action::EditOwnObservations => "edit_own_observations",
            Action::EditAllObservations => "edit_all_observations",
            Action::DeleteOwnObservations => "delete_own_observations",
            Action::DeleteAllObservations => "delete_all_observations",
            Action::EditObservation => "edit_observation",
            Action::DeleteObservation => "delete_observation",
            Action::ManageProject => "manage_project",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("unknown action: {s}"))
    }
}

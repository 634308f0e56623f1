//! Per-user statistics and recent activity.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Months, Utc};
use serde::Serialize;
use uuid::Uuid;
use zoocollab_core::error::{ZooError, ZooResult};
use zoocollab_core::models::actor::Actor;
use zoocollab_core::models::membership::ProjectRole;
use zoocollab_core::models::observation::Observation;
use zoocollab_core::models::project::{Project, ProjectStatus};
use zoocollab_core::repository::{ObservationRepository, ProjectRepository, UserRepository};

use crate::guard::require_user;

const TOP_SPECIES: usize = 10;
const RECENT_OBSERVATIONS: usize = 10;
const RECENT_PROJECTS: usize = 5;
const RECENT_MEMBERSHIPS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub planned: usize,
    pub active: usize,
    pub completed: usize,
    pub suspended: usize,
}

impl StatusCounts {
    fn bump(&mut self, status: ProjectStatus) {
        match status {
            ProjectStatus::Planned => self.planned += 1,
            ProjectStatus::Active => self.active += 1,
            ProjectStatus::Completed => self.completed += 1,
            ProjectStatus::Suspended => self.suspended += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesTally {
    pub scientific_name: String,
    pub common_name: Option<String>,
    /// Number of observations naming the species.
    pub count: usize,
    /// Sum of individuals across those observations.
    pub total_individuals: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub total_projects: usize,
    pub created_projects: usize,
    pub member_projects: usize,
    pub public_projects: usize,
    pub private_projects: usize,
    pub total_observations: usize,
    pub projects_by_status: StatusCounts,
    /// `YYYY-MM` → observations dated within the last twelve months.
    pub observations_by_month: BTreeMap<String, usize>,
    pub top_species: Vec<SpeciesTally>,
}

/// Aggregate `user_id`'s involvement. `projects` are those the user
/// created or belongs to; `observations` those the user recorded.
pub fn compute_stats(
    user_id: Uuid,
    projects: &[Project],
    observations: &[Observation],
    now: DateTime<Utc>,
) -> ProfileStats {
    let created: Vec<&Project> = projects.iter().filter(|p| p.is_creator(user_id)).collect();

    let mut projects_by_status = StatusCounts::default();
    for project in projects {
        projects_by_status.bump(project.status);
    }

    let cutoff = now.checked_sub_months(Months::new(12)).unwrap_or(now);
    let mut observations_by_month = BTreeMap::new();
    for obs in observations.iter().filter(|o| o.observation_date >= cutoff) {
        *observations_by_month
            .entry(obs.observation_date.format("%Y-%m").to_string())
            .or_insert(0) += 1;
    }

    let mut tallies: HashMap<&str, SpeciesTally> = HashMap::new();
    for obs in observations {
        let tally = tallies
            .entry(obs.species.scientific_name.as_str())
            .or_insert_with(|| SpeciesTally {
                scientific_name: obs.species.scientific_name.clone(),
                common_name: obs.species.common_name.clone(),
                count: 0,
                total_individuals: 0,
            });
        tally.count += 1;
        tally.total_individuals += u64::from(obs.count);
    }
    let mut top_species: Vec<SpeciesTally> = tallies.into_values().collect();
    top_species.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.scientific_name.cmp(&b.scientific_name))
    });
    top_species.truncate(TOP_SPECIES);

    ProfileStats {
        total_projects: projects.len(),
        created_projects: created.len(),
        member_projects: projects
            .iter()
            .filter(|p| !p.is_creator(user_id) && p.membership(user_id).is_some())
            .count(),
        public_projects: created.iter().filter(|p| p.is_public()).count(),
        private_projects: created.iter().filter(|p| !p.is_public()).count(),
        total_observations: observations.len(),
        projects_by_status,
        observations_by_month,
        top_species,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentObservation {
    pub id: Uuid,
    pub scientific_name: String,
    pub common_name: Option<String>,
    pub observation_date: DateTime<Utc>,
    /// `None` when the project has since been removed.
    pub project_title: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentProject {
    pub id: Uuid,
    pub title: String,
    pub status: ProjectStatus,
    pub is_public: bool,
    pub members_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentMembership {
    pub project_id: Uuid,
    pub title: String,
    pub creator_name: Option<String>,
    pub role: ProjectRole,
    pub joined_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileActivity {
    pub recent_observations: Vec<RecentObservation>,
    pub recent_projects: Vec<RecentProject>,
    pub recent_memberships: Vec<RecentMembership>,
}

/// Statistics and activity about the calling user. Authenticated only.
pub struct ProfileService<P: ProjectRepository, O: ObservationRepository, U: UserRepository> {
    projects: P,
    observations: O,
    users: U,
}

impl<P, O, U> ProfileService<P, O, U>
where
    P: ProjectRepository,
    O: ObservationRepository,
    U: UserRepository,
{
    pub fn new(projects: P, observations: O, users: U) -> Self {
        Self {
            projects,
            observations,
            users,
        }
    }

    pub async fn stats(&self, actor: Actor) -> ZooResult<ProfileStats> {
        let user_id = require_user(actor)?;
        let projects = self.projects.list_for_user(user_id).await?;
        let observations = self.observations.list_by_observer(user_id).await?;
        Ok(compute_stats(user_id, &projects, &observations, Utc::now()))
    }

    pub async fn activity(&self, actor: Actor) -> ZooResult<ProfileActivity> {
        let user_id = require_user(actor)?;
        let projects = self.projects.list_for_user(user_id).await?;
        let mut observations = self.observations.list_by_observer(user_id).await?;
        observations.truncate(RECENT_OBSERVATIONS);

        let mut titles: HashMap<Uuid, Option<String>> = projects
            .iter()
            .map(|p| (p.id, Some(p.title.clone())))
            .collect();
        let mut recent_observations = Vec::with_capacity(observations.len());
        for obs in observations {
            if !titles.contains_key(&obs.project_id) {
                let title = match self.projects.get_by_id(obs.project_id).await {
                    Ok(project) => Some(project.title),
                    Err(ZooError::NotFound { .. }) => None,
                    Err(e) => return Err(e),
                };
                titles.insert(obs.project_id, title);
            }
            recent_observations.push(RecentObservation {
                id: obs.id,
                project_title: titles.get(&obs.project_id).cloned().flatten(),
                scientific_name: obs.species.scientific_name,
                common_name: obs.species.common_name,
                observation_date: obs.observation_date,
                created_at: obs.created_at,
            });
        }

        // list_for_user is newest-created first already.
        let recent_projects = projects
            .iter()
            .filter(|p| p.is_creator(user_id))
            .take(RECENT_PROJECTS)
            .map(|p| RecentProject {
                id: p.id,
                title: p.title.clone(),
                status: p.status,
                is_public: p.is_public(),
                members_count: p.members.len(),
                created_at: p.created_at,
            })
            .collect();

        let mut joined: Vec<(&Project, ProjectRole, DateTime<Utc>)> = projects
            .iter()
            .filter_map(|p| p.membership(user_id).map(|m| (p, m.role, m.joined_date)))
            .collect();
        joined.sort_by(|a, b| b.2.cmp(&a.2));
        joined.truncate(RECENT_MEMBERSHIPS);

        let mut recent_memberships = Vec::with_capacity(joined.len());
        for (project, role, joined_date) in joined {
            let creator_name = match self.users.get_by_id(project.creator_id).await {
                Ok(user) => Some(user.name),
                Err(ZooError::NotFound { .. }) => None,
                Err(e) => return Err(e),
            };
            recent_memberships.push(RecentMembership {
                project_id: project.id,
                title: project.title.clone(),
                creator_name,
                role,
                joined_date,
            });
        }

        Ok(ProfileActivity {
            recent_observations,
            recent_projects,
            recent_memberships,
        })
    }
}

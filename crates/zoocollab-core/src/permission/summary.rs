use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::action::Action;
use super::decision::EffectiveRole;
use super::engine::evaluate;
use crate::models::actor::Actor;
use crate::models::observation::Observation;
use crate::models::project::Project;

/// Per-observation affordances for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSummary {
    pub user_role: Option<EffectiveRole>,
    pub can_edit: bool,
    pub can_delete: bool,
    pub is_owner: bool,
}

/// Project the engine's verdicts for one observation into UI flags.
///
/// Returns `None` for an anonymous actor on a private project; such a
/// request must already have been rejected upstream.
pub fn summarize(
    actor: Actor,
    project: &Project,
    observation: &Observation,
) -> Option<PermissionSummary> {
    let user_role = summary_role(actor, project)?;
    let is_owner = actor.user_id() == Some(observation.observer_id);
    Some(PermissionSummary {
        user_role,
        can_edit: evaluate(actor, project, Action::EditObservation, Some(observation)).allowed,
        can_delete: evaluate(actor, project, Action::DeleteObservation, Some(observation)).allowed,
        is_owner,
    })
}

/// Summarize every observation of an already-resolved project.
///
/// The project is resolved once by the caller; only the observations
/// vary, so no per-row project lookup happens.
pub fn summarize_batch<'a, I>(
    actor: Actor,
    project: &Project,
    observations: I,
) -> Option<Vec<(Uuid, PermissionSummary)>>
where
    I: IntoIterator<Item = &'a Observation>,
{
    summary_role(actor, project)?;
    observations
        .into_iter()
        .map(|o| summarize(actor, project, o).map(|s| (o.id, s)))
        .collect()
}

/// `None` = do not compute; `Some(None)` = computed, no role to show.
fn summary_role(actor: Actor, project: &Project) -> Option<Option<EffectiveRole>> {
    match actor {
        Actor::Anonymous if project.is_public() => Some(None),
        Actor::Anonymous => None,
        Actor::Authenticated(id) if project.is_creator(id) => Some(Some(EffectiveRole::Creator)),
        Actor::Authenticated(id) => match project.membership(id) {
            Some(member) => Some(Some(member.role.into())),
            None if project.is_public() => Some(Some(EffectiveRole::Viewer)),
            None => Some(None),
        },
    }
}

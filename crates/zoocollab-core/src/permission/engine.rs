use tracing::trace;

use super::action::Action;
use super::decision::{Decision, DenialReason, EffectiveRole};
use crate::models::actor::Actor;
use crate::models::membership::ProjectRole;
use crate::models::observation::Observation;
use crate::models::project::Project;

const CO_INVESTIGATOR: &[Action] = &[
    Action::View,
    Action::AddObservations,
    Action::EditOwnObservations,
    Action::EditAllObservations,
    Action::DeleteOwnObservations,
    Action::DeleteAllObservations,
];

const RESEARCH_ASSISTANT: &[Action] = &[
    Action::View,
    Action::AddObservations,
    Action::EditOwnObservations,
    Action::DeleteOwnObservations,
];

const OBSERVER: &[Action] = &[Action::View];

/// Coarse capabilities granted to a member role. Anything absent is denied.
pub fn capabilities(role: ProjectRole) -> &'static [Action] {
    match role {
        ProjectRole::CoInvestigator => CO_INVESTIGATOR,
        ProjectRole::ResearchAssistant => RESEARCH_ASSISTANT,
        ProjectRole::Observer => OBSERVER,
    }
}

/// Decide whether `actor` may perform `action` on `project`.
///
/// Rules are ordered and the first match wins:
///
/// 1. `View` on a public project is allowed for everyone, before any
///    membership lookup.
/// 2. Anonymous actors are denied everything else.
/// 3. The creator is allowed every action on every observation.
/// 4. Members are judged by the role table; observation-scoped actions
///    additionally go through the ownership override. Non-members are
///    denied.
pub fn evaluate(
    actor: Actor,
    project: &Project,
    action: Action,
    observation: Option<&Observation>,
) -> Decision {
    let decision = decide(actor, project, action, observation);
    trace!(
        project_id = %project.id,
        action = %action,
        allowed = decision.allowed,
        role = %decision.effective_role,
        "Permission evaluated"
    );
    decision
}

fn decide(
    actor: Actor,
    project: &Project,
    action: Action,
    observation: Option<&Observation>,
) -> Decision {
    if action == Action::View && project.is_public() {
        return Decision::allow(EffectiveRole::Viewer);
    }

    let Actor::Authenticated(user_id) = actor else {
        return Decision::deny(EffectiveRole::None, DenialReason::AuthenticationRequired);
    };

    if project.is_creator(user_id) {
        return Decision::allow(EffectiveRole::Creator);
    }

    let Some(member) = project.membership(user_id) else {
        if action == Action::View && project.is_public() {
            return Decision::allow(EffectiveRole::Viewer);
        }
        return Decision::deny(EffectiveRole::None, DenialReason::NotProjectMember);
    };

    let role = member.role;
    let effective = EffectiveRole::from(role);

    if action.is_observation_scoped() {
        let Some(observation) = observation else {
            return Decision::deny(effective, DenialReason::ObservationRequired);
        };
        if observation.project_id != project.id {
            return Decision::deny(effective, DenialReason::ObservationNotInProject);
        }
        return match role {
            ProjectRole::CoInvestigator => Decision::allow(effective),
            ProjectRole::ResearchAssistant if observation.observer_id == user_id => {
                Decision::allow(effective)
            }
            ProjectRole::ResearchAssistant => {
                Decision::deny(effective, DenialReason::NotObservationOwner)
            }
            ProjectRole::Observer => Decision::deny(effective, DenialReason::RoleLacksPermission),
        };
    }

    if capabilities(role).contains(&action) {
        Decision::allow(effective)
    } else {
        Decision::deny(effective, DenialReason::RoleLacksPermission)
    }
}

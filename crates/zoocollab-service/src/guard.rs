//! Translation of engine decisions into request outcomes.
//!
//! A denied `view` is reported as [`ZooError::NotFound`] so a private
//! project is indistinguishable from a missing one. Any other denial is
//! [`ZooError::Unauthenticated`] for an anonymous caller and
//! [`ZooError::Forbidden`] otherwise.

use tracing::debug;
use uuid::Uuid;
use zoocollab_core::error::{ZooError, ZooResult};
use zoocollab_core::models::actor::Actor;
use zoocollab_core::models::observation::Observation;
use zoocollab_core::models::project::Project;
use zoocollab_core::permission::{Action, Decision, evaluate};

/// Turn a [`Decision`] into `Ok` or the error the caller should see.
///
/// `entity`/`id` name the resource reported when a read is hidden.
pub fn enforce(
    decision: Decision,
    actor: Actor,
    action: Action,
    entity: &str,
    id: Uuid,
) -> ZooResult<Decision> {
    if decision.allowed {
        return Ok(decision);
    }

    let reason = decision
        .reason
        .map(|r| r.message())
        .unwrap_or("access denied");
    debug!(
        entity,
        id = %id,
        action = %action,
        role = %decision.effective_role,
        reason,
        "Access denied"
    );

    if action == Action::View {
        return Err(ZooError::not_found(entity, id));
    }
    if actor.is_anonymous() {
        return Err(ZooError::Unauthenticated {
            reason: reason.into(),
        });
    }
    Err(ZooError::Forbidden {
        reason: reason.into(),
    })
}

/// Evaluate and enforce a project-level action.
pub fn authorize_project(actor: Actor, project: &Project, action: Action) -> ZooResult<Decision> {
    enforce(
        evaluate(actor, project, action, None),
        actor,
        action,
        "project",
        project.id,
    )
}

/// Evaluate and enforce an action on one observation of `project`.
///
/// A hidden observation is reported under its own id.
pub fn authorize_observation(
    actor: Actor,
    project: &Project,
    observation: &Observation,
    action: Action,
) -> ZooResult<Decision> {
    enforce(
        evaluate(actor, project, action, Some(observation)),
        actor,
        action,
        "observation",
        observation.id,
    )
}

/// Reject anonymous callers of endpoints that need an identity but no
/// project context.
pub fn require_user(actor: Actor) -> ZooResult<Uuid> {
    actor.user_id().ok_or_else(|| ZooError::Unauthenticated {
        reason: "authentication required".into(),
    })
}

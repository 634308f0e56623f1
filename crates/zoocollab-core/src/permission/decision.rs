use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::membership::ProjectRole;

/// The role the engine used to reach a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectiveRole {
    Creator,
    CoInvestigator,
    ResearchAssistant,
    Observer,
    Viewer,
    None,
}

impl EffectiveRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectiveRole::Creator => "creator",
            EffectiveRole::CoInvestigator => "co-investigator",
            EffectiveRole::ResearchAssistant => "research-assistant",
            EffectiveRole::Observer => "observer",
            EffectiveRole::Viewer => "viewer",
            EffectiveRole::None => "none",
        }
    }
}

impl From<ProjectRole> for EffectiveRole {
    fn from(role: ProjectRole) -> Self {
        match role {
            ProjectRole::CoInvestigator => EffectiveRole::CoInvestigator,
            ProjectRole::ResearchAssistant => EffectiveRole::ResearchAssistant,
            ProjectRole::Observer => EffectiveRole::Observer,
        }
    }
}

impl fmt::Display for EffectiveRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    AuthenticationRequired,
    NotProjectMember,
    NotObservationOwner,
    RoleLacksPermission,
    ObservationRequired,
    ObservationNotInProject,
}

impl DenialReason {
    /// Human-readable message suitable for display.
    pub fn message(&self) -> &'static str {
        match self {
            DenialReason::AuthenticationRequired => "authentication required",
            DenialReason::NotProjectMember => "not a project member",
            DenialReason::NotObservationOwner => "not your observation",
            DenialReason::RoleLacksPermission => "your role does not permit this action",
            DenialReason::ObservationRequired => "an observation is required for this action",
            DenialReason::ObservationNotInProject => "observation does not belong to this project",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Engine output. Recomputed per call, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    pub effective_role: EffectiveRole,
    pub reason: Option<DenialReason>,
}

impl Decision {
    pub fn allow(effective_role: EffectiveRole) -> Self {
        Self {
            allowed: true,
            effective_role,
            reason: None,
        }
    }

    pub fn deny(effective_role: EffectiveRole, reason: DenialReason) -> Self {
        Self {
            allowed: false,
            effective_role,
            reason: Some(reason),
        }
    }
}

//! Project membership and the fixed role tiers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ZooError;

/// Role a non-creator member holds inside one project.
///
/// The set is closed. Legacy spellings are collapsed by [`FromStr`] so
/// nothing past the parsing boundary ever sees an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectRole {
    /// May add observations and edit or delete any observation.
    CoInvestigator,
    /// May add observations and edit or delete only their own.
    #[serde(alias = "asistent-cercetare")]
    ResearchAssistant,
    /// Read-only.
    Observer,
}

impl ProjectRole {
    pub const ALL: [ProjectRole; 3] = [
        ProjectRole::CoInvestigator,
        ProjectRole::ResearchAssistant,
        ProjectRole::Observer,
    ];

    /// Canonical storage and wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::CoInvestigator => "co-investigator",
            ProjectRole::ResearchAssistant => "research-assistant",
            ProjectRole::Observer => "observer",
        }
    }
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectRole {
    type Err = ZooError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "co-investigator" => Ok(ProjectRole::CoInvestigator),
            "research-assistant" | "asistent-cercetare" => Ok(ProjectRole::ResearchAssistant),
            "observer" => Ok(ProjectRole::Observer),
            other => Err(ZooError::InvalidRole(format!(
                "'{other}' is not one of: co-investigator, research-assistant, \
                 asistent-cercetare, observer"
            ))),
        }
    }
}

/// A `(user, role)` binding scoping a non-creator user's rights within
/// one project. Unique per `(project, user_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub user_id: Uuid,
    pub role: ProjectRole,
    pub joined_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_str_roundtrip() {
        for role in ProjectRole::ALL {
            let parsed: ProjectRole = role.as_str().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn alias_collapses_to_research_assistant() {
        let parsed: ProjectRole = "asistent-cercetare".parse().unwrap();
        assert_eq!(parsed, ProjectRole::ResearchAssistant);
        assert_eq!(parsed.as_str(), "research-assistant");
    }

    #[test]
    fn unknown_role_is_invalid_role() {
        let err = "admin".parse::<ProjectRole>().unwrap_err();
        assert!(matches!(err, ZooError::InvalidRole(_)));
        assert!("".parse::<ProjectRole>().is_err());
        assert!("Observer".parse::<ProjectRole>().is_err());
    }

    #[test]
    fn serde_accepts_alias_and_emits_canonical() {
        let role: ProjectRole = serde_json::from_str("\"asistent-cercetare\"").unwrap();
        assert_eq!(role, ProjectRole::ResearchAssistant);
        assert_eq!(
            serde_json::to_string(&role).unwrap(),
            "\"research-assistant\""
        );
    }
}

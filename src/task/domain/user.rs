//! Actor, role, and team types used for authorization and fan-out.

use super::{ParseRoleError, ParseTeamCategoryError, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// System administrator.
    Admin,
    /// Project manager.
    ProjectManager,
    /// Lead of one team.
    TeamLead,
    /// Developer.
    Developer,
    /// Designer.
    Designer,
    /// Programmer.
    Programmer,
    /// Quality-assurance reviewer.
    Qa,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::ProjectManager => "project_manager",
            Self::TeamLead => "team_lead",
            Self::Developer => "developer",
            Self::Designer => "designer",
            Self::Programmer => "programmer",
            Self::Qa => "qa",
        }
    }

    /// Returns whether the role belongs to the oversight group
    /// (admin, project manager, team lead).
    #[must_use]
    pub const fn is_manager(self) -> bool {
        matches!(self, Self::Admin | Self::ProjectManager | Self::TeamLead)
    }

    /// Returns whether the role performs task work.
    #[must_use]
    pub const fn is_worker(self) -> bool {
        matches!(self, Self::Developer | Self::Designer | Self::Programmer)
    }

    /// Returns whether the role reviews work.
    #[must_use]
    pub const fn is_qa(self) -> bool {
        matches!(self, Self::Qa)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "admin" => Ok(Self::Admin),
            "project_manager" => Ok(Self::ProjectManager),
            "team_lead" => Ok(Self::TeamLead),
            "developer" => Ok(Self::Developer),
            "designer" => Ok(Self::Designer),
            "programmer" => Ok(Self::Programmer),
            "qa" => Ok(Self::Qa),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

/// Closed set of team categories a task and its workers belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamCategory {
    /// Software development team.
    Development,
    /// Design team.
    Design,
    /// Programming team.
    Programming,
}

impl TeamCategory {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Design => "design",
            Self::Programming => "programming",
        }
    }
}

impl fmt::Display for TeamCategory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TeamCategory {
    type Error = ParseTeamCategoryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "design" => Ok(Self::Design),
            "programming" => Ok(Self::Programming),
            _ => Err(ParseTeamCategoryError(value.to_owned())),
        }
    }
}

/// The authenticated principal issuing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// Identifier of the acting user.
    pub id: UserId,
    /// Role the actor holds.
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} ({})", self.id, self.role)
    }
}

/// Directory entry for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    id: UserId,
    name: String,
    role: Role,
    team: Option<TeamCategory>,
}

impl UserProfile {
    /// Creates a profile without a team.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            team: None,
        }
    }

    /// Places the user in a team.
    #[must_use]
    pub const fn with_team(mut self, team: TeamCategory) -> Self {
        self.team = Some(team);
        self
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the user's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the user's team, if any.
    #[must_use]
    pub const fn team(&self) -> Option<TeamCategory> {
        self.team
    }

    /// Returns the profile as an [`Actor`].
    #[must_use]
    pub const fn as_actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

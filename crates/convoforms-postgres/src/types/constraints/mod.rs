//! Named database constraints, grouped per table.
//!
//! Constraint and unique-index names in the migrations are stable, so a
//! violation reported by Postgres can be mapped back to a typed value and
//! from there to a precise API error.

mod subscriptions;
mod users;
mod workspace_activities;
mod workspace_invitations;
mod workspace_members;
mod workspaces;

use std::fmt;

use serde::{Deserialize, Serialize};
pub use subscriptions::SubscriptionConstraints;
pub use users::UserConstraints;
pub use workspace_activities::WorkspaceActivityConstraints;
pub use workspace_invitations::WorkspaceInvitationConstraints;
pub use workspace_members::WorkspaceMemberConstraints;
pub use workspaces::WorkspaceConstraints;

/// Any known constraint of the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConstraintViolation {
    User(UserConstraints),
    Workspace(WorkspaceConstraints),
    WorkspaceMember(WorkspaceMemberConstraints),
    WorkspaceInvitation(WorkspaceInvitationConstraints),
    Subscription(SubscriptionConstraints),
    WorkspaceActivity(WorkspaceActivityConstraints),
}

/// What kind of rule a constraint enforces.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintCategory {
    /// Format, length and range checks.
    Validation,
    /// Ordering between timestamps.
    Chronological,
    /// Domain rules such as one default workspace per owner.
    BusinessLogic,
    /// Primary keys, unique constraints and unique indexes.
    Uniqueness,
}

impl ConstraintViolation {
    /// Parses a constraint name reported by Postgres.
    ///
    /// ```
    /// use convoforms_postgres::types::{ConstraintViolation, WorkspaceConstraints};
    ///
    /// assert_eq!(
    ///     ConstraintViolation::new("workspaces_slug_unique"),
    ///     Some(ConstraintViolation::Workspace(WorkspaceConstraints::SlugUnique)),
    /// );
    /// assert!(ConstraintViolation::new("unknown_constraint").is_none());
    /// ```
    pub fn new(constraint: &str) -> Option<Self> {
        if constraint.starts_with("users_") {
            UserConstraints::new(constraint).map(Self::User)
        } else if constraint.starts_with("workspaces_") {
            WorkspaceConstraints::new(constraint).map(Self::Workspace)
        } else if constraint.starts_with("workspace_members_") {
            WorkspaceMemberConstraints::new(constraint).map(Self::WorkspaceMember)
        } else if constraint.starts_with("workspace_invitations_") {
            WorkspaceInvitationConstraints::new(constraint).map(Self::WorkspaceInvitation)
        } else if constraint.starts_with("subscriptions_") {
            SubscriptionConstraints::new(constraint).map(Self::Subscription)
        } else if constraint.starts_with("workspace_activities_") {
            WorkspaceActivityConstraints::new(constraint).map(Self::WorkspaceActivity)
        } else {
            None
        }
    }

    pub fn table_name(&self) -> &'static str {
        match self {
            ConstraintViolation::User(_) => "users",
            ConstraintViolation::Workspace(_) => "workspaces",
            ConstraintViolation::WorkspaceMember(_) => "workspace_members",
            ConstraintViolation::WorkspaceInvitation(_) => "workspace_invitations",
            ConstraintViolation::Subscription(_) => "subscriptions",
            ConstraintViolation::WorkspaceActivity(_) => "workspace_activities",
        }
    }

    pub fn category(&self) -> ConstraintCategory {
        match self {
            ConstraintViolation::User(c) => c.categorize(),
            ConstraintViolation::Workspace(c) => c.categorize(),
            ConstraintViolation::WorkspaceMember(c) => c.categorize(),
            ConstraintViolation::WorkspaceInvitation(c) => c.categorize(),
            ConstraintViolation::Subscription(c) => c.categorize(),
            ConstraintViolation::WorkspaceActivity(c) => c.categorize(),
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::User(c) => fmt::Display::fmt(c, f),
            ConstraintViolation::Workspace(c) => fmt::Display::fmt(c, f),
            ConstraintViolation::WorkspaceMember(c) => fmt::Display::fmt(c, f),
            ConstraintViolation::WorkspaceInvitation(c) => fmt::Display::fmt(c, f),
            ConstraintViolation::Subscription(c) => fmt::Display::fmt(c, f),
            ConstraintViolation::WorkspaceActivity(c) => fmt::Display::fmt(c, f),
        }
    }
}

impl From<ConstraintViolation> for String {
    #[inline]
    fn from(val: ConstraintViolation) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ConstraintViolation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ConstraintViolation::new(&value).ok_or(value)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_name_round_trips() {
        let names = WorkspaceConstraints::iter()
            .map(ConstraintViolation::Workspace)
            .chain(UserConstraints::iter().map(ConstraintViolation::User))
            .chain(WorkspaceMemberConstraints::iter().map(ConstraintViolation::WorkspaceMember))
            .chain(
                WorkspaceInvitationConstraints::iter()
                    .map(ConstraintViolation::WorkspaceInvitation),
            )
            .chain(SubscriptionConstraints::iter().map(ConstraintViolation::Subscription))
            .chain(
                WorkspaceActivityConstraints::iter().map(ConstraintViolation::WorkspaceActivity),
            );

        for violation in names {
            let name = violation.to_string();
            assert!(name.starts_with(violation.table_name()), "{name}");
            assert_eq!(ConstraintViolation::new(&name), Some(violation));
        }
    }

    #[test]
    fn partial_indexes_are_recognised() {
        assert_eq!(
            ConstraintViolation::new("workspaces_one_default_per_owner"),
            Some(ConstraintViolation::Workspace(
                WorkspaceConstraints::OneDefaultPerOwner
            ))
        );
        assert_eq!(
            ConstraintViolation::new("workspace_invitations_one_pending_per_email")
                .map(|c| c.category()),
            Some(ConstraintCategory::Uniqueness)
        );
    }

    #[test]
    fn serializes_as_constraint_name() {
        let violation = ConstraintViolation::WorkspaceMember(WorkspaceMemberConstraints::PrimaryKey);
        let json = serde_json::to_string(&violation).unwrap();
        assert_eq!(json, "\"workspace_members_pkey\"");
    }
}

//! `workspace_invitations` constraint names.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Constraints on the `workspace_invitations` table.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum WorkspaceInvitationConstraints {
    #[strum(serialize = "workspace_invitations_token_unique")]
    TokenUnique,
    #[strum(serialize = "workspace_invitations_one_pending_per_email")]
    OnePendingPerEmail,
    #[strum(serialize = "workspace_invitations_token_length")]
    TokenLength,
    #[strum(serialize = "workspace_invitations_email_format")]
    EmailFormat,
    #[strum(serialize = "workspace_invitations_role_not_owner")]
    RoleNotOwner,
    #[strum(serialize = "workspace_invitations_accepted_consistency")]
    AcceptedConsistency,
    #[strum(serialize = "workspace_invitations_expires_after_created")]
    ExpiresAfterCreated,
}

impl WorkspaceInvitationConstraints {
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            WorkspaceInvitationConstraints::TokenUnique
            | WorkspaceInvitationConstraints::OnePendingPerEmail => ConstraintCategory::Uniqueness,
            WorkspaceInvitationConstraints::TokenLength
            | WorkspaceInvitationConstraints::EmailFormat => ConstraintCategory::Validation,
            WorkspaceInvitationConstraints::RoleNotOwner
            | WorkspaceInvitationConstraints::AcceptedConsistency => ConstraintCategory::BusinessLogic,
            WorkspaceInvitationConstraints::ExpiresAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<WorkspaceInvitationConstraints> for String {
    #[inline]
    fn from(val: WorkspaceInvitationConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for WorkspaceInvitationConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

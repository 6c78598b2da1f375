//! Workspace, membership, invitation and activity constraint violations.

use convoforms_postgres::types::{
    WorkspaceActivityConstraints, WorkspaceConstraints, WorkspaceInvitationConstraints,
    WorkspaceMemberConstraints,
};

use crate::handler::{Error, ErrorKind};

impl From<WorkspaceConstraints> for Error<'static> {
    fn from(c: WorkspaceConstraints) -> Self {
        let error = match c {
            WorkspaceConstraints::SlugUnique => {
                ErrorKind::Conflict.with_message("This workspace slug is already taken")
            }
            WorkspaceConstraints::OneDefaultPerOwner => {
                ErrorKind::Conflict.with_message("You already have a default workspace")
            }
            WorkspaceConstraints::NameLength => ErrorKind::BadRequest
                .with_message("Workspace name must be between 1 and 100 characters long"),
            WorkspaceConstraints::SlugFormat => ErrorKind::BadRequest.with_message(
                "Slug must be 3 to 48 lowercase letters, digits or hyphens",
            ),
            WorkspaceConstraints::DescriptionLength => {
                ErrorKind::BadRequest.with_message("Workspace description is too long")
            }
            WorkspaceConstraints::SettingsObject => {
                ErrorKind::BadRequest.with_message("Workspace settings must be a JSON object")
            }
        };

        error.with_resource("workspace")
    }
}

impl From<WorkspaceMemberConstraints> for Error<'static> {
    fn from(c: WorkspaceMemberConstraints) -> Self {
        let error = match c {
            WorkspaceMemberConstraints::PrimaryKey => {
                ErrorKind::Conflict.with_message("User is already a member of this workspace")
            }
        };

        error.with_resource("workspace_member")
    }
}

impl From<WorkspaceInvitationConstraints> for Error<'static> {
    fn from(c: WorkspaceInvitationConstraints) -> Self {
        let error = match c {
            WorkspaceInvitationConstraints::OnePendingPerEmail => ErrorKind::Conflict
                .with_message("An invitation is already pending for this email address"),
            WorkspaceInvitationConstraints::EmailFormat => {
                ErrorKind::BadRequest.with_message("Email address is invalid")
            }
            WorkspaceInvitationConstraints::RoleNotOwner => {
                ErrorKind::BadRequest.with_message("Invitations cannot grant the owner role")
            }
            WorkspaceInvitationConstraints::TokenUnique
            | WorkspaceInvitationConstraints::TokenLength
            | WorkspaceInvitationConstraints::AcceptedConsistency
            | WorkspaceInvitationConstraints::ExpiresAfterCreated => {
                ErrorKind::InternalServerError.into_error()
            }
        };

        error.with_resource("workspace_invitation")
    }
}

impl From<WorkspaceActivityConstraints> for Error<'static> {
    fn from(c: WorkspaceActivityConstraints) -> Self {
        match c {
            WorkspaceActivityConstraints::ActionFormat => {
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}

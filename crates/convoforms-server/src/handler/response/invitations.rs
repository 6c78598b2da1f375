//! Invitation response types.

use convoforms_access::{AcceptedInvitation as AcceptedModel, InvitationView};
use convoforms_postgres::model;
use convoforms_postgres::types::{EmailStatus, InvitationStatus, WorkspaceRole};
use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Workspace;

/// Invitation as seen by workspace admins. The token is never returned;
/// it only travels in the invitation email.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub invitation_id: Uuid,
    pub workspace_id: Uuid,
    pub email: String,
    pub role: WorkspaceRole,
    pub status: InvitationStatus,
    pub email_status: EmailStatus,
    pub invited_by: String,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl Invitation {
    pub fn from_model(invitation: model::WorkspaceInvitation) -> Self {
        Self {
            invitation_id: invitation.id,
            workspace_id: invitation.workspace_id,
            email: invitation.email,
            role: invitation.role,
            status: invitation.status,
            email_status: invitation.email_status,
            invited_by: invitation.invited_by,
            expires_at: invitation.expires_at.into(),
            created_at: invitation.created_at.into(),
        }
    }
}

/// What an invitee sees before accepting.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationPreview {
    pub invitation_id: Uuid,
    pub workspace_name: String,
    pub workspace_slug: String,
    pub inviter_name: Option<String>,
    pub email: String,
    pub role: WorkspaceRole,
    pub status: InvitationStatus,
    pub expires_at: Timestamp,
    /// Whether the invitation can no longer be accepted because of its age.
    pub expired: bool,
}

impl From<InvitationView> for InvitationPreview {
    fn from(view: InvitationView) -> Self {
        let expired = view.is_expired();
        let InvitationView {
            invitation,
            workspace_name,
            workspace_slug,
            inviter_name,
        } = view;

        Self {
            invitation_id: invitation.id,
            workspace_name,
            workspace_slug,
            inviter_name,
            email: invitation.email,
            role: invitation.role,
            status: invitation.status,
            expires_at: invitation.expires_at.into(),
            expired,
        }
    }
}

/// Result of accepting an invitation.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedInvitation {
    pub invitation_id: Uuid,
    pub workspace: Workspace,
    /// Role granted in the workspace.
    pub role: WorkspaceRole,
}

impl From<AcceptedModel> for AcceptedInvitation {
    fn from(accepted: AcceptedModel) -> Self {
        Self {
            invitation_id: accepted.invitation_id,
            workspace: Workspace::from_model(accepted.workspace),
            role: accepted.member.role,
        }
    }
}

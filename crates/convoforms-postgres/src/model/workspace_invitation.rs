//! Invitations to join a workspace.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::workspace_invitations;
use crate::types::{EmailStatus, InvitationStatus, WorkspaceRole};

/// Invitation addressed to an email. `token` is the only credential needed
/// to accept it.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = workspace_invitations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WorkspaceInvitation {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub email: String,
    /// Role granted on acceptance. Never `owner`.
    pub role: WorkspaceRole,
    pub token: String,
    pub status: InvitationStatus,
    pub expires_at: Timestamp,
    pub email_status: EmailStatus,
    pub email_sent_at: Option<Timestamp>,
    pub invited_by: String,
    pub accepted_by: Option<String>,
    pub accepted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = workspace_invitations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewWorkspaceInvitation {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub email: String,
    pub role: WorkspaceRole,
    pub token: String,
    pub expires_at: Timestamp,
    pub invited_by: String,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = workspace_invitations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateWorkspaceInvitation {
    pub status: Option<InvitationStatus>,
    pub email_status: Option<EmailStatus>,
    pub email_sent_at: Option<Option<Timestamp>>,
    pub accepted_by: Option<Option<String>>,
    pub accepted_at: Option<Option<Timestamp>>,
}

impl WorkspaceInvitation {
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    /// Returns whether `now` is past the expiry. The expiry instant itself
    /// is still valid.
    #[inline]
    pub fn is_expired_at(&self, now: jiff::Timestamp) -> bool {
        now > jiff::Timestamp::from(self.expires_at)
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(jiff::Timestamp::now())
    }
}

impl UpdateWorkspaceInvitation {
    /// Marks the invitation accepted by `user_id` at `at`.
    pub fn accepted(user_id: impl Into<String>, at: jiff::Timestamp) -> Self {
        Self {
            status: Some(InvitationStatus::Accepted),
            accepted_by: Some(Some(user_id.into())),
            accepted_at: Some(Some(at.into())),
            ..Default::default()
        }
    }

    pub fn expired() -> Self {
        Self {
            status: Some(InvitationStatus::Expired),
            ..Default::default()
        }
    }

    /// Records the outcome of sending the invitation email.
    pub fn email_delivery(status: EmailStatus, at: jiff::Timestamp) -> Self {
        Self {
            email_status: Some(status),
            email_sent_at: Some((status == EmailStatus::Sent).then(|| at.into())),
            ..Default::default()
        }
    }
}

//! Workspace invitation repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::model::{
    NewWorkspaceInvitation, NewWorkspaceMember, UpdateWorkspaceInvitation, WorkspaceInvitation,
    WorkspaceMember,
};
use crate::types::InvitationStatus;
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Outcome of [`WorkspaceInvitationRepository::accept_workspace_invitation`].
#[derive(Debug, Clone, PartialEq)]
pub enum InvitationAcceptance {
    /// The invitation flipped to `accepted` and the membership was inserted.
    Accepted(WorkspaceMember),
    /// The invitation was no longer pending. Nothing was written.
    NotPending,
    /// The workspace already holds `max_seats` members. Nothing was written.
    SeatLimitReached,
}

pub trait WorkspaceInvitationRepository {
    /// Inserts a pending invitation. A second pending invitation for the same
    /// workspace and email fails on `workspace_invitations_one_pending_per_email`.
    fn create_workspace_invitation(
        &mut self,
        invitation: NewWorkspaceInvitation,
    ) -> impl Future<Output = PgResult<WorkspaceInvitation>> + Send;

    fn find_invitation_by_token(
        &mut self,
        token: &str,
    ) -> impl Future<Output = PgResult<Option<WorkspaceInvitation>>> + Send;

    /// Returns the pending invitation for `email` in `workspace_id`, if any.
    fn find_pending_invitation(
        &mut self,
        workspace_id: Uuid,
        email: &str,
    ) -> impl Future<Output = PgResult<Option<WorkspaceInvitation>>> + Send;

    fn update_workspace_invitation(
        &mut self,
        invitation_id: Uuid,
        changes: UpdateWorkspaceInvitation,
    ) -> impl Future<Output = PgResult<WorkspaceInvitation>> + Send;

    /// Flips the invitation from `pending` to `accepted` and inserts the
    /// membership in one transaction.
    ///
    /// With `max_seats`, the workspace row is locked and its members are
    /// recounted first, so concurrent acceptances cannot overfill it. An
    /// existing membership fails on `workspace_members_pkey` and rolls the
    /// status change back.
    fn accept_workspace_invitation(
        &mut self,
        invitation_id: Uuid,
        member: NewWorkspaceMember,
        accepted_at: jiff::Timestamp,
        max_seats: Option<i64>,
    ) -> impl Future<Output = PgResult<InvitationAcceptance>> + Send;
}

impl WorkspaceInvitationRepository for PgConnection {
    async fn create_workspace_invitation(
        &mut self,
        invitation: NewWorkspaceInvitation,
    ) -> PgResult<WorkspaceInvitation> {
        use schema::workspace_invitations;

        diesel::insert_into(workspace_invitations::table)
            .values(&invitation)
            .returning(WorkspaceInvitation::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_invitation_by_token(&mut self, token: &str) -> PgResult<Option<WorkspaceInvitation>> {
        use schema::workspace_invitations;

        workspace_invitations::table
            .filter(workspace_invitations::token.eq(token))
            .select(WorkspaceInvitation::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_pending_invitation(
        &mut self,
        workspace_id: Uuid,
        email: &str,
    ) -> PgResult<Option<WorkspaceInvitation>> {
        use schema::workspace_invitations;

        workspace_invitations::table
            .filter(workspace_invitations::workspace_id.eq(workspace_id))
            .filter(workspace_invitations::email.eq(email))
            .filter(workspace_invitations::status.eq(InvitationStatus::Pending))
            .select(WorkspaceInvitation::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn update_workspace_invitation(
        &mut self,
        invitation_id: Uuid,
        changes: UpdateWorkspaceInvitation,
    ) -> PgResult<WorkspaceInvitation> {
        use schema::workspace_invitations;

        diesel::update(workspace_invitations::table.find(invitation_id))
            .set(&changes)
            .returning(WorkspaceInvitation::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn accept_workspace_invitation(
        &mut self,
        invitation_id: Uuid,
        member: NewWorkspaceMember,
        accepted_at: jiff::Timestamp,
        max_seats: Option<i64>,
    ) -> PgResult<InvitationAcceptance> {
        use schema::{workspace_invitations, workspace_members, workspaces};

        let outcome = self
            .transaction(|conn| {
                async move {
                    if let Some(limit) = max_seats {
                        // Concurrent acceptances into the same workspace queue here.
                        workspaces::table
                            .find(member.workspace_id)
                            .select(workspaces::id)
                            .for_update()
                            .first::<Uuid>(conn)
                            .await
                            .optional()?;

                        let members: i64 = workspace_members::table
                            .filter(workspace_members::workspace_id.eq(member.workspace_id))
                            .count()
                            .get_result(conn)
                            .await?;

                        if members >= limit {
                            return Ok(InvitationAcceptance::SeatLimitReached);
                        }
                    }

                    let changes = UpdateWorkspaceInvitation::accepted(&member.user_id, accepted_at);
                    let updated = diesel::update(workspace_invitations::table.find(invitation_id))
                        .filter(workspace_invitations::status.eq(InvitationStatus::Pending))
                        .set(&changes)
                        .execute(conn)
                        .await?;

                    if updated == 0 {
                        return Ok(InvitationAcceptance::NotPending);
                    }

                    let member = diesel::insert_into(workspace_members::table)
                        .values(&member)
                        .returning(WorkspaceMember::as_returning())
                        .get_result(conn)
                        .await?;

                    Ok::<_, PgError>(InvitationAcceptance::Accepted(member))
                }
                .scope_boxed()
            })
            .await?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            invitation_id = %invitation_id,
            max_seats,
            accepted = matches!(outcome, InvitationAcceptance::Accepted(_)),
            seat_limit_reached = matches!(outcome, InvitationAcceptance::SeatLimitReached),
            "invitation acceptance committed"
        );

        Ok(outcome)
    }
}

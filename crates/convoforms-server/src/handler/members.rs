//! Member listing, invitation and role management handlers.
//!
//! Every operation here is gated on the caller's role in the workspace.
//! Invitations additionally count against the seat quota of the workspace
//! owner's plan.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use convoforms_access as access;

use crate::extract::{AuthState, ClientContext, Json, Path, PgPool, Query, ValidateJson};
use crate::handler::Result;
use crate::handler::request::{
    InviteMember, MemberPathParams, PaginationRequest, UpdateMemberRole, WorkspacePathParams,
};
use crate::handler::response::{ErrorResponse, Invitation, Member, MembersPage};
use crate::service::{MailerService, ServiceState};

/// Tracing target for member operations.
const TRACING_TARGET: &str = "convoforms_server::handler::members";

/// Lists the members of a workspace with their profiles.
#[tracing::instrument(
    skip_all,
    fields(
        user_id = %auth_state.user_id(),
        workspace_id = %path_params.workspace_id,
    )
)]
async fn list_members(
    AuthState(auth_state): AuthState,
    Path(path_params): Path<WorkspacePathParams>,
    Query(pagination): Query<PaginationRequest>,
    PgPool(mut conn): PgPool,
) -> Result<(StatusCode, Json<MembersPage>)> {
    let pagination = pagination.into();
    let members = access::list_members(
        conn.connection(),
        auth_state.user_id(),
        path_params.workspace_id,
        pagination,
    )
    .await?;

    tracing::debug!(
        target: TRACING_TARGET,
        member_count = members.len(),
        "Members listed",
    );

    let page = MembersPage::from_models(members, pagination, Member::from_details);
    Ok((StatusCode::OK, Json(page)))
}

fn list_members_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List members")
        .description("Lists workspace members. Requires membership of the workspace.")
        .response::<200, Json<MembersPage>>()
        .response::<401, Json<ErrorResponse<'static>>>()
        .response::<403, Json<ErrorResponse<'static>>>()
}

/// Invites someone to the workspace by email.
#[tracing::instrument(
    skip_all,
    fields(
        user_id = %auth_state.user_id(),
        workspace_id = %path_params.workspace_id,
    )
)]
async fn invite_member(
    State(mailer): State<MailerService>,
    AuthState(auth_state): AuthState,
    Path(path_params): Path<WorkspacePathParams>,
    PgPool(mut conn): PgPool,
    ClientContext(ctx): ClientContext,
    ValidateJson(request): ValidateJson<InviteMember>,
) -> Result<(StatusCode, Json<Invitation>)> {
    tracing::debug!(
        target: TRACING_TARGET,
        role = ?request.role,
        "Creating invitation",
    );

    let invitation = access::create_invitation(
        conn.connection(),
        &*mailer,
        auth_state.user_id(),
        path_params.workspace_id,
        &request.email,
        request.role,
        &ctx,
    )
    .await?;

    tracing::info!(
        target: TRACING_TARGET,
        invitation_id = %invitation.id,
        "Invitation created",
    );

    Ok((StatusCode::CREATED, Json(Invitation::from_model(invitation))))
}

fn invite_member_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Invite member")
        .description(
            "Creates a pending invitation and emails its link. Requires the admin role or \
             higher. Invitations for the owner role are rejected with `400`. Fails with \
             `plan_limit_exceeded` when every seat of the owner's plan is taken by members. \
             Pending invitations do not hold a seat, so the limit is checked again on \
             acceptance.",
        )
        .response::<201, Json<Invitation>>()
        .response::<400, Json<ErrorResponse<'static>>>()
        .response::<401, Json<ErrorResponse<'static>>>()
        .response::<403, Json<ErrorResponse<'static>>>()
        .response::<409, Json<ErrorResponse<'static>>>()
}

/// Changes the role of a member.
#[tracing::instrument(
    skip_all,
    fields(
        user_id = %auth_state.user_id(),
        workspace_id = %path_params.workspace_id,
        target_user_id = %path_params.user_id,
    )
)]
async fn update_member_role(
    AuthState(auth_state): AuthState,
    Path(path_params): Path<MemberPathParams>,
    PgPool(mut conn): PgPool,
    ClientContext(ctx): ClientContext,
    ValidateJson(request): ValidateJson<UpdateMemberRole>,
) -> Result<(StatusCode, Json<Member>)> {
    let member = access::update_member_role(
        conn.connection(),
        auth_state.user_id(),
        path_params.workspace_id,
        &path_params.user_id,
        request.role,
        &ctx,
    )
    .await?;

    tracing::info!(
        target: TRACING_TARGET,
        role = ?member.role,
        "Member role updated",
    );

    Ok((StatusCode::OK, Json(Member::from_model(member))))
}

fn update_member_role_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Update member role")
        .description(
            "Changes a member's role. Requires the admin role or higher. Only owners may \
             grant or revoke the owner role, and no one can change their own role.",
        )
        .response::<200, Json<Member>>()
        .response::<400, Json<ErrorResponse<'static>>>()
        .response::<401, Json<ErrorResponse<'static>>>()
        .response::<403, Json<ErrorResponse<'static>>>()
        .response::<404, Json<ErrorResponse<'static>>>()
}

/// Removes a member from the workspace.
#[tracing::instrument(
    skip_all,
    fields(
        user_id = %auth_state.user_id(),
        workspace_id = %path_params.workspace_id,
        target_user_id = %path_params.user_id,
    )
)]
async fn remove_member(
    AuthState(auth_state): AuthState,
    Path(path_params): Path<MemberPathParams>,
    PgPool(mut conn): PgPool,
    ClientContext(ctx): ClientContext,
) -> Result<StatusCode> {
    let removed = access::remove_member(
        conn.connection(),
        auth_state.user_id(),
        path_params.workspace_id,
        &path_params.user_id,
        &ctx,
    )
    .await?;

    tracing::info!(
        target: TRACING_TARGET,
        role = ?removed.role,
        "Member removed",
    );

    Ok(StatusCode::NO_CONTENT)
}

fn remove_member_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Remove member")
        .description(
            "Removes a member. Requires the admin role or higher. Owners can only be \
             removed by owners, and no one can remove themselves.",
        )
        .response::<204, ()>()
        .response::<401, Json<ErrorResponse<'static>>>()
        .response::<403, Json<ErrorResponse<'static>>>()
        .response::<404, Json<ErrorResponse<'static>>>()
}

/// Returns a [`ApiRouter`] with all related routes.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/api/workspaces/by-id/{workspaceId}/members",
            get_with(list_members, list_members_docs),
        )
        .api_route(
            "/api/workspaces/by-id/{workspaceId}/invite",
            post_with(invite_member, invite_member_docs),
        )
        .api_route(
            "/api/workspaces/by-id/{workspaceId}/members/{userId}",
            put_with(update_member_role, update_member_role_docs)
                .delete_with(remove_member, remove_member_docs),
        )
        .with_path_items(|item| item.tag("Members"))
}

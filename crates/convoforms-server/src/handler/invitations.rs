//! Invitation preview and acceptance handlers.
//!
//! The preview is public so the invitee can see what they are joining before
//! signing in. Accepting requires a bearer token but no membership, the
//! invitation itself grants access.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use convoforms_access as access;
use validator::Validate;

use crate::extract::{AuthState, ClientContext, Json, PgPool, Query, ValidateJson};
use crate::handler::Result;
use crate::handler::request::{AcceptInvitation, InvitationTokenQuery};
use crate::handler::response::{AcceptedInvitation, ErrorResponse, InvitationPreview};
use crate::service::{MailerService, ServiceState};

/// Tracing target for invitation operations.
const TRACING_TARGET: &str = "convoforms_server::handler::invitations";

/// Looks up an invitation by its token.
#[tracing::instrument(skip_all)]
async fn preview_invitation(
    Query(query): Query<InvitationTokenQuery>,
    PgPool(mut conn): PgPool,
    ClientContext(ctx): ClientContext,
) -> Result<(StatusCode, Json<InvitationPreview>)> {
    query.validate()?;

    let view = access::validate_invitation(conn.connection(), &query.token, &ctx).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        invitation_id = %view.invitation.id,
        expired = view.is_expired(),
        "Invitation previewed",
    );

    Ok((StatusCode::OK, Json(view.into())))
}

fn preview_invitation_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Preview invitation")
        .description(
            "Returns the workspace, inviter and role of an invitation. Pending invitations \
             past their expiry are reported with `expired` set. Does not require a token.",
        )
        .response::<200, Json<InvitationPreview>>()
        .response::<400, Json<ErrorResponse<'static>>>()
        .response::<404, Json<ErrorResponse<'static>>>()
}

/// Accepts an invitation as the signed-in user.
#[tracing::instrument(skip_all, fields(user_id = %auth_state.user_id()))]
async fn accept_invitation(
    State(mailer): State<MailerService>,
    AuthState(auth_state): AuthState,
    PgPool(mut conn): PgPool,
    ClientContext(ctx): ClientContext,
    ValidateJson(request): ValidateJson<AcceptInvitation>,
) -> Result<(StatusCode, Json<AcceptedInvitation>)> {
    let accepted = access::accept_invitation(
        conn.connection(),
        &*mailer,
        &request.token,
        auth_state.user_id(),
        &ctx,
    )
    .await?;

    tracing::info!(
        target: TRACING_TARGET,
        invitation_id = %accepted.invitation_id,
        workspace_id = %accepted.workspace.id,
        "Invitation accepted",
    );

    Ok((StatusCode::OK, Json(accepted.into())))
}

fn accept_invitation_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Accept invitation")
        .description(
            "Joins the workspace with the invited role. The caller's email must match the \
             invitation. Expired invitations answer `gone`, already used ones `conflict`. \
             Fails with `plan_limit_exceeded` when the workspace has no free seat left.",
        )
        .response::<200, Json<AcceptedInvitation>>()
        .response::<400, Json<ErrorResponse<'static>>>()
        .response::<401, Json<ErrorResponse<'static>>>()
        .response::<403, Json<ErrorResponse<'static>>>()
        .response::<404, Json<ErrorResponse<'static>>>()
        .response::<409, Json<ErrorResponse<'static>>>()
        .response::<410, Json<ErrorResponse<'static>>>()
}

/// Returns a [`ApiRouter`] with all related routes.
///
/// Both methods share one path, so the router is mounted with the public
/// routes. Accepting still requires a bearer token through [`AuthState`].
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/api/invitations",
            get_with(preview_invitation, preview_invitation_docs)
                .post_with(accept_invitation, accept_invitation_docs),
        )
        .with_path_items(|item| item.tag("Invitations"))
}

#[cfg(test)]
mod tests {
    use crate::handler::test::create_test_server;

    #[tokio::test]
    async fn preview_requires_token_parameter() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let response = server.get("/api/invitations").await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Missing required query parameter");
        Ok(())
    }

    #[tokio::test]
    async fn accept_requires_a_token() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let response = server
            .post("/api/invitations")
            .json(&serde_json::json!({ "token": "abc" }))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }
}

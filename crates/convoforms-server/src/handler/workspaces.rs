//! Workspace creation, settings and plan usage handlers.
//!
//! Creating a workspace counts against the caller's plan. The creator
//! becomes its owner and the new workspace appears in their usage at once.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::http::StatusCode;
use convoforms_access as access;

use crate::extract::{AuthState, ClientContext, Json, Path, PgPool, ValidateJson};
use crate::handler::Result;
use crate::handler::request::{CreateWorkspace, UpdateWorkspace, WorkspacePathParams};
use crate::handler::response::{ErrorResponse, MemberUsage, Workspace, WorkspaceUsage};
use crate::service::ServiceState;

/// Tracing target for workspace operations.
const TRACING_TARGET: &str = "convoforms_server::handler::workspaces";

/// Creates a workspace owned by the caller.
#[tracing::instrument(skip_all, fields(user_id = %auth_state.user_id()))]
async fn create_workspace(
    AuthState(auth_state): AuthState,
    PgPool(mut conn): PgPool,
    ClientContext(ctx): ClientContext,
    ValidateJson(request): ValidateJson<CreateWorkspace>,
) -> Result<(StatusCode, Json<Workspace>)> {
    tracing::debug!(target: TRACING_TARGET, "Creating workspace");

    let (workspace, _owner) = access::create_workspace(
        conn.connection(),
        auth_state.user_id(),
        request.into_input(),
        &ctx,
    )
    .await?;

    tracing::info!(
        target: TRACING_TARGET,
        workspace_id = %workspace.id,
        slug = %workspace.slug,
        "Workspace created",
    );

    Ok((StatusCode::CREATED, Json(Workspace::from_model(workspace))))
}

fn create_workspace_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Create workspace")
        .description(
            "Creates a team workspace owned by the caller. A slug is derived from the name \
             when none is given. Fails with `plan_limit_exceeded` when the caller's plan \
             allows no more workspaces.",
        )
        .response::<201, Json<Workspace>>()
        .response::<400, Json<ErrorResponse<'static>>>()
        .response::<401, Json<ErrorResponse<'static>>>()
        .response::<403, Json<ErrorResponse<'static>>>()
        .response::<409, Json<ErrorResponse<'static>>>()
}

/// Updates the name, description or settings of a workspace.
#[tracing::instrument(
    skip_all,
    fields(
        user_id = %auth_state.user_id(),
        workspace_id = %path_params.workspace_id,
    )
)]
async fn update_workspace(
    AuthState(auth_state): AuthState,
    Path(path_params): Path<WorkspacePathParams>,
    PgPool(mut conn): PgPool,
    ClientContext(ctx): ClientContext,
    ValidateJson(request): ValidateJson<UpdateWorkspace>,
) -> Result<(StatusCode, Json<Workspace>)> {
    let workspace = access::update_workspace(
        conn.connection(),
        auth_state.user_id(),
        path_params.workspace_id,
        request.into_details(),
        &ctx,
    )
    .await?;

    tracing::info!(target: TRACING_TARGET, "Workspace updated");

    Ok((StatusCode::OK, Json(Workspace::from_model(workspace))))
}

fn update_workspace_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Update workspace")
        .description(
            "Updates workspace details. Requires the admin role or higher. \
             An empty description clears it.",
        )
        .response::<200, Json<Workspace>>()
        .response::<400, Json<ErrorResponse<'static>>>()
        .response::<401, Json<ErrorResponse<'static>>>()
        .response::<403, Json<ErrorResponse<'static>>>()
        .response::<404, Json<ErrorResponse<'static>>>()
}

/// Returns how many workspaces the caller owns against their plan.
#[tracing::instrument(skip_all, fields(user_id = %auth_state.user_id()))]
async fn read_workspace_usage(
    AuthState(auth_state): AuthState,
    PgPool(mut conn): PgPool,
) -> Result<(StatusCode, Json<WorkspaceUsage>)> {
    let usage = access::workspace_usage(conn.connection(), auth_state.user_id()).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        plan = ?usage.plan,
        used = usage.workspaces.used,
        "Workspace usage read",
    );

    Ok((StatusCode::OK, Json(usage.into())))
}

fn read_workspace_usage_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get workspace usage")
        .description("Returns the caller's plan and how many of its workspaces are in use.")
        .response::<200, Json<WorkspaceUsage>>()
        .response::<401, Json<ErrorResponse<'static>>>()
}

/// Returns the seat usage of a workspace.
#[tracing::instrument(
    skip_all,
    fields(
        user_id = %auth_state.user_id(),
        workspace_id = %path_params.workspace_id,
    )
)]
async fn read_member_usage(
    AuthState(auth_state): AuthState,
    Path(path_params): Path<WorkspacePathParams>,
    PgPool(mut conn): PgPool,
) -> Result<(StatusCode, Json<MemberUsage>)> {
    let usage = access::workspace_member_usage(
        conn.connection(),
        path_params.workspace_id,
        auth_state.user_id(),
    )
    .await?;

    tracing::debug!(target: TRACING_TARGET, "Member usage read");

    Ok((StatusCode::OK, Json(usage.into())))
}

fn read_member_usage_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get member usage")
        .description(
            "Returns how many seats of the workspace owner's plan are taken by members \
             and pending invitations. Requires membership of the workspace.",
        )
        .response::<200, Json<MemberUsage>>()
        .response::<401, Json<ErrorResponse<'static>>>()
        .response::<403, Json<ErrorResponse<'static>>>()
        .response::<404, Json<ErrorResponse<'static>>>()
}

/// Returns a [`ApiRouter`] with all related routes.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/api/workspaces",
            post_with(create_workspace, create_workspace_docs),
        )
        .api_route(
            "/api/workspaces/usage",
            get_with(read_workspace_usage, read_workspace_usage_docs),
        )
        .api_route(
            "/api/workspaces/by-id/{workspaceId}",
            patch_with(update_workspace, update_workspace_docs),
        )
        .api_route(
            "/api/workspaces/by-id/{workspaceId}/usage",
            get_with(read_member_usage, read_member_usage_docs),
        )
        .with_path_items(|item| item.tag("Workspaces"))
}

#[cfg(test)]
mod tests {
    use crate::handler::test::{create_test_server, create_test_token};

    #[tokio::test]
    async fn update_rejects_non_uuid_path() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let token = create_test_token("user_1")?;

        let response = server
            .patch("/api/workspaces/by-id/not-a-uuid")
            .authorization_bearer(token)
            .json(&serde_json::json!({ "name": "Renamed" }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["name"], "bad_request");
        Ok(())
    }

    #[tokio::test]
    async fn usage_requires_a_token() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let workspace_id = uuid::Uuid::now_v7();

        let response = server
            .get(&format!("/api/workspaces/by-id/{workspace_id}/usage"))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }
}

//! Workspace activity log handlers.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::http::StatusCode;
use convoforms_access as access;

use crate::extract::{AuthState, Json, Path, PgPool, Query};
use crate::handler::Result;
use crate::handler::request::{PaginationRequest, WorkspacePathParams};
use crate::handler::response::{ActivitiesPage, Activity, ErrorResponse};
use crate::service::ServiceState;

/// Tracing target for activity operations.
const TRACING_TARGET: &str = "convoforms_server::handler::activities";

/// Lists the most recent activity of a workspace.
#[tracing::instrument(
    skip_all,
    fields(
        user_id = %auth_state.user_id(),
        workspace_id = %path_params.workspace_id,
    )
)]
async fn list_activities(
    AuthState(auth_state): AuthState,
    Path(path_params): Path<WorkspacePathParams>,
    Query(pagination): Query<PaginationRequest>,
    PgPool(mut conn): PgPool,
) -> Result<(StatusCode, Json<ActivitiesPage>)> {
    let pagination = pagination.into();
    let activities = access::list_workspace_activity(
        conn.connection(),
        auth_state.user_id(),
        path_params.workspace_id,
        pagination,
    )
    .await?;

    tracing::debug!(
        target: TRACING_TARGET,
        activity_count = activities.len(),
        "Activities listed",
    );

    let page = ActivitiesPage::from_models(activities, pagination, Activity::from_model);
    Ok((StatusCode::OK, Json(page)))
}

fn list_activities_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List activity")
        .description(
            "Returns the workspace audit log, newest first. Requires membership of the workspace.",
        )
        .response::<200, Json<ActivitiesPage>>()
        .response::<401, Json<ErrorResponse<'static>>>()
        .response::<403, Json<ErrorResponse<'static>>>()
}

/// Returns a [`ApiRouter`] with all related routes.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/api/workspaces/by-id/{workspaceId}/activity",
            get_with(list_activities, list_activities_docs),
        )
        .with_path_items(|item| item.tag("Activity"))
}

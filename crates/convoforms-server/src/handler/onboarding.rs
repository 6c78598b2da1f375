//! First sign-in handler.
//!
//! Onboarding is idempotent: a returning user gets their existing profile,
//! plan and default workspace back with `200 OK` instead of `201 Created`.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::http::StatusCode;
use convoforms_access as access;

use crate::extract::{AuthState, ClientContext, Json, PgPool, ValidateJson};
use crate::handler::Result;
use crate::handler::request::OnboardUser;
use crate::handler::response::{ErrorResponse, Onboarding};
use crate::service::ServiceState;

/// Tracing target for onboarding.
const TRACING_TARGET: &str = "convoforms_server::handler::onboarding";

/// Creates the user, their free subscription and their personal workspace.
#[tracing::instrument(skip_all, fields(user_id = %auth_state.user_id()))]
async fn onboard_user(
    AuthState(auth_state): AuthState,
    PgPool(mut conn): PgPool,
    ClientContext(ctx): ClientContext,
    ValidateJson(request): ValidateJson<OnboardUser>,
) -> Result<(StatusCode, Json<Onboarding>)> {
    let identity = request.into_identity(&auth_state)?;
    let onboarding = access::onboard_user(conn.connection(), identity, &ctx).await?;

    let status = if onboarding.already_onboarded {
        tracing::debug!(target: TRACING_TARGET, "User already onboarded");
        StatusCode::OK
    } else {
        tracing::info!(
            target: TRACING_TARGET,
            workspace_id = %onboarding.workspace.id,
            "User onboarded",
        );
        StatusCode::CREATED
    };

    Ok((status, Json(onboarding.into())))
}

fn onboard_user_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Onboard user")
        .description(
            "Registers the signed-in user with a free plan and a personal workspace. \
             Profile fields missing from the body are taken from the token claims. \
             Calling it again returns the existing records.",
        )
        .response::<201, Json<Onboarding>>()
        .response::<200, Json<Onboarding>>()
        .response::<400, Json<ErrorResponse<'static>>>()
        .response::<401, Json<ErrorResponse<'static>>>()
}

/// Returns a [`ApiRouter`] with all related routes.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/api/onboarding", post_with(onboard_user, onboard_user_docs))
        .with_path_items(|item| item.tag("Onboarding"))
}

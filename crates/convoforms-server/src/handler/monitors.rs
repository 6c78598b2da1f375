//! Health check handler.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use convoforms_postgres::PgClient;

use crate::extract::Json;
use crate::handler::Result;
use crate::handler::response::Health;
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "convoforms_server::handler::monitors";

/// Reports the service version and connection pool figures.
///
/// Only reads pool counters, so it answers even when the database is down.
#[tracing::instrument(skip_all)]
async fn health_status(State(pg_client): State<PgClient>) -> Result<(StatusCode, Json<Health>)> {
    let pool_status = pg_client.pool_status();
    let status = if pool_status.is_under_pressure() {
        "degraded"
    } else {
        "ok"
    };

    tracing::trace!(
        target: TRACING_TARGET,
        status,
        available = pool_status.available,
        waiting = pool_status.waiting,
        "Health status checked",
    );

    let response = Health {
        status: status.to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        database: pool_status.into(),
    };

    Ok((StatusCode::OK, Json(response)))
}

fn health_status_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Health check")
        .description("Returns `ok`, or `degraded` when the connection pool is under pressure.")
        .response::<200, Json<Health>>()
}

/// Returns a [`ApiRouter`] with all related routes.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/health", get_with(health_status, health_status_docs))
        .with_path_items(|item| item.tag("Monitors"))
}

#[cfg(test)]
mod tests {
    use crate::handler::test::create_test_server;

    #[tokio::test]
    async fn health_without_database() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let response = server.get("/health").await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["database"]["waiting"], 0);
        Ok(())
    }
}

//! All `aide::`[`ApiRouter`]s with related `axum::`[`Handler`]s.
//!
//! Private routes sit behind [`require_authentication`], so an invalid or
//! missing bearer token is rejected before any handler runs. The health check
//! and the invitation preview are public.
//!
//! [`ApiRouter`]: aide::axum::ApiRouter
//! [`Handler`]: axum::handler::Handler
//! [`require_authentication`]: crate::middleware::require_authentication

mod activities;
pub mod error;
mod invitations;
mod members;
mod monitors;
mod onboarding;
pub mod request;
pub mod response;
mod workspaces;

use aide::axum::ApiRouter;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::middleware::require_authentication;
use crate::service::ServiceState;

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound
        .with_message("The requested route does not exist")
        .into_response()
}

/// Returns an [`ApiRouter`] with all routes that require a bearer token.
fn private_routes() -> ApiRouter<ServiceState> {
    ApiRouter::new()
        .merge(onboarding::routes())
        .merge(workspaces::routes())
        .merge(members::routes())
        .merge(activities::routes())
}

/// Returns an [`ApiRouter`] with all routes open to anonymous callers.
fn public_routes() -> ApiRouter<ServiceState> {
    ApiRouter::new()
        .merge(monitors::routes())
        .merge(invitations::routes())
}

/// Returns an [`ApiRouter`] with every route of the service.
pub fn routes(state: ServiceState) -> ApiRouter<ServiceState> {
    let require_authentication = from_fn_with_state(state, require_authentication);

    ApiRouter::new()
        .merge(private_routes().route_layer(require_authentication))
        .merge(public_routes())
        .fallback(fallback)
}

#[cfg(test)]
pub(crate) mod test {
    use axum::Router;
    use axum_test::TestServer;
    use convoforms_postgres::{PgClient, PgConfig};
    use jsonwebtoken::{EncodingKey, Header, encode};

    use crate::handler::routes;
    use crate::middleware::{OpenApiConfig, RouterOpenApiExt};
    use crate::service::{IdentityKeys, MailerService, ServiceState};

    /// Shared secret of the test identity provider.
    pub const TEST_SECRET: &[u8] = b"test-identity-provider-secret-000";

    /// Returns state whose database is unreachable.
    ///
    /// The pool connects lazily, so routes rejected before touching the
    /// database can be exercised without Postgres.
    pub fn create_test_state() -> anyhow::Result<ServiceState> {
        let postgres = PgClient::new(PgConfig::new("postgres://localhost:1/none"))?;
        let identity_keys = IdentityKeys::from_secret(TEST_SECRET);
        Ok(ServiceState::new(postgres, identity_keys, MailerService::tracing()))
    }

    /// Returns a bearer token for `sub` signed with [`TEST_SECRET`].
    pub fn create_test_token(sub: &str) -> anyhow::Result<String> {
        let exp = jiff::Timestamp::now().as_second() + 3600;
        let claims = serde_json::json!({ "sub": sub, "email": "alice@example.com", "exp": exp });
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(TEST_SECRET))?;
        Ok(token)
    }

    /// Returns a new [`TestServer`] with every route and the OpenAPI document.
    pub fn create_test_server() -> anyhow::Result<TestServer> {
        let state = create_test_state()?;
        let app: Router = routes(state.clone())
            .with_open_api(OpenApiConfig::default())
            .with_state(state);
        let server = TestServer::new(app)?;
        Ok(server)
    }

    #[tokio::test]
    async fn unknown_routes_return_json_404() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let response = server.get("/api/does-not-exist").await;

        response.assert_status_not_found();
        let body: serde_json::Value = response.json();
        assert_eq!(body["name"], "not_found");
        Ok(())
    }

    #[tokio::test]
    async fn private_routes_require_a_token() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let response = server.get("/api/workspaces/usage").await;

        response.assert_status_unauthorized();
        let body: serde_json::Value = response.json();
        assert_eq!(body["name"], "missing_auth_token");
        Ok(())
    }

    #[tokio::test]
    async fn private_routes_reject_foreign_tokens() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let claims = serde_json::json!({
            "sub": "user_1",
            "exp": jiff::Timestamp::now().as_second() + 3600,
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"some-other-identity-provider-key"),
        )?;

        let response = server
            .post("/api/workspaces")
            .authorization_bearer(token)
            .json(&serde_json::json!({ "name": "Acme" }))
            .await;

        response.assert_status_unauthorized();
        let body: serde_json::Value = response.json();
        assert_eq!(body["name"], "unauthorized");
        Ok(())
    }

    #[tokio::test]
    async fn malformed_authorization_header() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let response = server
            .get("/api/workspaces/usage")
            .authorization("Basic dXNlcjpwYXNz")
            .await;

        response.assert_status_unauthorized();
        let body: serde_json::Value = response.json();
        assert_eq!(body["name"], "malformed_auth_token");
        Ok(())
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let response = server.get("/api/openapi.json").await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        let paths = &body["paths"];
        assert!(paths.get("/api/workspaces").is_some());
        assert!(paths.get("/api/invitations").is_some());
        assert!(paths.get("/health").is_some());
        Ok(())
    }
}

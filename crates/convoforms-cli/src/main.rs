#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use convoforms_server::handler::routes;
use convoforms_server::middleware::{
    RouterClientIpExt, RouterObservabilityExt, RouterOpenApiExt, RouterRecoveryExt,
    RouterSecurityExt, SecurityHeadersConfig,
};
use convoforms_server::service::{MailerService, ServiceState};

use crate::config::{Cli, MiddlewareConfig};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "convoforms_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "convoforms_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "convoforms_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    cli.init_tracing();

    cli.log();
    cli.validate()?;

    let state = ServiceState::from_config(&cli.service, MailerService::tracing())
        .await
        .context("failed to create service state")?;
    let router = create_router(state, &cli.middleware);

    server::serve(router, cli.server).await?;
    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) - catches panics and enforces timeouts
/// 2. Observability - request IDs and tracing spans
/// 3. Security - body limit, CORS and security headers
/// 4. Client address lookup
/// 5. Routes (innermost) - actual request handlers
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes(state.clone())
        .with_open_api(middleware.openapi.clone())
        .with_state(state)
        .with_client_ip(&middleware.client_ip)
        .with_security(&middleware.cors, &SecurityHeadersConfig::default())
        .with_observability()
        .with_recovery(&middleware.recovery)
}

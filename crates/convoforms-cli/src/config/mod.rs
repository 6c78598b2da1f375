//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig          # Host, port, shutdown
//! ├── middleware: MiddlewareConfig  # CORS, OpenAPI, recovery, client address
//! └── service: ServiceConfig        # Postgres, identity provider keys
//! ```
//!
//! Every option can be given as a flag or an environment variable.

mod middleware;
mod server;

use std::process;

use anyhow::Context;
use clap::Parser;
use convoforms_server::service::ServiceConfig;
pub use middleware::MiddlewareConfig;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "convoforms")]
#[command(about = "ConvoForms workspace and access control server")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration.
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Postgres and identity provider configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,

    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    #[serde(default)]
    pub log_json: bool,
}

impl Cli {
    /// Loads `.env` (if enabled) and parses arguments.
    ///
    /// The file is read first so clap's `env` lookups see its values.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with `RUST_LOG` filtering, defaulting to `info`.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(filter);

        if self.log_json {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        } else {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.service
            .postgres_config
            .validate()
            .context("invalid postgres configuration")?;
        self.service
            .identity_config
            .validate()
            .context("invalid identity configuration")?;
        Ok(())
    }

    /// Logs configuration without secrets.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            dotenv = cfg!(feature = "dotenv"),
            log_json = self.log_json,
            "Build information"
        );

        self.server.log();
        self.middleware.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            postgres_url = %self.service.postgres_config.database_url_masked(),
            postgres_max_connections = self.service.postgres_config.postgres_max_connections,
            postgres_connection_timeout_secs = ?self.service.postgres_config.postgres_connection_timeout_secs,
            postgres_idle_timeout_secs = ?self.service.postgres_config.postgres_idle_timeout_secs,
            "Database configuration"
        );

        let identity = &self.service.identity_config;
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            shared_secret = identity.jwt_secret.is_some(),
            public_pem = ?identity.public_pem_filepath,
            issuer = ?identity.issuer,
            audience = ?identity.audience,
            leeway_secs = identity.leeway_secs,
            "Identity configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "convoforms",
            "--port",
            "8080",
            "--postgres-url",
            "postgresql://localhost/convoforms",
            "--identity-jwt-secret",
            "0123456789abcdef0123456789abcdef",
            "--cors-origins",
            "https://app.convoforms.com,https://convoforms.com",
            "--request-timeout",
            "10",
        ])?;

        assert_eq!(cli.server.port, 8080);
        assert_eq!(cli.middleware.cors.allowed_origins.len(), 2);
        assert_eq!(cli.middleware.recovery.request_timeout, 10);
        assert_eq!(cli.middleware.openapi.open_api_json, "/api/openapi.json");
        assert!(!cli.log_json);
        cli.validate()?;
        Ok(())
    }

    #[test]
    fn rejects_missing_identity_keys() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "convoforms",
            "--postgres-url",
            "postgresql://localhost/convoforms",
        ])?;

        assert!(cli.validate().is_err());
        Ok(())
    }
}

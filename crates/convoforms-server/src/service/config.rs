#[cfg(feature = "config")]
use clap::Args;
use convoforms_postgres::{PgClient, PgClientMigrationExt, PgConfig};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::service::{Error, IdentityConfig, IdentityKeys, Result};

const TRACING_TARGET: &str = "convoforms_server::service::config";

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct ServiceConfig {
    /// Postgres connection and pool settings.
    #[cfg_attr(feature = "config", command(flatten))]
    pub postgres_config: PgConfig,

    /// Bearer token verification settings.
    #[cfg_attr(feature = "config", command(flatten))]
    pub identity_config: IdentityConfig,
}

impl ServiceConfig {
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Builds the pool and applies pending migrations.
    pub async fn connect_postgres(&self) -> Result<PgClient> {
        let pg_client = PgClient::new_with_test(self.postgres_config.clone())
            .await
            .map_err(|e| Error::external("postgres", "Failed to connect to the database").with_source(e))?;

        let migrations = pg_client.run_pending_migrations().await.map_err(|e| {
            Error::internal("postgres", "Failed to apply database migrations").with_source(e)
        })?;

        tracing::info!(
            target: TRACING_TARGET,
            migrations = ?migrations,
            database_url = %self.postgres_config.database_url_masked(),
            "postgres ready"
        );

        Ok(pg_client)
    }

    pub async fn load_identity_keys(&self) -> Result<IdentityKeys> {
        IdentityKeys::from_config(&self.identity_config).await
    }
}

impl ServiceConfigBuilder {
    fn validate(builder: &ServiceConfigBuilder) -> Result<(), String> {
        if let Some(postgres_config) = &builder.postgres_config {
            postgres_config.validate().map_err(|e| e.to_string())?;
        }

        if let Some(identity_config) = &builder.identity_config {
            identity_config.validate().map_err(|e| e.to_string())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_validates_sections() {
        let config = ServiceConfig::builder()
            .with_postgres_config(PgConfig::new("postgresql://localhost/convoforms"))
            .with_identity_config(IdentityConfig::with_secret(
                "an-hs256-secret-that-is-long-enough",
            ))
            .build();
        assert!(config.is_ok());

        let config = ServiceConfig::builder()
            .with_postgres_config(PgConfig::new("postgresql://localhost/convoforms"))
            .with_identity_config(IdentityConfig::default())
            .build();
        assert!(config.is_err());
    }

    #[test]
    fn builder_requires_every_section() {
        let config = ServiceConfig::builder()
            .with_postgres_config(PgConfig::new("postgresql://localhost/convoforms"))
            .build();
        assert!(config.is_err());
    }
}

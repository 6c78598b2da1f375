//! Application state and dependency injection.

mod config;
mod identity;
mod mailer;
mod user_agent;

use convoforms_postgres::PgClient;

pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::service::identity::{IdentityConfig, IdentityKeys};
pub use crate::service::mailer::MailerService;
pub use crate::service::user_agent::UserAgentParser;
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    // External services:
    pub postgres: PgClient,
    pub mailer: MailerService,

    // Internal services:
    pub identity_keys: IdentityKeys,
    pub user_agent_parser: UserAgentParser,
}

impl ServiceState {
    /// Connects to Postgres, applies migrations and loads identity keys.
    pub async fn from_config(service_config: &ServiceConfig, mailer: MailerService) -> Result<Self> {
        Ok(Self::new(
            service_config.connect_postgres().await?,
            service_config.load_identity_keys().await?,
            mailer,
        ))
    }

    /// Assembles state from already constructed services.
    pub fn new(postgres: PgClient, identity_keys: IdentityKeys, mailer: MailerService) -> Self {
        Self {
            postgres,
            mailer,
            identity_keys,
            user_agent_parser: UserAgentParser::new(),
        }
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

// External services:
impl_di!(postgres: PgClient);
impl_di!(mailer: MailerService);

// Internal services:
impl_di!(identity_keys: IdentityKeys);
impl_di!(user_agent_parser: UserAgentParser);

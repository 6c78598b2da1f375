//! Middleware for `axum::Router` and HTTP request processing.
//!
//! Layers are applied through extension traits, innermost first:
//!
//! ```rust,ignore
//! let app: Router = routes(state.clone())
//!     .with_open_api(OpenApiConfig::default())
//!     .with_state(state)
//!     .with_client_ip(&ClientIpConfig::default())
//!     .with_security(&CorsConfig::default(), &SecurityHeadersConfig::default())
//!     .with_observability()
//!     .with_recovery(&RecoveryConfig::default());
//! ```

mod authentication;
mod client_ip;
mod observability;
mod open_api;
mod recovery;
mod security;

pub use authentication::require_authentication;
pub use client_ip::{ClientIpConfig, ClientIpHeader, RouterClientIpExt};
pub use observability::RouterObservabilityExt;
pub use open_api::{OpenApiConfig, RouterOpenApiExt};
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{
    CorsConfig, DEFAULT_MAX_BODY_SIZE, FrameOptions, ReferrerPolicy, RouterSecurityExt,
    SecurityHeadersConfig,
};

//! Bearer token authentication.
//!
//! Tokens are issued by the external identity provider. The server only
//! verifies them with [`IdentityKeys`] and trusts the `sub` claim as the
//! user id.
//!
//! [`IdentityKeys`]: crate::service::IdentityKeys

mod auth_claims;
mod auth_header;
mod auth_state;

pub use auth_claims::AuthClaims;
pub use auth_header::AuthHeader;
pub use auth_state::AuthState;

/// Tracing target for token verification.
pub const TRACING_TARGET_AUTHENTICATION: &str = "convoforms_server::authentication";

//! Request extractors with uniform error responses.
//!
//! - [`AuthState`] verifies the bearer token and exposes its [`AuthClaims`].
//! - [`PgPool`] checks a connection out of the pool.
//! - [`ClientContext`] captures the client address and user agent for the
//!   activity log.
//! - [`Json`], [`ValidateJson`], [`Path`] and [`Query`] wrap the axum
//!   extractors and turn their rejections into [`Error`] responses.
//!
//! [`Error`]: crate::handler::Error

pub mod auth;
mod client_context;
mod pg_connection;
pub mod reject;

pub use crate::extract::auth::{AuthClaims, AuthHeader, AuthState};
pub use crate::extract::client_context::ClientContext;
pub use crate::extract::pg_connection::PgPool;
pub use crate::extract::reject::{Json, Path, Query, ValidateJson};

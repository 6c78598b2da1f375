//! [`Error`], [`ErrorKind`] and [`Result`].

mod access_error;
mod http_error;
mod pg_account;
mod pg_error;
mod pg_workspace;

pub use http_error::{Error, ErrorKind, Result};

//! Database errors to HTTP errors.
//!
//! Constraint violations become client errors through the per-table
//! conversions in the sibling modules. Everything else is logged and hidden
//! behind a 500, or a 503 when retrying may help.

use convoforms_postgres::PgError;
use convoforms_postgres::types::ConstraintViolation;

use crate::handler::{Error, ErrorKind};

const TRACING_TARGET: &str = "convoforms_server::postgres_constraints";

impl From<ConstraintViolation> for Error<'static> {
    fn from(constraint: ConstraintViolation) -> Self {
        match constraint {
            ConstraintViolation::User(c) => c.into(),
            ConstraintViolation::Subscription(c) => c.into(),
            ConstraintViolation::Workspace(c) => c.into(),
            ConstraintViolation::WorkspaceMember(c) => c.into(),
            ConstraintViolation::WorkspaceInvitation(c) => c.into(),
            ConstraintViolation::WorkspaceActivity(c) => c.into(),
        }
    }
}

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        if let Some(constraint) = error.constraint_violation() {
            tracing::warn!(
                target: TRACING_TARGET,
                constraint = ?constraint,
                error = %error,
                "query rejected by constraint"
            );
            return constraint.into();
        }

        let transient = error.is_transient();
        match &error {
            PgError::Timeout(timeout) => {
                tracing::error!(target: TRACING_TARGET, timeout = ?timeout, "database timeout");
            }
            PgError::Connection(connection_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %connection_error,
                    "database connection error"
                );
            }
            other => {
                tracing::error!(target: TRACING_TARGET, error = %other, "database error");
            }
        }

        if transient {
            ErrorKind::ServiceUnavailable.into_error()
        } else {
            ErrorKind::InternalServerError.into_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use convoforms_postgres::error::TimeoutType;
    use convoforms_postgres::types::{UserConstraints, WorkspaceConstraints};

    use super::*;

    #[test]
    fn timeouts_are_unavailable() {
        let error: Error = PgError::Timeout(TimeoutType::Wait).into();
        assert_eq!(error.kind(), ErrorKind::ServiceUnavailable);
    }

    #[test]
    fn unexpected_errors_are_internal() {
        let error: Error = PgError::Unexpected("boom".into()).into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.context(), None);
    }

    #[test]
    fn constraint_violations_are_client_errors() {
        let error: Error = ConstraintViolation::Workspace(WorkspaceConstraints::SlugUnique).into();
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(error.resource(), Some("workspace"));

        let error: Error = ConstraintViolation::User(UserConstraints::EmailFormat).into();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
    }
}

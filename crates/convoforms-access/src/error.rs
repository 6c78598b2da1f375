//! Error type shared by every operation of the crate.

use std::borrow::Cow;

use convoforms_postgres::PgError;

/// Why an operation did not complete.
///
/// Every variant except [`AccessError::Database`] is an expected outcome
/// carrying a message meant to be shown to the caller as-is.
#[derive(Debug, thiserror::Error)]
#[must_use = "access errors should be handled appropriately"]
pub enum AccessError {
    /// The caller lacks the membership or role the operation needs.
    #[error("{0}")]
    Forbidden(Cow<'static, str>),

    /// The subscription plan does not allow the operation.
    #[error("{0}")]
    PlanLimitExceeded(String),

    #[error("{0}")]
    NotFound(Cow<'static, str>),

    /// The operation collides with existing state.
    #[error("{0}")]
    Conflict(Cow<'static, str>),

    /// The request is malformed or asks for a forbidden transition.
    #[error("{0}")]
    BadRequest(Cow<'static, str>),

    /// The target existed but is no longer usable, such as an expired invitation.
    #[error("{0}")]
    Gone(Cow<'static, str>),

    #[error(transparent)]
    Database(#[from] PgError),
}

impl AccessError {
    pub fn forbidden(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Forbidden(reason.into())
    }

    pub fn not_found(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(reason.into())
    }

    pub fn conflict(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Conflict(reason.into())
    }

    pub fn bad_request(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(reason.into())
    }

    pub fn gone(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Gone(reason.into())
    }

    /// Returns whether this is an expected denial rather than a failure.
    pub fn is_denial(&self) -> bool {
        !matches!(self, Self::Database(_))
    }
}

/// [`Result`] alias with [`AccessError`] as the default error.
pub type AccessResult<T, E = AccessError> = Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denials_display_their_reason() {
        let err = AccessError::forbidden("Not a workspace member");
        assert_eq!(err.to_string(), "Not a workspace member");
        assert!(err.is_denial());

        let err = AccessError::PlanLimitExceeded("limit of 1 reached".into());
        assert_eq!(err.to_string(), "limit of 1 reached");
    }

    #[test]
    fn database_errors_are_not_denials() {
        let err = AccessError::from(PgError::Unexpected("boom".into()));
        assert!(!err.is_denial());
    }
}

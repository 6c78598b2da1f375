//! Authorization outcomes to HTTP errors.

use convoforms_access::AccessError;

use crate::handler::{Error, ErrorKind};

impl From<AccessError> for Error<'static> {
    fn from(error: AccessError) -> Self {
        match error {
            AccessError::Forbidden(reason) => ErrorKind::Forbidden.with_message(reason),
            AccessError::PlanLimitExceeded(reason) => {
                ErrorKind::PlanLimitExceeded.with_message(reason)
            }
            AccessError::NotFound(reason) => ErrorKind::NotFound.with_message(reason),
            AccessError::Conflict(reason) => ErrorKind::Conflict.with_message(reason),
            AccessError::BadRequest(reason) => ErrorKind::BadRequest.with_message(reason),
            AccessError::Gone(reason) => ErrorKind::Gone.with_message(reason),
            AccessError::Database(error) => error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_pass_through() {
        let error: Error = AccessError::forbidden("You don't have permission to invite members").into();
        assert_eq!(error.kind(), ErrorKind::Forbidden);
        assert_eq!(error.message(), Some("You don't have permission to invite members"));
    }

    #[test]
    fn plan_limits_keep_their_kind() {
        let error: Error =
            AccessError::PlanLimitExceeded("Your plan allows 1 workspace".to_owned()).into();
        assert_eq!(error.kind(), ErrorKind::PlanLimitExceeded);
    }

    #[test]
    fn expired_invitations_are_gone() {
        let error: Error = AccessError::gone("Invitation has expired").into();
        assert_eq!(error.kind(), ErrorKind::Gone);
    }
}

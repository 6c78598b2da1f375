//! User and subscription constraint violations.

use convoforms_postgres::types::{SubscriptionConstraints, UserConstraints};

use crate::handler::{Error, ErrorKind};

impl From<UserConstraints> for Error<'static> {
    fn from(c: UserConstraints) -> Self {
        let error = match c {
            UserConstraints::PrimaryKey => {
                ErrorKind::Conflict.with_message("This account already exists")
            }
            UserConstraints::EmailUnique => ErrorKind::Conflict
                .with_message("This email address is already used by another account"),
            UserConstraints::IdNotEmpty => ErrorKind::InternalServerError.into_error(),
            UserConstraints::EmailFormat => {
                ErrorKind::BadRequest.with_message("Email address is invalid")
            }
        };

        error.with_resource("user")
    }
}

impl From<SubscriptionConstraints> for Error<'static> {
    fn from(c: SubscriptionConstraints) -> Self {
        let error = match c {
            SubscriptionConstraints::UserUnique => {
                ErrorKind::Conflict.with_message("A subscription already exists for this account")
            }
            SubscriptionConstraints::MaxWorkspacesRange
            | SubscriptionConstraints::MaxSeatsRange
            | SubscriptionConstraints::AddonSeatsNonNegative => {
                ErrorKind::BadRequest.with_message("Subscription limits are out of range")
            }
        };

        error.with_resource("subscription")
    }
}

//! Invitation request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query parameters for previewing an invitation.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InvitationTokenQuery {
    /// Token from the invitation link.
    #[validate(length(min = 1, max = 128))]
    pub token: String,
}

/// Request payload for accepting an invitation as the signed-in user.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitation {
    /// Token from the invitation link.
    #[validate(length(min = 1, max = 128))]
    pub token: String,
}

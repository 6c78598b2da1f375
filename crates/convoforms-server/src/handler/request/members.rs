//! Workspace member request types.

use convoforms_postgres::types::WorkspaceRole;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request payload for inviting someone to a workspace by email.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InviteMember {
    #[validate(email(message = "Enter a valid email address"), length(max = 254))]
    pub email: String,
    /// Role granted on acceptance. Cannot be `owner`.
    #[serde(default)]
    pub role: WorkspaceRole,
}

/// Request payload for changing the role of a member.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRole {
    pub role: WorkspaceRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_defaults_to_member() {
        let request: InviteMember =
            serde_json::from_value(serde_json::json!({ "email": "bob@example.com" })).unwrap();
        assert_eq!(request.role, WorkspaceRole::Member);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn rejects_invalid_email() {
        let request = InviteMember {
            email: "bob".to_owned(),
            role: WorkspaceRole::Viewer,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn unknown_roles_fail_to_parse() {
        let request = serde_json::from_value::<UpdateMemberRole>(serde_json::json!({
            "role": "superuser"
        }));
        assert!(request.is_err());
    }
}

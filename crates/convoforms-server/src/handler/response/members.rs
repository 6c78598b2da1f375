//! Workspace member response types.

use convoforms_access::MemberDetails;
use convoforms_postgres::model;
use convoforms_postgres::types::WorkspaceRole;
use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Workspace member response.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub workspace_id: Uuid,
    pub user_id: String,
    pub role: WorkspaceRole,
    /// Missing when the user row is not known yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub invited_by: Option<String>,
    pub joined_at: Timestamp,
    pub last_seen_at: Option<Timestamp>,
}

impl Member {
    pub fn from_model(member: model::WorkspaceMember) -> Self {
        Self {
            workspace_id: member.workspace_id,
            user_id: member.user_id,
            role: member.role,
            email: None,
            display_name: None,
            avatar_url: None,
            invited_by: member.invited_by,
            joined_at: member.joined_at.into(),
            last_seen_at: member.last_seen_at.map(Into::into),
        }
    }

    pub fn from_details(details: MemberDetails) -> Self {
        let MemberDetails { member, user } = details;
        let mut response = Self::from_model(member);

        if let Some(user) = user {
            response.display_name = Some(user.display_name());
            response.email = Some(user.email);
            response.avatar_url = user.avatar_url;
        }

        response
    }
}

/// Page of workspace members.
pub type MembersPage = super::Page<Member>;

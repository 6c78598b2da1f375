//! Membership of a user in a workspace.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::workspace_members;
use crate::types::WorkspaceRole;

/// Keyed by `(workspace_id, user_id)`.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = workspace_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WorkspaceMember {
    pub workspace_id: Uuid,
    pub user_id: String,
    pub role: WorkspaceRole,
    pub invited_by: Option<String>,
    pub joined_at: Timestamp,
    pub last_seen_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = workspace_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewWorkspaceMember {
    pub workspace_id: Uuid,
    pub user_id: String,
    pub role: WorkspaceRole,
    pub invited_by: Option<String>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = workspace_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateWorkspaceMember {
    pub role: Option<WorkspaceRole>,
    pub last_seen_at: Option<Option<Timestamp>>,
}

impl NewWorkspaceMember {
    pub fn new(workspace_id: Uuid, user_id: impl Into<String>, role: WorkspaceRole) -> Self {
        Self {
            workspace_id,
            user_id: user_id.into(),
            role,
            invited_by: None,
        }
    }

    pub fn new_owner(workspace_id: Uuid, user_id: impl Into<String>) -> Self {
        Self::new(workspace_id, user_id, WorkspaceRole::Owner)
    }

    pub fn with_invited_by(mut self, invited_by: impl Into<String>) -> Self {
        self.invited_by = Some(invited_by.into());
        self
    }
}

impl WorkspaceMember {
    #[inline]
    pub fn is_owner(&self) -> bool {
        self.role.is_owner()
    }
}

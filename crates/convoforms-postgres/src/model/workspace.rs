//! Workspaces, the tenant boundary for forms, templates and members.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::workspaces;
use crate::types::WorkspaceType;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = workspaces)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    /// Globally unique, URL-safe identifier. Not changed after creation.
    pub slug: String,
    pub workspace_type: WorkspaceType,
    pub owner_id: String,
    pub description: Option<String>,
    /// Free-form settings object.
    pub settings: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = workspaces)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewWorkspace {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub workspace_type: WorkspaceType,
    pub owner_id: String,
    pub description: Option<String>,
    pub settings: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = workspaces)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateWorkspace {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub settings: Option<serde_json::Value>,
}

impl NewWorkspace {
    /// Creates a team workspace owned by `owner_id` with a fresh id.
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            slug: slug.into(),
            workspace_type: WorkspaceType::Team,
            owner_id: owner_id.into(),
            description: None,
            settings: None,
        }
    }

    pub fn with_type(mut self, workspace_type: WorkspaceType) -> Self {
        self.workspace_type = workspace_type;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

impl Workspace {
    #[inline]
    pub fn is_default(&self) -> bool {
        self.workspace_type == WorkspaceType::Default
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

impl UpdateWorkspace {
    /// Returns whether the changeset would touch no column.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.settings.is_none()
    }
}

//! Activity log response types.

use convoforms_postgres::model;
use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Activity log entry. Client addresses are kept for audits but not exposed.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub activity_id: Uuid,
    pub workspace_id: Uuid,
    /// Absent for system actions such as invitation expiry.
    pub user_id: Option<String>,
    /// Dotted action name, such as `member.role_updated`.
    pub action: String,
    pub resource: String,
    pub resource_id: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
}

impl Activity {
    pub fn from_model(activity: model::WorkspaceActivity) -> Self {
        Self {
            activity_id: activity.id,
            workspace_id: activity.workspace_id,
            user_id: activity.user_id,
            action: activity.action,
            resource: activity.resource,
            resource_id: activity.resource_id,
            metadata: activity.metadata,
            created_at: activity.created_at.into(),
        }
    }
}

/// Page of activity entries, newest first.
pub type ActivitiesPage = super::Page<Activity>;

//! Append-only audit trail of privileged actions.

use diesel::prelude::*;
use ipnet::IpNet;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::workspace_activities;

/// One audit entry. Rows are never updated.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = workspace_activities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WorkspaceActivity {
    pub id: Uuid,
    pub workspace_id: Uuid,
    /// Acting user. `None` once the user has been deleted.
    pub user_id: Option<String>,
    /// Dotted action name such as `member.joined`.
    pub action: String,
    pub resource: String,
    pub resource_id: Option<String>,
    pub metadata: serde_json::Value,
    pub ip_address: Option<IpNet>,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = workspace_activities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewWorkspaceActivity {
    pub workspace_id: Uuid,
    pub user_id: Option<String>,
    pub action: String,
    pub resource: String,
    pub resource_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub ip_address: Option<IpNet>,
    pub user_agent: Option<String>,
}

//! Workspace and usage response types.

use convoforms_access as access;
use convoforms_postgres::model;
use convoforms_postgres::types::{SubscriptionPlan, WorkspaceType};
use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Workspace response.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub workspace_id: Uuid,
    pub name: String,
    /// URL-safe identifier, unique across all workspaces.
    pub slug: String,
    pub workspace_type: WorkspaceType,
    /// User that created the workspace.
    pub owner_id: String,
    pub description: Option<String>,
    pub settings: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Workspace {
    pub fn from_model(workspace: model::Workspace) -> Self {
        Self {
            workspace_id: workspace.id,
            name: workspace.name,
            slug: workspace.slug,
            workspace_type: workspace.workspace_type,
            owner_id: workspace.owner_id,
            description: workspace.description,
            settings: workspace.settings,
            created_at: workspace.created_at.into(),
            updated_at: workspace.updated_at.into(),
        }
    }
}

/// Consumption of a single plan quota.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetric {
    pub used: i64,
    /// Absent when the plan is unlimited.
    pub limit: Option<i64>,
    pub unlimited: bool,
    pub remaining: Option<i64>,
}

impl From<access::UsageMetric> for UsageMetric {
    fn from(metric: access::UsageMetric) -> Self {
        Self {
            used: metric.used,
            limit: metric.limit,
            unlimited: metric.unlimited,
            remaining: metric.remaining,
        }
    }
}

/// How many workspaces the caller owns against their plan.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceUsage {
    pub plan: SubscriptionPlan,
    pub workspaces: UsageMetric,
    pub can_create_workspace: bool,
}

impl From<access::WorkspaceUsage> for WorkspaceUsage {
    fn from(usage: access::WorkspaceUsage) -> Self {
        Self {
            plan: usage.plan,
            workspaces: usage.workspaces.into(),
            can_create_workspace: usage.can_create_workspace,
        }
    }
}

/// Seat consumption of one workspace against its owner's plan.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberUsage {
    pub workspace_id: Uuid,
    /// Plan of the workspace owner.
    pub plan: SubscriptionPlan,
    /// Members plus pending invitations.
    pub seats: UsageMetric,
    pub addon_seats: i64,
    pub can_invite_users: bool,
    pub addon_seats_available: bool,
    /// Whether another invitation fits in the remaining seats.
    pub can_invite: bool,
}

impl From<access::MemberUsage> for MemberUsage {
    fn from(usage: access::MemberUsage) -> Self {
        Self {
            workspace_id: usage.workspace_id,
            plan: usage.plan,
            seats: usage.seats.into(),
            addon_seats: usage.addon_seats,
            can_invite_users: usage.can_invite_users,
            addon_seats_available: usage.addon_seats_available,
            can_invite: usage.can_invite,
        }
    }
}

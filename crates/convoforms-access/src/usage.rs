//! Read-only usage reports combining plan limits with live counts.

use convoforms_postgres::PgResult;
use convoforms_postgres::query::{
    SubscriptionRepository, WorkspaceMemberRepository, WorkspaceRepository,
};
use convoforms_postgres::types::SubscriptionPlan;
use uuid::Uuid;

use crate::check::authorize;
use crate::permission::{Action, Resource};
use crate::plan::QuotaLimit;
use crate::quota::load_limits;
use crate::{AccessError, AccessResult};

/// Usage of one quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageMetric {
    pub used: i64,
    /// `None` when unlimited.
    pub limit: Option<i64>,
    pub unlimited: bool,
    /// `None` when unlimited.
    pub remaining: Option<i64>,
}

impl UsageMetric {
    pub fn new(used: i64, limit: QuotaLimit) -> Self {
        match limit {
            QuotaLimit::Unlimited => Self {
                used,
                limit: None,
                unlimited: true,
                remaining: None,
            },
            QuotaLimit::Limited(max) => Self {
                used,
                limit: Some(max),
                unlimited: false,
                remaining: limit.remaining(used),
            },
        }
    }

    /// Returns whether one more unit fits.
    #[inline]
    pub fn has_room(&self) -> bool {
        self.unlimited || self.remaining.is_some_and(|remaining| remaining > 0)
    }
}

/// Workspace ownership of a user against their plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceUsage {
    pub plan: SubscriptionPlan,
    pub workspaces: UsageMetric,
    pub can_create_workspace: bool,
}

/// Seat usage of one workspace against its owner's plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberUsage {
    pub workspace_id: Uuid,
    pub plan: SubscriptionPlan,
    /// Occupied seats against the total, add-ons included.
    pub seats: UsageMetric,
    pub addon_seats: i64,
    pub can_invite_users: bool,
    pub addon_seats_available: bool,
    /// Whether an invitation would currently pass the seat check.
    pub can_invite: bool,
}

/// Reports how many workspaces `user_id` owns and may still create.
pub async fn workspace_usage<R>(repo: &mut R, user_id: &str) -> PgResult<WorkspaceUsage>
where
    R: SubscriptionRepository + WorkspaceRepository,
{
    let limits = load_limits(repo, user_id).await?;
    let owned = repo.count_owned_workspaces(user_id).await?;
    let workspaces = UsageMetric::new(owned, limits.max_workspaces);

    Ok(WorkspaceUsage {
        plan: limits.plan,
        can_create_workspace: workspaces.has_room(),
        workspaces,
    })
}

/// Reports seat usage of a workspace. The caller must be able to read its
/// member list.
pub async fn workspace_member_usage<R>(
    repo: &mut R,
    workspace_id: Uuid,
    user_id: &str,
) -> AccessResult<MemberUsage>
where
    R: SubscriptionRepository + WorkspaceRepository + WorkspaceMemberRepository,
{
    authorize(repo, user_id, workspace_id, Resource::Members, Action::Read).await?;

    let workspace = repo
        .find_workspace_by_id(workspace_id)
        .await?
        .ok_or_else(|| AccessError::not_found("Workspace not found"))?;

    let limits = load_limits(repo, &workspace.owner_id).await?;
    let members = repo.count_workspace_members(workspace_id).await?;
    let seats = UsageMetric::new(members, limits.total_seats());

    Ok(MemberUsage {
        workspace_id,
        plan: limits.plan,
        addon_seats: limits.addon_seats,
        can_invite_users: limits.can_invite_users,
        addon_seats_available: limits.addon_seats_available,
        can_invite: limits.can_invite_users && seats.has_room(),
        seats,
    })
}

#[cfg(test)]
mod tests {
    use convoforms_postgres::types::WorkspaceRole;
    use convoforms_test::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn reports_unlimited_for_sentinel() {
        let mut store = MemoryStore::new();
        store.seed_subscription("alice", SubscriptionPlan::Enterprise);
        store.seed_workspace("alice", "acme");

        let usage = workspace_usage(&mut store, "alice").await.unwrap();

        assert!(usage.workspaces.unlimited);
        assert_eq!(usage.workspaces.limit, None);
        assert_eq!(usage.workspaces.used, 1);
        assert!(usage.can_create_workspace);
    }

    #[tokio::test]
    async fn starter_without_subscription_is_full_after_one() {
        let mut store = MemoryStore::new();
        store.seed_workspace("alice", "acme");

        let usage = workspace_usage(&mut store, "alice").await.unwrap();

        assert_eq!(usage.plan, SubscriptionPlan::Starter);
        assert_eq!(usage.workspaces.limit, Some(1));
        assert_eq!(usage.workspaces.remaining, Some(0));
        assert!(!usage.can_create_workspace);
    }

    #[tokio::test]
    async fn member_usage_counts_seats_with_addons() {
        let mut store = MemoryStore::new();
        store.seed_subscription("alice", SubscriptionPlan::Pro);
        store.edit_subscription("alice", |s| s.addon_seats = 1);
        let ws = store.seed_workspace("alice", "acme");
        store.seed_member(ws.id, "vera", WorkspaceRole::Viewer);

        let usage = workspace_member_usage(&mut store, ws.id, "vera").await.unwrap();

        assert_eq!(usage.seats.used, 2);
        assert_eq!(usage.seats.limit, Some(6));
        assert_eq!(usage.seats.remaining, Some(4));
        assert!(usage.can_invite);
    }

    #[tokio::test]
    async fn member_usage_requires_membership() {
        let mut store = MemoryStore::new();
        let ws = store.seed_workspace("alice", "acme");

        let err = workspace_member_usage(&mut store, ws.id, "mallory")
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Forbidden(_)));
    }
}

//! Quota checks for workspace creation and invitations.
//!
//! Both checks read live counts on every call. They are the fast path that
//! produces a readable reason. Workspace creation and invitation acceptance
//! are additionally guarded inside their transactions.

use convoforms_postgres::PgResult;
use convoforms_postgres::query::{
    SubscriptionRepository, WorkspaceMemberRepository, WorkspaceRepository,
};
use uuid::Uuid;

use crate::plan::{QuotaLimit, ResolvedLimits};
use crate::{AccessError, AccessResult, TRACING_TARGET_QUOTA};

/// Outcome of a quota check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaDecision {
    pub allowed: bool,
    /// Why the action is not allowed, suitable for display.
    pub reason: Option<String>,
    /// Seats left after the check, when the seat limit is finite.
    pub available_seats: Option<i64>,
}

impl QuotaDecision {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
            available_seats: None,
        }
    }

    pub fn allowed_with_seats(available_seats: i64) -> Self {
        Self {
            available_seats: Some(available_seats),
            ..Self::allowed()
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            available_seats: None,
        }
    }

    /// Converts a denial into [`AccessError::PlanLimitExceeded`].
    pub fn into_result(self) -> AccessResult<Self> {
        if self.allowed {
            return Ok(self);
        }

        let reason = self
            .reason
            .unwrap_or_else(|| "Your plan does not allow this action".to_string());
        Err(AccessError::PlanLimitExceeded(reason))
    }
}

/// Loads the subscription of `user_id` and resolves its limits.
pub async fn load_limits<R>(repo: &mut R, user_id: &str) -> PgResult<ResolvedLimits>
where
    R: SubscriptionRepository,
{
    let subscription = repo.find_subscription_by_user(user_id).await?;
    Ok(ResolvedLimits::resolve(subscription.as_ref()))
}

fn plural(count: i64, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Checks whether `user_id` may own one more workspace.
pub async fn can_create_workspace<R>(repo: &mut R, user_id: Option<&str>) -> PgResult<QuotaDecision>
where
    R: SubscriptionRepository + WorkspaceRepository,
{
    let Some(user_id) = user_id else {
        return Ok(QuotaDecision::denied(
            "You must be signed in to create a workspace",
        ));
    };

    let limits = load_limits(repo, user_id).await?;
    let QuotaLimit::Limited(max_workspaces) = limits.max_workspaces else {
        return Ok(QuotaDecision::allowed());
    };

    let owned = repo.count_owned_workspaces(user_id).await?;
    if owned < max_workspaces {
        return Ok(QuotaDecision::allowed());
    }

    tracing::info!(
        target: TRACING_TARGET_QUOTA,
        user_id = %user_id,
        plan = %limits.plan,
        owned,
        max_workspaces,
        "workspace limit reached"
    );

    Ok(QuotaDecision::denied(format!(
        "Your {plan} plan allows {limit}. Upgrade your plan to create more workspaces.",
        plan = limits.plan,
        limit = plural(max_workspaces, "workspace"),
    )))
}

/// Checks whether one more member fits into a workspace.
///
/// Seats are governed by the subscription of the workspace owner.
pub async fn can_invite_to_workspace<R>(
    repo: &mut R,
    workspace_id: Uuid,
    user_id: Option<&str>,
) -> PgResult<QuotaDecision>
where
    R: SubscriptionRepository + WorkspaceRepository + WorkspaceMemberRepository,
{
    let Some(user_id) = user_id else {
        return Ok(QuotaDecision::denied(
            "You must be signed in to invite members",
        ));
    };

    let Some(workspace) = repo.find_workspace_by_id(workspace_id).await? else {
        tracing::warn!(
            target: TRACING_TARGET_QUOTA,
            user_id = %user_id,
            workspace_id = %workspace_id,
            "seat check for a missing workspace"
        );
        return Ok(QuotaDecision::denied("Workspace not found"));
    };

    let limits = load_limits(repo, &workspace.owner_id).await?;
    if !limits.can_invite_users {
        return Ok(QuotaDecision::denied(format!(
            "The {plan} plan does not support inviting members. Upgrade your plan to collaborate with your team.",
            plan = limits.plan,
        )));
    }

    let QuotaLimit::Limited(total_seats) = limits.total_seats() else {
        return Ok(QuotaDecision::allowed());
    };

    let members = repo.count_workspace_members(workspace_id).await?;
    if members < total_seats {
        return Ok(QuotaDecision::allowed_with_seats(total_seats - members));
    }

    tracing::info!(
        target: TRACING_TARGET_QUOTA,
        user_id = %user_id,
        workspace_id = %workspace_id,
        plan = %limits.plan,
        members,
        total_seats,
        "seat limit reached"
    );

    Ok(QuotaDecision::denied(seat_limit_reason(&limits, total_seats)))
}

/// Reason shown when a workspace has no free seat left.
pub(crate) fn seat_limit_reason(limits: &ResolvedLimits, total_seats: i64) -> String {
    let remedy = if limits.addon_seats_available {
        "Purchase add-on seats to invite more members."
    } else {
        "Upgrade your plan to invite more members."
    };

    format!(
        "Seat limit reached: this workspace uses all {seats}. {remedy}",
        seats = plural(total_seats, "seat"),
    )
}

#[cfg(test)]
mod tests {
    use convoforms_postgres::types::{SubscriptionPlan, WorkspaceRole};
    use convoforms_test::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn unauthenticated_is_denied() {
        let mut store = MemoryStore::new();

        let decision = can_create_workspace(&mut store, None).await.unwrap();
        assert!(!decision.allowed);
        assert!(decision.reason.is_some());
    }

    #[tokio::test]
    async fn workspace_cap_boundary() {
        let mut store = MemoryStore::new();
        store.seed_subscription("alice", SubscriptionPlan::Pro);
        store.seed_workspace("alice", "one");
        store.seed_workspace("alice", "two");

        let below = can_create_workspace(&mut store, Some("alice")).await.unwrap();
        assert!(below.allowed);

        store.seed_workspace("alice", "three");
        let at = can_create_workspace(&mut store, Some("alice")).await.unwrap();
        assert!(!at.allowed);
        assert!(at.reason.unwrap().contains('3'));
    }

    #[tokio::test]
    async fn unlimited_ignores_count() {
        let mut store = MemoryStore::new();
        store.seed_subscription("alice", SubscriptionPlan::Starter);
        store.edit_subscription("alice", |s| s.max_workspaces = Some(-1));
        for i in 0..50 {
            store.seed_workspace("alice", &format!("ws-{i}"));
        }

        let decision = can_create_workspace(&mut store, Some("alice")).await.unwrap();
        assert!(decision.allowed);
    }

    #[tokio::test]
    async fn starter_cannot_invite() {
        let mut store = MemoryStore::new();
        let ws = store.seed_workspace("alice", "acme");

        let decision = can_invite_to_workspace(&mut store, ws.id, Some("alice"))
            .await
            .unwrap();

        assert!(!decision.allowed);
        assert!(decision.reason.unwrap().contains("does not support"));
    }

    #[tokio::test]
    async fn seats_count_addons() {
        let mut store = MemoryStore::new();
        store.seed_subscription("alice", SubscriptionPlan::Pro);
        store.edit_subscription("alice", |s| s.addon_seats = 2);
        let ws = store.seed_workspace("alice", "acme");
        for i in 0..5 {
            store.seed_member(ws.id, &format!("user-{i}"), WorkspaceRole::Member);
        }

        // Owner plus five members: six of seven seats used.
        let decision = can_invite_to_workspace(&mut store, ws.id, Some("alice"))
            .await
            .unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.available_seats, Some(1));

        store.seed_member(ws.id, "user-5", WorkspaceRole::Member);
        let decision = can_invite_to_workspace(&mut store, ws.id, Some("alice"))
            .await
            .unwrap();
        assert!(!decision.allowed);
        assert!(decision.reason.unwrap().contains("add-on seats"));
    }

    #[tokio::test]
    async fn seat_override_applies() {
        let mut store = MemoryStore::new();
        store.seed_subscription("alice", SubscriptionPlan::Pro);
        store.edit_subscription("alice", |s| s.max_seats_per_workspace = Some(1));
        let ws = store.seed_workspace("alice", "acme");

        let decision = can_invite_to_workspace(&mut store, ws.id, Some("alice"))
            .await
            .unwrap();

        assert!(!decision.allowed);
        assert!(decision.reason.unwrap().contains("1 seat"));
    }

    #[tokio::test]
    async fn seats_follow_workspace_owner() {
        let mut store = MemoryStore::new();
        store.seed_subscription("alice", SubscriptionPlan::Enterprise);
        let ws = store.seed_workspace("alice", "acme");
        store.seed_member(ws.id, "bob", WorkspaceRole::Admin);

        // Bob has no subscription of their own.
        let decision = can_invite_to_workspace(&mut store, ws.id, Some("bob"))
            .await
            .unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.available_seats, None);
    }

    #[test]
    fn denial_converts_to_plan_limit_error() {
        let err = QuotaDecision::denied("full").into_result().unwrap_err();
        assert!(matches!(err, AccessError::PlanLimitExceeded(reason) if reason == "full"));
        assert!(QuotaDecision::allowed().into_result().is_ok());
    }
}

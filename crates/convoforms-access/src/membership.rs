//! Listing, role changes and removal of workspace members.

use convoforms_postgres::model::{UpdateWorkspaceMember, User, WorkspaceMember};
use convoforms_postgres::query::{
    Pagination, UserRepository, WorkspaceActivityRepository, WorkspaceMemberRepository,
};
use convoforms_postgres::types::WorkspaceRole;
use uuid::Uuid;

use crate::activity::{ActivityLogger, RequestContext};
use crate::check::authorize;
use crate::permission::{Action, Resource};
use crate::{AccessError, AccessResult, TRACING_TARGET_MEMBERSHIP};

/// A membership with the member's profile, when it still exists.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDetails {
    pub member: WorkspaceMember,
    pub user: Option<User>,
}

/// Lists members of a workspace, highest role first. Requires `members.read`.
pub async fn list_members<R>(
    repo: &mut R,
    user_id: &str,
    workspace_id: Uuid,
    pagination: Pagination,
) -> AccessResult<Vec<MemberDetails>>
where
    R: UserRepository + WorkspaceMemberRepository,
{
    authorize(repo, user_id, workspace_id, Resource::Members, Action::Read).await?;

    let members = repo.list_workspace_members(workspace_id, pagination).await?;
    let mut details = Vec::with_capacity(members.len());
    for member in members {
        let user = repo.find_user_by_id(&member.user_id).await?;
        details.push(MemberDetails { member, user });
    }

    Ok(details)
}

/// Applies the checks shared by updates and removals, returning the caller's
/// and the target's memberships.
///
/// The caller's permission is checked before the target is looked up, so a
/// caller without `members.update`/`members.remove` learns nothing about the
/// roster.
async fn authorize_management<R>(
    repo: &mut R,
    caller_id: &str,
    workspace_id: Uuid,
    target_user_id: &str,
    action: Action,
) -> AccessResult<(WorkspaceMember, WorkspaceMember)>
where
    R: WorkspaceMemberRepository,
{
    if caller_id == target_user_id {
        return Err(AccessError::bad_request(match action {
            Action::Remove => "You cannot remove yourself from the workspace",
            _ => "You cannot change your own role",
        }));
    }

    let caller = authorize(repo, caller_id, workspace_id, Resource::Members, action).await?;

    let target = repo
        .find_workspace_member(workspace_id, target_user_id)
        .await?
        .ok_or_else(|| AccessError::not_found("Member not found"))?;

    if target.is_owner() {
        return Err(AccessError::bad_request(match action {
            Action::Remove => "The workspace owner cannot be removed",
            _ => "The workspace owner's role cannot be changed",
        }));
    }

    if !caller.role.can_manage(target.role) {
        tracing::warn!(
            target: TRACING_TARGET_MEMBERSHIP,
            caller_id = %caller_id,
            workspace_id = %workspace_id,
            target_user_id = %target_user_id,
            caller_role = %caller.role,
            target_role = %target.role,
            "management denied: target does not rank below caller"
        );

        return Err(AccessError::forbidden(format!(
            "You can only manage members with a lower role than yours ({})",
            caller.role
        )));
    }

    Ok((caller, target))
}

/// Changes the role of `target_user_id`.
///
/// Nobody can grant `owner`, change their own role, touch an owner, or
/// grant a role at or above their own.
pub async fn update_member_role<R>(
    repo: &mut R,
    caller_id: &str,
    workspace_id: Uuid,
    target_user_id: &str,
    new_role: WorkspaceRole,
    ctx: &RequestContext,
) -> AccessResult<WorkspaceMember>
where
    R: WorkspaceMemberRepository + WorkspaceActivityRepository,
{
    if new_role.is_owner() {
        return Err(AccessError::bad_request(
            "The owner role cannot be granted to a member",
        ));
    }

    let (caller, target) =
        authorize_management(repo, caller_id, workspace_id, target_user_id, Action::Update).await?;

    if !caller.role.can_manage(new_role) {
        return Err(AccessError::forbidden(format!(
            "You cannot grant the {new_role} role"
        )));
    }

    if target.role == new_role {
        return Ok(target);
    }

    let changes = UpdateWorkspaceMember {
        role: Some(new_role),
        ..Default::default()
    };
    let updated = repo
        .update_workspace_member(workspace_id, target_user_id, changes)
        .await?;

    tracing::info!(
        target: TRACING_TARGET_MEMBERSHIP,
        caller_id = %caller_id,
        workspace_id = %workspace_id,
        target_user_id = %target_user_id,
        from = %target.role,
        to = %new_role,
        "member role updated"
    );

    ActivityLogger::new(ctx)
        .member_role_updated(repo, workspace_id, caller_id, target_user_id, target.role, new_role)
        .await;

    Ok(updated)
}

/// Removes `target_user_id` from a workspace.
pub async fn remove_member<R>(
    repo: &mut R,
    caller_id: &str,
    workspace_id: Uuid,
    target_user_id: &str,
    ctx: &RequestContext,
) -> AccessResult<WorkspaceMember>
where
    R: WorkspaceMemberRepository + WorkspaceActivityRepository,
{
    let (_, target) =
        authorize_management(repo, caller_id, workspace_id, target_user_id, Action::Remove).await?;

    if !repo.remove_workspace_member(workspace_id, target_user_id).await? {
        return Err(AccessError::not_found("Member not found"));
    }

    tracing::info!(
        target: TRACING_TARGET_MEMBERSHIP,
        caller_id = %caller_id,
        workspace_id = %workspace_id,
        target_user_id = %target_user_id,
        role = %target.role,
        "member removed"
    );

    ActivityLogger::new(ctx)
        .member_removed(repo, workspace_id, caller_id, target_user_id, target.role)
        .await;

    Ok(target)
}

#[cfg(test)]
mod tests {
    use convoforms_test::MemoryStore;

    use super::*;

    struct Team {
        store: MemoryStore,
        workspace_id: Uuid,
    }

    /// alice (owner), adam (admin), mia (member), vera (viewer).
    fn team() -> Team {
        let mut store = MemoryStore::new();
        let ws = store.seed_workspace("alice", "acme");
        store.seed_member(ws.id, "adam", WorkspaceRole::Admin);
        store.seed_member(ws.id, "mia", WorkspaceRole::Member);
        store.seed_member(ws.id, "vera", WorkspaceRole::Viewer);
        Team {
            store,
            workspace_id: ws.id,
        }
    }

    #[tokio::test]
    async fn admin_promotes_viewer_to_member() {
        let Team { mut store, workspace_id } = team();
        let ctx = RequestContext::new();

        let updated =
            update_member_role(&mut store, "adam", workspace_id, "vera", WorkspaceRole::Member, &ctx)
                .await
                .unwrap();

        assert_eq!(updated.role, WorkspaceRole::Member);
        let entry = store.activities().last().unwrap();
        assert_eq!(entry.action, "member.role_updated");
        assert_eq!(entry.metadata["previousRole"], "viewer");
    }

    #[tokio::test]
    async fn self_modification_is_rejected() {
        let Team { mut store, workspace_id } = team();
        let ctx = RequestContext::new();

        let err =
            update_member_role(&mut store, "adam", workspace_id, "adam", WorkspaceRole::Viewer, &ctx)
                .await
                .unwrap_err();
        assert!(matches!(err, AccessError::BadRequest(_)));

        let err = remove_member(&mut store, "alice", workspace_id, "alice", &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::BadRequest(_)));
    }

    #[tokio::test]
    async fn owners_are_protected_from_everyone() {
        let Team { mut store, workspace_id } = team();
        store.seed_member(workspace_id, "otto", WorkspaceRole::Owner);
        let ctx = RequestContext::new();

        for caller in ["otto", "adam"] {
            let err = remove_member(&mut store, caller, workspace_id, "alice", &ctx)
                .await
                .unwrap_err();
            assert!(matches!(err, AccessError::BadRequest(_)), "{caller}");

            let err = update_member_role(
                &mut store,
                caller,
                workspace_id,
                "alice",
                WorkspaceRole::Admin,
                &ctx,
            )
            .await
            .unwrap_err();
            assert!(matches!(err, AccessError::BadRequest(_)), "{caller}");
        }

        let err = remove_member(&mut store, "vera", workspace_id, "alice", &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Forbidden(_)));
        assert_eq!(store.members_of(workspace_id).len(), 5);
    }

    #[tokio::test]
    async fn outsiders_learn_nothing_about_the_roster() {
        let Team { mut store, workspace_id } = team();
        let ctx = RequestContext::new();

        for target in ["alice", "mia", "nobody"] {
            let err = remove_member(&mut store, "mallory", workspace_id, target, &ctx)
                .await
                .unwrap_err();
            assert!(matches!(err, AccessError::Forbidden(_)), "{target}");

            let err = update_member_role(
                &mut store,
                "mallory",
                workspace_id,
                target,
                WorkspaceRole::Viewer,
                &ctx,
            )
            .await
            .unwrap_err();
            assert!(matches!(err, AccessError::Forbidden(_)), "{target}");
        }

        let err = remove_member(&mut store, "mallory", Uuid::now_v7(), "alice", &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Forbidden(_)));
        assert_eq!(store.members_of(workspace_id).len(), 4);
    }

    #[tokio::test]
    async fn peers_cannot_manage_each_other() {
        let Team { mut store, workspace_id } = team();
        store.seed_member(workspace_id, "ada", WorkspaceRole::Admin);
        let ctx = RequestContext::new();

        let err = remove_member(&mut store, "adam", workspace_id, "ada", &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Forbidden(_)));

        let removed = remove_member(&mut store, "alice", workspace_id, "ada", &ctx)
            .await
            .unwrap();
        assert_eq!(removed.role, WorkspaceRole::Admin);
    }

    #[tokio::test]
    async fn cannot_grant_own_rank_or_owner() {
        let Team { mut store, workspace_id } = team();
        let ctx = RequestContext::new();

        let err =
            update_member_role(&mut store, "adam", workspace_id, "mia", WorkspaceRole::Admin, &ctx)
                .await
                .unwrap_err();
        assert!(matches!(err, AccessError::Forbidden(_)));

        let err =
            update_member_role(&mut store, "alice", workspace_id, "mia", WorkspaceRole::Owner, &ctx)
                .await
                .unwrap_err();
        assert!(matches!(err, AccessError::BadRequest(_)));

        let promoted =
            update_member_role(&mut store, "alice", workspace_id, "mia", WorkspaceRole::Admin, &ctx)
                .await
                .unwrap();
        assert_eq!(promoted.role, WorkspaceRole::Admin);
    }

    #[tokio::test]
    async fn insufficient_permission_is_forbidden() {
        let Team { mut store, workspace_id } = team();
        let ctx = RequestContext::new();

        let err = remove_member(&mut store, "mia", workspace_id, "vera", &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Forbidden(_)));

        let err = remove_member(&mut store, "alice", workspace_id, "nobody", &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::NotFound(_)));
    }

    #[tokio::test]
    async fn removal_logs_activity() {
        let Team { mut store, workspace_id } = team();
        let ctx = RequestContext::new();

        remove_member(&mut store, "adam", workspace_id, "mia", &ctx)
            .await
            .unwrap();

        assert_eq!(store.members_of(workspace_id).len(), 3);
        let entry = store.activities().last().unwrap();
        assert_eq!(entry.action, "member.removed");
        assert_eq!(entry.resource_id.as_deref(), Some("mia"));
    }

    #[tokio::test]
    async fn listing_includes_profiles() {
        let Team { mut store, workspace_id } = team();

        let members = list_members(&mut store, "vera", workspace_id, Pagination::default())
            .await
            .unwrap();

        assert_eq!(members.len(), 4);
        assert_eq!(members[0].member.user_id, "alice");
        assert_eq!(members[0].user.as_ref().unwrap().email, "alice@example.com");

        let err = list_members(&mut store, "mallory", workspace_id, Pagination::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Forbidden(_)));
    }
}

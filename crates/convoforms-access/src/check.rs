//! Workspace permission check.

use std::borrow::Cow;

use convoforms_postgres::PgResult;
use convoforms_postgres::model::WorkspaceMember;
use convoforms_postgres::query::WorkspaceMemberRepository;
use uuid::Uuid;

use crate::permission::{Action, Permission, Resource};
use crate::{AccessError, AccessResult, TRACING_TARGET_PERMISSION};

/// Outcome of [`check_workspace_permission`].
#[derive(Debug, Clone, PartialEq)]
pub struct PermissionCheck {
    pub granted: bool,
    /// The caller's membership, when they have one.
    pub member: Option<WorkspaceMember>,
    /// Why access was denied.
    pub reason: Option<Cow<'static, str>>,
}

impl PermissionCheck {
    pub fn granted(member: WorkspaceMember) -> Self {
        Self {
            granted: true,
            member: Some(member),
            reason: None,
        }
    }

    pub fn denied(member: Option<WorkspaceMember>, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            granted: false,
            member,
            reason: Some(reason.into()),
        }
    }

    /// Converts the check into the caller's membership, or a forbidden error.
    pub fn into_result(self) -> AccessResult<WorkspaceMember> {
        match (self.granted, self.member) {
            (true, Some(member)) => Ok(member),
            _ => Err(AccessError::forbidden(
                self.reason.unwrap_or(Cow::Borrowed("Access denied")),
            )),
        }
    }
}

/// Checks whether `user_id` may perform `action` on `resource` in a workspace.
///
/// Callers without a membership are denied with the same reason whether or
/// not the workspace exists. Pairs missing from the permission table are
/// denied for every role. Denials are not errors; only database failures are.
pub async fn check_workspace_permission<R>(
    repo: &mut R,
    user_id: &str,
    workspace_id: Uuid,
    resource: Resource,
    action: Action,
) -> PgResult<PermissionCheck>
where
    R: WorkspaceMemberRepository,
{
    let permission = Permission::new(resource, action);
    let member = repo.find_workspace_member(workspace_id, user_id).await?;

    let Some(member) = member else {
        tracing::debug!(
            target: TRACING_TARGET_PERMISSION,
            user_id = %user_id,
            workspace_id = %workspace_id,
            permission = %permission,
            "access denied: not a workspace member"
        );

        return Ok(PermissionCheck::denied(
            None,
            "You do not have access to this workspace",
        ));
    };

    let Some(required) = permission.required_role() else {
        tracing::error!(
            target: TRACING_TARGET_PERMISSION,
            user_id = %user_id,
            workspace_id = %workspace_id,
            permission = %permission,
            "access denied: permission has no entry in the permission table"
        );

        return Ok(PermissionCheck::denied(
            Some(member),
            format!("The action {permission} is not permitted"),
        ));
    };

    if member.role.has_permission_of(required) {
        tracing::debug!(
            target: TRACING_TARGET_PERMISSION,
            user_id = %user_id,
            workspace_id = %workspace_id,
            permission = %permission,
            role = %member.role,
            "access granted"
        );

        return Ok(PermissionCheck::granted(member));
    }

    tracing::warn!(
        target: TRACING_TARGET_PERMISSION,
        user_id = %user_id,
        workspace_id = %workspace_id,
        permission = %permission,
        role = %member.role,
        required = %required,
        "access denied: insufficient role"
    );

    let reason = format!(
        "The {required} role or higher is required to {action} {resource}, your role is {role}",
        role = member.role,
    );
    Ok(PermissionCheck::denied(Some(member), reason))
}

/// Like [`check_workspace_permission`], but turns a denial into
/// [`AccessError::Forbidden`] and returns the caller's membership.
pub async fn authorize<R>(
    repo: &mut R,
    user_id: &str,
    workspace_id: Uuid,
    resource: Resource,
    action: Action,
) -> AccessResult<WorkspaceMember>
where
    R: WorkspaceMemberRepository,
{
    check_workspace_permission(repo, user_id, workspace_id, resource, action)
        .await?
        .into_result()
}

#[cfg(test)]
mod tests {
    use convoforms_postgres::types::WorkspaceRole;
    use convoforms_test::MemoryStore;
    use strum::IntoEnumIterator;

    use super::*;

    #[tokio::test]
    async fn non_members_are_denied_everything() {
        let mut store = MemoryStore::new();
        let ws = store.seed_workspace("alice", "acme");
        store.seed_user("mallory");

        for resource in Resource::iter() {
            for action in Action::iter() {
                let check =
                    check_workspace_permission(&mut store, "mallory", ws.id, resource, action)
                        .await
                        .unwrap();
                assert!(!check.granted);
                assert!(check.member.is_none());
            }
        }
    }

    #[tokio::test]
    async fn missing_workspace_looks_like_missing_membership() {
        let mut store = MemoryStore::new();
        let ws = store.seed_workspace("alice", "acme");

        let existing =
            check_workspace_permission(&mut store, "bob", ws.id, Resource::Forms, Action::Read)
                .await
                .unwrap();
        let missing = check_workspace_permission(
            &mut store,
            "bob",
            Uuid::now_v7(),
            Resource::Forms,
            Action::Read,
        )
        .await
        .unwrap();

        assert_eq!(existing.reason, missing.reason);
    }

    #[tokio::test]
    async fn role_must_reach_required_rank() {
        let mut store = MemoryStore::new();
        let ws = store.seed_workspace("alice", "acme");
        store.seed_member(ws.id, "vera", WorkspaceRole::Viewer);
        store.seed_member(ws.id, "adam", WorkspaceRole::Admin);

        let viewer =
            check_workspace_permission(&mut store, "vera", ws.id, Resource::Members, Action::Invite)
                .await
                .unwrap();
        assert!(!viewer.granted);
        assert!(viewer.reason.unwrap().contains("admin"));

        let admin =
            check_workspace_permission(&mut store, "adam", ws.id, Resource::Members, Action::Invite)
                .await
                .unwrap();
        assert!(admin.granted);
        assert_eq!(admin.member.unwrap().role, WorkspaceRole::Admin);
    }

    #[tokio::test]
    async fn unmapped_pair_is_denied_even_for_owner() {
        let mut store = MemoryStore::new();
        let ws = store.seed_workspace("alice", "acme");

        let check =
            check_workspace_permission(&mut store, "alice", ws.id, Resource::Forms, Action::Invite)
                .await
                .unwrap();

        assert!(!check.granted);
    }

    #[tokio::test]
    async fn authorize_maps_denial_to_forbidden() {
        let mut store = MemoryStore::new();
        let ws = store.seed_workspace("alice", "acme");

        let err = authorize(&mut store, "bob", ws.id, Resource::Workspace, Action::Read)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Forbidden(_)));

        let member = authorize(&mut store, "alice", ws.id, Resource::Workspace, Action::Delete)
            .await
            .unwrap();
        assert!(member.is_owner());
    }
}

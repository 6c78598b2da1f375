//! Append-only activity log writer.
//!
//! Entries are written after the mutation they describe has been committed.
//! A failed write is reported through tracing and never surfaces to the
//! caller.

use std::net::IpAddr;

use convoforms_postgres::model::{
    NewWorkspaceActivity, Workspace, WorkspaceActivity, WorkspaceInvitation,
};
use convoforms_postgres::query::{
    Pagination, WorkspaceActivityRepository, WorkspaceMemberRepository,
};
use convoforms_postgres::types::WorkspaceRole;
use ipnet::IpNet;
use serde_json::{Value, json};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::check::authorize;
use crate::permission::{Action, Resource};
use crate::{AccessResult, TRACING_TARGET_ACTIVITY};

/// Longest user agent stored with an entry.
const USER_AGENT_MAX_LENGTH: usize = 512;

/// Kind of a logged activity, stored as a dotted name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumIter, EnumString, IntoStaticStr)]
pub enum ActivityAction {
    #[strum(serialize = "workspace.created")]
    WorkspaceCreated,
    #[strum(serialize = "workspace.updated")]
    WorkspaceUpdated,
    #[strum(serialize = "member.invited")]
    MemberInvited,
    #[strum(serialize = "member.joined")]
    MemberJoined,
    #[strum(serialize = "member.role_updated")]
    MemberRoleUpdated,
    #[strum(serialize = "member.removed")]
    MemberRemoved,
    #[strum(serialize = "invitation.expired")]
    InvitationExpired,
}

impl ActivityAction {
    /// Kind of resource the action applies to.
    pub const fn resource(self) -> &'static str {
        match self {
            Self::WorkspaceCreated | Self::WorkspaceUpdated => "workspace",
            Self::MemberInvited | Self::InvitationExpired => "invitation",
            Self::MemberJoined | Self::MemberRoleUpdated | Self::MemberRemoved => "member",
        }
    }
}

/// Network context of the request that caused an activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub ip_address: Option<IpNet>,
    pub user_agent: Option<String>,
    /// Human-readable client name derived from the user agent.
    pub client: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ip_address(mut self, ip_address: IpAddr) -> Self {
        self.ip_address = Some(IpNet::from(ip_address));
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        let user_agent: String = user_agent.into();
        self.user_agent = Some(user_agent.chars().take(USER_AGENT_MAX_LENGTH).collect());
        self
    }

    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }
}

/// Writes activity entries stamped with one request's context.
#[derive(Debug, Clone, Copy)]
pub struct ActivityLogger<'a> {
    ctx: &'a RequestContext,
}

impl<'a> ActivityLogger<'a> {
    pub fn new(ctx: &'a RequestContext) -> Self {
        Self { ctx }
    }

    /// Writes one entry. Failures are logged and swallowed.
    pub async fn log<R>(
        &self,
        repo: &mut R,
        workspace_id: Uuid,
        actor: Option<&str>,
        action: ActivityAction,
        resource_id: Option<String>,
        mut metadata: Value,
    ) where
        R: WorkspaceActivityRepository,
    {
        if let (Some(client), Value::Object(map)) = (&self.ctx.client, &mut metadata) {
            map.insert("client".to_string(), Value::String(client.clone()));
        }

        let entry = NewWorkspaceActivity {
            workspace_id,
            user_id: actor.map(str::to_string),
            action: action.to_string(),
            resource: action.resource().to_string(),
            resource_id,
            metadata: Some(metadata),
            ip_address: self.ctx.ip_address,
            user_agent: self.ctx.user_agent.clone(),
        };

        match repo.log_workspace_activity(entry).await {
            Ok(_) => {
                tracing::debug!(
                    target: TRACING_TARGET_ACTIVITY,
                    workspace_id = %workspace_id,
                    action = %action,
                    "activity recorded"
                );
            }
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET_ACTIVITY,
                    workspace_id = %workspace_id,
                    action = %action,
                    error = %err,
                    "failed to record activity"
                );
            }
        }
    }

    pub async fn workspace_created<R>(&self, repo: &mut R, workspace: &Workspace)
    where
        R: WorkspaceActivityRepository,
    {
        let metadata = json!({
            "name": workspace.name,
            "slug": workspace.slug,
            "type": workspace.workspace_type.to_string(),
        });

        self.log(
            repo,
            workspace.id,
            Some(&workspace.owner_id),
            ActivityAction::WorkspaceCreated,
            Some(workspace.id.to_string()),
            metadata,
        )
        .await;
    }

    /// `changed` lists the names of the updated fields.
    pub async fn workspace_updated<R>(
        &self,
        repo: &mut R,
        workspace_id: Uuid,
        actor: &str,
        changed: &[&str],
    ) where
        R: WorkspaceActivityRepository,
    {
        self.log(
            repo,
            workspace_id,
            Some(actor),
            ActivityAction::WorkspaceUpdated,
            Some(workspace_id.to_string()),
            json!({ "changed": changed }),
        )
        .await;
    }

    pub async fn member_invited<R>(&self, repo: &mut R, actor: &str, invitation: &WorkspaceInvitation)
    where
        R: WorkspaceActivityRepository,
    {
        let metadata = json!({
            "email": invitation.email,
            "role": invitation.role.to_string(),
        });

        self.log(
            repo,
            invitation.workspace_id,
            Some(actor),
            ActivityAction::MemberInvited,
            Some(invitation.id.to_string()),
            metadata,
        )
        .await;
    }

    pub async fn member_joined<R>(
        &self,
        repo: &mut R,
        workspace_id: Uuid,
        user_id: &str,
        role: WorkspaceRole,
        invitation_id: Option<Uuid>,
    ) where
        R: WorkspaceActivityRepository,
    {
        let metadata = json!({
            "role": role.to_string(),
            "invitationId": invitation_id,
        });

        self.log(
            repo,
            workspace_id,
            Some(user_id),
            ActivityAction::MemberJoined,
            Some(user_id.to_string()),
            metadata,
        )
        .await;
    }

    pub async fn member_role_updated<R>(
        &self,
        repo: &mut R,
        workspace_id: Uuid,
        actor: &str,
        target_user_id: &str,
        from: WorkspaceRole,
        to: WorkspaceRole,
    ) where
        R: WorkspaceActivityRepository,
    {
        let metadata = json!({
            "previousRole": from.to_string(),
            "newRole": to.to_string(),
        });

        self.log(
            repo,
            workspace_id,
            Some(actor),
            ActivityAction::MemberRoleUpdated,
            Some(target_user_id.to_string()),
            metadata,
        )
        .await;
    }

    pub async fn member_removed<R>(
        &self,
        repo: &mut R,
        workspace_id: Uuid,
        actor: &str,
        target_user_id: &str,
        role: WorkspaceRole,
    ) where
        R: WorkspaceActivityRepository,
    {
        self.log(
            repo,
            workspace_id,
            Some(actor),
            ActivityAction::MemberRemoved,
            Some(target_user_id.to_string()),
            json!({ "role": role.to_string() }),
        )
        .await;
    }

    /// Records the lazy expiry of an invitation. There is no acting user.
    pub async fn invitation_expired<R>(&self, repo: &mut R, invitation: &WorkspaceInvitation)
    where
        R: WorkspaceActivityRepository,
    {
        self.log(
            repo,
            invitation.workspace_id,
            None,
            ActivityAction::InvitationExpired,
            Some(invitation.id.to_string()),
            json!({ "email": invitation.email }),
        )
        .await;
    }
}

/// Lists a workspace's activity, newest first. Requires `workspace.read`.
pub async fn list_workspace_activity<R>(
    repo: &mut R,
    user_id: &str,
    workspace_id: Uuid,
    pagination: Pagination,
) -> AccessResult<Vec<WorkspaceActivity>>
where
    R: WorkspaceMemberRepository + WorkspaceActivityRepository,
{
    authorize(repo, user_id, workspace_id, Resource::Workspace, Action::Read).await?;
    let activities = repo.list_workspace_activity(workspace_id, pagination).await?;
    Ok(activities)
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use convoforms_test::MemoryStore;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::AccessError;

    #[test]
    fn action_names_are_dotted() {
        for action in ActivityAction::iter() {
            let name = action.to_string();
            let (resource, verb) = name.split_once('.').unwrap();
            assert!(!resource.is_empty() && !verb.is_empty(), "{name}");
            assert_eq!(name.parse::<ActivityAction>().unwrap(), action);
        }
        assert_eq!(ActivityAction::MemberRoleUpdated.to_string(), "member.role_updated");
    }

    #[tokio::test]
    async fn entries_carry_request_context() {
        let mut store = MemoryStore::new();
        let ws = store.seed_workspace("alice", "acme");
        let ctx = RequestContext::new()
            .with_ip_address(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7)))
            .with_user_agent("Mozilla/5.0")
            .with_client("Firefox 121 on Linux (Desktop)");

        ActivityLogger::new(&ctx)
            .member_removed(&mut store, ws.id, "alice", "bob", WorkspaceRole::Member)
            .await;

        let entry = &store.activities()[0];
        assert_eq!(entry.action, "member.removed");
        assert_eq!(entry.resource, "member");
        assert_eq!(entry.resource_id.as_deref(), Some("bob"));
        assert_eq!(entry.user_id.as_deref(), Some("alice"));
        assert_eq!(entry.ip_address.unwrap().addr().to_string(), "203.0.113.7");
        assert_eq!(entry.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(entry.metadata["client"], "Firefox 121 on Linux (Desktop)");
        assert_eq!(entry.metadata["role"], "member");
    }

    #[tokio::test]
    async fn write_failures_are_swallowed() {
        let mut store = MemoryStore::new();
        let ws = store.seed_workspace("alice", "acme");
        store.fail_activity_log(true);
        let ctx = RequestContext::new();

        ActivityLogger::new(&ctx)
            .workspace_updated(&mut store, ws.id, "alice", &["name"])
            .await;

        assert!(store.activities().is_empty());
    }

    #[test]
    fn long_user_agents_are_truncated() {
        let ctx = RequestContext::new().with_user_agent("x".repeat(2000));
        assert_eq!(ctx.user_agent.unwrap().len(), USER_AGENT_MAX_LENGTH);
    }

    #[tokio::test]
    async fn listing_requires_workspace_read() {
        let mut store = MemoryStore::new();
        let ws = store.seed_workspace("alice", "acme");
        let ctx = RequestContext::new();
        let logger = ActivityLogger::new(&ctx);
        logger.workspace_created(&mut store, &ws).await;
        logger.workspace_updated(&mut store, ws.id, "alice", &["name"]).await;

        let entries = list_workspace_activity(&mut store, "alice", ws.id, Pagination::default())
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "workspace.updated");

        let err = list_workspace_activity(&mut store, "mallory", ws.id, Pagination::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Forbidden(_)));
    }
}

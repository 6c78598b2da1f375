//! Seeding helpers.
//!
//! Seeds bypass quotas and permission checks, so tests can put the store in
//! any state before exercising an operation.

use convoforms_postgres::model::{
    NewUser, Subscription, User, Workspace, WorkspaceInvitation, WorkspaceMember,
};
use convoforms_postgres::types::{
    EmailStatus, InvitationStatus, SubscriptionPlan, SubscriptionStatus, WorkspaceRole,
    WorkspaceType,
};
use uuid::Uuid;

use crate::MemoryStore;

/// Email address used for the user `id`.
pub fn test_email(id: &str) -> String {
    format!("{id}@example.com")
}

/// Profile of the user `id` as the identity provider would report it.
pub fn test_user(id: &str) -> NewUser {
    NewUser {
        id: id.to_string(),
        email: test_email(id),
        first_name: Some(id.to_string()),
        last_name: None,
        avatar_url: None,
    }
}

fn now() -> jiff_diesel::Timestamp {
    jiff::Timestamp::now().into()
}

impl MemoryStore {
    /// Inserts the user `id` unless it already exists.
    pub fn seed_user(&mut self, id: &str) -> User {
        if let Some(user) = self.users.iter().find(|u| u.id == id) {
            return user.clone();
        }

        let profile = test_user(id);
        let user = User {
            id: profile.id,
            email: profile.email,
            first_name: profile.first_name,
            last_name: profile.last_name,
            avatar_url: profile.avatar_url,
            created_at: now(),
            updated_at: now(),
        };
        self.users.push(user.clone());
        user
    }

    /// Gives `user_id` an active subscription on `plan`, replacing any other.
    pub fn seed_subscription(&mut self, user_id: &str, plan: SubscriptionPlan) -> Subscription {
        self.seed_user(user_id);
        self.subscriptions.retain(|s| s.user_id != user_id);

        let subscription = Subscription {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            plan,
            status: SubscriptionStatus::Active,
            max_workspaces: None,
            max_seats_per_workspace: None,
            addon_seats: 0,
            current_period_end: None,
            created_at: now(),
            updated_at: now(),
        };
        self.subscriptions.push(subscription.clone());
        subscription
    }

    /// Edits the subscription of `user_id` in place.
    ///
    /// # Panics
    ///
    /// Panics when the user has no subscription.
    pub fn edit_subscription(&mut self, user_id: &str, edit: impl FnOnce(&mut Subscription)) {
        let subscription = self
            .subscriptions
            .iter_mut()
            .find(|s| s.user_id == user_id)
            .unwrap_or_else(|| panic!("no subscription seeded for {user_id}"));
        edit(subscription);
    }

    /// Creates a team workspace owned by `owner_id`, with its owner membership.
    pub fn seed_workspace(&mut self, owner_id: &str, slug: &str) -> Workspace {
        self.seed_user(owner_id);

        let workspace = Workspace {
            id: Uuid::now_v7(),
            name: slug.replace('-', " "),
            slug: slug.to_string(),
            workspace_type: WorkspaceType::Team,
            owner_id: owner_id.to_string(),
            description: None,
            settings: serde_json::json!({}),
            created_at: now(),
            updated_at: now(),
        };
        self.workspaces.push(workspace.clone());
        self.seed_member(workspace.id, owner_id, WorkspaceRole::Owner);
        workspace
    }

    /// Adds `user_id` to a workspace with `role`, replacing an existing membership.
    pub fn seed_member(
        &mut self,
        workspace_id: Uuid,
        user_id: &str,
        role: WorkspaceRole,
    ) -> WorkspaceMember {
        self.seed_user(user_id);
        self.members
            .retain(|m| !(m.workspace_id == workspace_id && m.user_id == user_id));

        let member = WorkspaceMember {
            workspace_id,
            user_id: user_id.to_string(),
            role,
            invited_by: None,
            joined_at: now(),
            last_seen_at: None,
        };
        self.members.push(member.clone());
        member
    }

    /// Inserts a pending invitation with the given token and expiry.
    pub fn seed_invitation(
        &mut self,
        workspace_id: Uuid,
        email: &str,
        role: WorkspaceRole,
        token: &str,
        expires_at: jiff::Timestamp,
    ) -> WorkspaceInvitation {
        let invited_by = self
            .workspaces
            .iter()
            .find(|w| w.id == workspace_id)
            .map(|w| w.owner_id.clone())
            .unwrap_or_default();

        let invitation = WorkspaceInvitation {
            id: Uuid::now_v7(),
            workspace_id,
            email: email.to_lowercase(),
            role,
            token: token.to_string(),
            status: InvitationStatus::Pending,
            expires_at: expires_at.into(),
            email_status: EmailStatus::Sent,
            email_sent_at: Some(now()),
            invited_by,
            accepted_by: None,
            accepted_at: None,
            created_at: now(),
            updated_at: now(),
        };
        self.invitations.push(invitation.clone());
        invitation
    }

    /// Looks up an invitation by id.
    pub fn invitation(&self, invitation_id: Uuid) -> Option<&WorkspaceInvitation> {
        self.invitations.iter().find(|i| i.id == invitation_id)
    }
}

#[cfg(test)]
mod tests {
    use convoforms_postgres::model::{NewWorkspace, NewWorkspaceMember};
    use convoforms_postgres::query::{
        InvitationAcceptance, WorkspaceInvitationRepository, WorkspaceMemberRepository,
        WorkspaceRepository,
    };
    use convoforms_postgres::types::{ConstraintViolation, WorkspaceConstraints};

    use super::*;

    #[tokio::test]
    async fn slug_conflict_reports_constraint() {
        let mut store = MemoryStore::new();
        store.seed_workspace("alice", "acme");

        let err = store
            .create_workspace_with_owner(NewWorkspace::new("bob", "Acme", "acme"), None)
            .await
            .unwrap_err();

        assert!(err.is_unique_violation());
        assert_eq!(
            err.constraint_violation(),
            Some(ConstraintViolation::Workspace(WorkspaceConstraints::SlugUnique))
        );
    }

    #[tokio::test]
    async fn owned_cap_blocks_creation() {
        let mut store = MemoryStore::new();
        store.seed_workspace("alice", "one");

        let created = store
            .create_workspace_with_owner(NewWorkspace::new("alice", "Two", "two"), Some(1))
            .await
            .unwrap();

        assert!(created.is_none());
        assert_eq!(store.workspaces().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_member_is_rejected() {
        let mut store = MemoryStore::new();
        let ws = store.seed_workspace("alice", "acme");

        let err = store
            .add_workspace_member(NewWorkspaceMember::new(ws.id, "alice", WorkspaceRole::Viewer))
            .await
            .unwrap_err();

        assert_eq!(err.constraint(), Some("workspace_members_pkey"));
        assert_eq!(store.count_workspace_members(ws.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn accept_only_applies_once() {
        let mut store = MemoryStore::new();
        let ws = store.seed_workspace("alice", "acme");
        let expires = jiff::Timestamp::now() + jiff::SignedDuration::from_hours(1);
        let invitation =
            store.seed_invitation(ws.id, "bob@example.com", WorkspaceRole::Member, "tok", expires);

        let first = store
            .accept_workspace_invitation(
                invitation.id,
                NewWorkspaceMember::new(ws.id, "bob", WorkspaceRole::Member),
                jiff::Timestamp::now(),
                None,
            )
            .await
            .unwrap();
        let second = store
            .accept_workspace_invitation(
                invitation.id,
                NewWorkspaceMember::new(ws.id, "bob", WorkspaceRole::Member),
                jiff::Timestamp::now(),
                None,
            )
            .await
            .unwrap();

        assert!(matches!(first, InvitationAcceptance::Accepted(_)));
        assert_eq!(second, InvitationAcceptance::NotPending);
        let stored = store.invitation(invitation.id).unwrap();
        assert_eq!(stored.status, InvitationStatus::Accepted);
        assert!(stored.status.is_terminal());
        assert_eq!(stored.accepted_by.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn accept_stops_at_seat_limit() {
        let mut store = MemoryStore::new();
        let ws = store.seed_workspace("alice", "acme");
        store.seed_member(ws.id, "carol", WorkspaceRole::Member);
        let expires = jiff::Timestamp::now() + jiff::SignedDuration::from_hours(1);
        let invitation =
            store.seed_invitation(ws.id, "bob@example.com", WorkspaceRole::Member, "tok", expires);

        let outcome = store
            .accept_workspace_invitation(
                invitation.id,
                NewWorkspaceMember::new(ws.id, "bob", WorkspaceRole::Member),
                jiff::Timestamp::now(),
                Some(2),
            )
            .await
            .unwrap();

        assert_eq!(outcome, InvitationAcceptance::SeatLimitReached);
        assert_eq!(store.members_of(ws.id).len(), 2);
        let stored = store.invitation(invitation.id).unwrap();
        assert_eq!(stored.status, InvitationStatus::Pending);
    }

    #[tokio::test]
    async fn members_list_highest_role_first() {
        let mut store = MemoryStore::new();
        let ws = store.seed_workspace("alice", "acme");
        store.seed_member(ws.id, "carol", WorkspaceRole::Viewer);
        store.seed_member(ws.id, "dave", WorkspaceRole::Admin);

        let members = store
            .list_workspace_members(ws.id, Default::default())
            .await
            .unwrap();
        let roles: Vec<_> = members.iter().map(|m| m.role).collect();

        assert_eq!(
            roles,
            [WorkspaceRole::Owner, WorkspaceRole::Admin, WorkspaceRole::Viewer]
        );
    }
}

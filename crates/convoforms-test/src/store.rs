//! In-memory implementation of the repository traits.

use convoforms_postgres::PgError;
use convoforms_postgres::error::{DatabaseErrorInformation, DatabaseErrorKind, DieselError};
use convoforms_postgres::model::{
    NewSubscription, NewUser, NewWorkspace, NewWorkspaceActivity, NewWorkspaceInvitation,
    NewWorkspaceMember, Subscription, UpdateSubscription, UpdateWorkspace,
    UpdateWorkspaceInvitation, UpdateWorkspaceMember, User, Workspace, WorkspaceActivity,
    WorkspaceInvitation, WorkspaceMember,
};
use convoforms_postgres::query::{
    InvitationAcceptance, Pagination, SubscriptionRepository, UserRepository,
    WorkspaceActivityRepository, WorkspaceInvitationRepository, WorkspaceMemberRepository,
    WorkspaceRepository,
};
use convoforms_postgres::types::{InvitationStatus, WorkspaceType};
use jiff_diesel::Timestamp;
use uuid::Uuid;

/// Constraint information attached to simulated database errors.
#[derive(Debug)]
struct ConstraintInfo {
    constraint: &'static str,
}

impl DatabaseErrorInformation for ConstraintInfo {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint"
    }

    fn details(&self) -> Option<&str> {
        None
    }

    fn hint(&self) -> Option<&str> {
        None
    }

    fn table_name(&self) -> Option<&str> {
        None
    }

    fn column_name(&self) -> Option<&str> {
        None
    }

    fn constraint_name(&self) -> Option<&str> {
        Some(self.constraint)
    }

    fn statement_position(&self) -> Option<i32> {
        None
    }
}

/// Builds the error Postgres reports when `constraint` rejects a write.
pub fn unique_violation(constraint: &'static str) -> PgError {
    PgError::Query(DieselError::DatabaseError(
        DatabaseErrorKind::UniqueViolation,
        Box::new(ConstraintInfo { constraint }),
    ))
}

fn not_found() -> PgError {
    PgError::Query(DieselError::NotFound)
}

fn now() -> Timestamp {
    jiff::Timestamp::now().into()
}

fn instant(ts: Timestamp) -> jiff::Timestamp {
    jiff::Timestamp::from(ts)
}

fn page<T: Clone>(items: impl Iterator<Item = T>, pagination: Pagination) -> Vec<T> {
    items
        .skip(pagination.offset as usize)
        .take(pagination.limit as usize)
        .collect()
}

/// Whole database state held in memory.
///
/// Every write enforces the same unique constraints as the migrations and
/// reports violations with the real constraint names. Transactional methods
/// either apply all of their writes or none.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(crate) users: Vec<User>,
    pub(crate) workspaces: Vec<Workspace>,
    pub(crate) members: Vec<WorkspaceMember>,
    pub(crate) invitations: Vec<WorkspaceInvitation>,
    pub(crate) subscriptions: Vec<Subscription>,
    pub(crate) activities: Vec<WorkspaceActivity>,
    fail_activity_log: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every activity insert fail, to exercise best-effort logging.
    pub fn fail_activity_log(&mut self, fail: bool) {
        self.fail_activity_log = fail;
    }

    pub fn activities(&self) -> &[WorkspaceActivity] {
        &self.activities
    }

    pub fn invitations(&self) -> &[WorkspaceInvitation] {
        &self.invitations
    }

    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    /// Memberships of `workspace_id`, in insertion order.
    pub fn members_of(&self, workspace_id: Uuid) -> Vec<&WorkspaceMember> {
        self.members
            .iter()
            .filter(|m| m.workspace_id == workspace_id)
            .collect()
    }

    fn insert_member(&mut self, member: NewWorkspaceMember) -> Result<WorkspaceMember, PgError> {
        let exists = self
            .members
            .iter()
            .any(|m| m.workspace_id == member.workspace_id && m.user_id == member.user_id);
        if exists {
            return Err(unique_violation("workspace_members_pkey"));
        }

        let member = WorkspaceMember {
            workspace_id: member.workspace_id,
            user_id: member.user_id,
            role: member.role,
            invited_by: member.invited_by,
            joined_at: now(),
            last_seen_at: None,
        };
        self.members.push(member.clone());
        Ok(member)
    }

    fn check_workspace_unique(&self, workspace: &NewWorkspace) -> Result<(), PgError> {
        if self.workspaces.iter().any(|w| w.slug == workspace.slug) {
            return Err(unique_violation("workspaces_slug_unique"));
        }

        let second_default = workspace.workspace_type == WorkspaceType::Default
            && self.workspaces.iter().any(|w| {
                w.owner_id == workspace.owner_id && w.workspace_type == WorkspaceType::Default
            });
        if second_default {
            return Err(unique_violation("workspaces_one_default_per_owner"));
        }

        Ok(())
    }
}

fn apply_invitation_changes(invitation: &mut WorkspaceInvitation, changes: UpdateWorkspaceInvitation) {
    if let Some(status) = changes.status {
        invitation.status = status;
    }
    if let Some(email_status) = changes.email_status {
        invitation.email_status = email_status;
    }
    if let Some(email_sent_at) = changes.email_sent_at {
        invitation.email_sent_at = email_sent_at;
    }
    if let Some(accepted_by) = changes.accepted_by {
        invitation.accepted_by = accepted_by;
    }
    if let Some(accepted_at) = changes.accepted_at {
        invitation.accepted_at = accepted_at;
    }
    invitation.updated_at = now();
}

impl UserRepository for MemoryStore {
    async fn upsert_user(&mut self, user: NewUser) -> Result<User, PgError> {
        let email_taken = self
            .users
            .iter()
            .any(|u| u.email == user.email && u.id != user.id);
        if email_taken {
            return Err(unique_violation("users_email_unique"));
        }

        if let Some(existing) = self.users.iter_mut().find(|u| u.id == user.id) {
            existing.email = user.email;
            existing.first_name = user.first_name;
            existing.last_name = user.last_name;
            existing.avatar_url = user.avatar_url;
            existing.updated_at = now();
            return Ok(existing.clone());
        }

        let user = User {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            avatar_url: user.avatar_url,
            created_at: now(),
            updated_at: now(),
        };
        self.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&mut self, user_id: &str) -> Result<Option<User>, PgError> {
        Ok(self.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, PgError> {
        Ok(self.users.iter().find(|u| u.email == email).cloned())
    }
}

impl SubscriptionRepository for MemoryStore {
    async fn find_subscription_by_user(
        &mut self,
        user_id: &str,
    ) -> Result<Option<Subscription>, PgError> {
        Ok(self
            .subscriptions
            .iter()
            .find(|s| s.user_id == user_id)
            .cloned())
    }

    async fn ensure_subscription(
        &mut self,
        subscription: NewSubscription,
    ) -> Result<Subscription, PgError> {
        if let Some(existing) = self
            .subscriptions
            .iter()
            .find(|s| s.user_id == subscription.user_id)
        {
            return Ok(existing.clone());
        }

        let subscription = Subscription {
            id: subscription.id,
            user_id: subscription.user_id,
            plan: subscription.plan,
            status: subscription.status,
            max_workspaces: None,
            max_seats_per_workspace: None,
            addon_seats: 0,
            current_period_end: None,
            created_at: now(),
            updated_at: now(),
        };
        self.subscriptions.push(subscription.clone());
        Ok(subscription)
    }

    async fn update_subscription(
        &mut self,
        user_id: &str,
        changes: UpdateSubscription,
    ) -> Result<Subscription, PgError> {
        let subscription = self
            .subscriptions
            .iter_mut()
            .find(|s| s.user_id == user_id)
            .ok_or_else(not_found)?;

        if let Some(plan) = changes.plan {
            subscription.plan = plan;
        }
        if let Some(status) = changes.status {
            subscription.status = status;
        }
        if let Some(max_workspaces) = changes.max_workspaces {
            subscription.max_workspaces = max_workspaces;
        }
        if let Some(max_seats) = changes.max_seats_per_workspace {
            subscription.max_seats_per_workspace = max_seats;
        }
        if let Some(addon_seats) = changes.addon_seats {
            subscription.addon_seats = addon_seats;
        }
        if let Some(period_end) = changes.current_period_end {
            subscription.current_period_end = period_end;
        }
        subscription.updated_at = now();

        Ok(subscription.clone())
    }
}

impl WorkspaceRepository for MemoryStore {
    async fn find_workspace_by_id(&mut self, workspace_id: Uuid) -> Result<Option<Workspace>, PgError> {
        Ok(self.workspaces.iter().find(|w| w.id == workspace_id).cloned())
    }

    async fn find_workspace_by_slug(&mut self, slug: &str) -> Result<Option<Workspace>, PgError> {
        Ok(self.workspaces.iter().find(|w| w.slug == slug).cloned())
    }

    async fn find_default_workspace(&mut self, owner_id: &str) -> Result<Option<Workspace>, PgError> {
        Ok(self
            .workspaces
            .iter()
            .find(|w| w.owner_id == owner_id && w.workspace_type == WorkspaceType::Default)
            .cloned())
    }

    async fn count_owned_workspaces(&mut self, owner_id: &str) -> Result<i64, PgError> {
        Ok(self.workspaces.iter().filter(|w| w.owner_id == owner_id).count() as i64)
    }

    async fn create_workspace_with_owner(
        &mut self,
        workspace: NewWorkspace,
        max_owned: Option<i64>,
    ) -> Result<Option<(Workspace, WorkspaceMember)>, PgError> {
        if let Some(limit) = max_owned {
            let owned = self
                .workspaces
                .iter()
                .filter(|w| w.owner_id == workspace.owner_id)
                .count() as i64;
            if owned >= limit {
                return Ok(None);
            }
        }

        self.check_workspace_unique(&workspace)?;

        let created = Workspace {
            id: workspace.id,
            name: workspace.name,
            slug: workspace.slug,
            workspace_type: workspace.workspace_type,
            owner_id: workspace.owner_id,
            description: workspace.description,
            settings: workspace
                .settings
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            created_at: now(),
            updated_at: now(),
        };

        let member = self.insert_member(NewWorkspaceMember::new_owner(
            created.id,
            created.owner_id.clone(),
        ))?;
        self.workspaces.push(created.clone());

        Ok(Some((created, member)))
    }

    async fn update_workspace(
        &mut self,
        workspace_id: Uuid,
        changes: UpdateWorkspace,
    ) -> Result<Workspace, PgError> {
        if changes.is_empty() {
            return Err(PgError::Query(DieselError::QueryBuilderError(
                "There are no changes to save".into(),
            )));
        }

        let workspace = self
            .workspaces
            .iter_mut()
            .find(|w| w.id == workspace_id)
            .ok_or_else(not_found)?;

        if let Some(name) = changes.name {
            workspace.name = name;
        }
        if let Some(description) = changes.description {
            workspace.description = description;
        }
        if let Some(settings) = changes.settings {
            workspace.settings = settings;
        }
        workspace.updated_at = now();

        Ok(workspace.clone())
    }

    async fn list_user_workspaces(
        &mut self,
        user_id: &str,
        pagination: Pagination,
    ) -> Result<Vec<(Workspace, WorkspaceMember)>, PgError> {
        let joined = self.workspaces.iter().filter_map(|w| {
            self.members
                .iter()
                .find(|m| m.workspace_id == w.id && m.user_id == user_id)
                .map(|m| (w.clone(), m.clone()))
        });

        Ok(page(joined, pagination))
    }
}

impl WorkspaceMemberRepository for MemoryStore {
    async fn find_workspace_member(
        &mut self,
        workspace_id: Uuid,
        user_id: &str,
    ) -> Result<Option<WorkspaceMember>, PgError> {
        Ok(self
            .members
            .iter()
            .find(|m| m.workspace_id == workspace_id && m.user_id == user_id)
            .cloned())
    }

    async fn add_workspace_member(
        &mut self,
        member: NewWorkspaceMember,
    ) -> Result<WorkspaceMember, PgError> {
        self.insert_member(member)
    }

    async fn update_workspace_member(
        &mut self,
        workspace_id: Uuid,
        user_id: &str,
        changes: UpdateWorkspaceMember,
    ) -> Result<WorkspaceMember, PgError> {
        let member = self
            .members
            .iter_mut()
            .find(|m| m.workspace_id == workspace_id && m.user_id == user_id)
            .ok_or_else(not_found)?;

        if let Some(role) = changes.role {
            member.role = role;
        }
        if let Some(last_seen_at) = changes.last_seen_at {
            member.last_seen_at = last_seen_at;
        }

        Ok(member.clone())
    }

    async fn remove_workspace_member(
        &mut self,
        workspace_id: Uuid,
        user_id: &str,
    ) -> Result<bool, PgError> {
        let before = self.members.len();
        self.members
            .retain(|m| !(m.workspace_id == workspace_id && m.user_id == user_id));
        Ok(self.members.len() < before)
    }

    async fn list_workspace_members(
        &mut self,
        workspace_id: Uuid,
        pagination: Pagination,
    ) -> Result<Vec<WorkspaceMember>, PgError> {
        let mut members: Vec<_> = self
            .members
            .iter()
            .filter(|m| m.workspace_id == workspace_id)
            .cloned()
            .collect();
        members.sort_by(|a, b| {
            b.role
                .cmp(&a.role)
                .then_with(|| instant(a.joined_at).cmp(&instant(b.joined_at)))
        });

        Ok(page(members.into_iter(), pagination))
    }

    async fn count_workspace_members(&mut self, workspace_id: Uuid) -> Result<i64, PgError> {
        Ok(self
            .members
            .iter()
            .filter(|m| m.workspace_id == workspace_id)
            .count() as i64)
    }
}

impl WorkspaceInvitationRepository for MemoryStore {
    async fn create_workspace_invitation(
        &mut self,
        invitation: NewWorkspaceInvitation,
    ) -> Result<WorkspaceInvitation, PgError> {
        if self.invitations.iter().any(|i| i.token == invitation.token) {
            return Err(unique_violation("workspace_invitations_token_unique"));
        }

        let duplicate_pending = self.invitations.iter().any(|i| {
            i.workspace_id == invitation.workspace_id
                && i.email == invitation.email
                && i.status == InvitationStatus::Pending
        });
        if duplicate_pending {
            return Err(unique_violation(
                "workspace_invitations_one_pending_per_email",
            ));
        }

        let created = WorkspaceInvitation {
            id: invitation.id,
            workspace_id: invitation.workspace_id,
            email: invitation.email,
            role: invitation.role,
            token: invitation.token,
            status: InvitationStatus::Pending,
            expires_at: invitation.expires_at,
            email_status: Default::default(),
            email_sent_at: None,
            invited_by: invitation.invited_by,
            accepted_by: None,
            accepted_at: None,
            created_at: now(),
            updated_at: now(),
        };
        self.invitations.push(created.clone());
        Ok(created)
    }

    async fn find_invitation_by_token(
        &mut self,
        token: &str,
    ) -> Result<Option<WorkspaceInvitation>, PgError> {
        Ok(self.invitations.iter().find(|i| i.token == token).cloned())
    }

    async fn find_pending_invitation(
        &mut self,
        workspace_id: Uuid,
        email: &str,
    ) -> Result<Option<WorkspaceInvitation>, PgError> {
        Ok(self
            .invitations
            .iter()
            .find(|i| {
                i.workspace_id == workspace_id
                    && i.email == email
                    && i.status == InvitationStatus::Pending
            })
            .cloned())
    }

    async fn update_workspace_invitation(
        &mut self,
        invitation_id: Uuid,
        changes: UpdateWorkspaceInvitation,
    ) -> Result<WorkspaceInvitation, PgError> {
        let invitation = self
            .invitations
            .iter_mut()
            .find(|i| i.id == invitation_id)
            .ok_or_else(not_found)?;

        apply_invitation_changes(invitation, changes);
        Ok(invitation.clone())
    }

    async fn accept_workspace_invitation(
        &mut self,
        invitation_id: Uuid,
        member: NewWorkspaceMember,
        accepted_at: jiff::Timestamp,
        max_seats: Option<i64>,
    ) -> Result<InvitationAcceptance, PgError> {
        if let Some(limit) = max_seats {
            let seated = self.members_of(member.workspace_id).len() as i64;
            if seated >= limit {
                return Ok(InvitationAcceptance::SeatLimitReached);
            }
        }

        let pending = self
            .invitations
            .iter()
            .any(|i| i.id == invitation_id && i.status == InvitationStatus::Pending);
        if !pending {
            return Ok(InvitationAcceptance::NotPending);
        }

        let changes = UpdateWorkspaceInvitation::accepted(&member.user_id, accepted_at);
        let member = self.insert_member(member)?;
        if let Some(invitation) = self.invitations.iter_mut().find(|i| i.id == invitation_id) {
            apply_invitation_changes(invitation, changes);
        }

        Ok(InvitationAcceptance::Accepted(member))
    }
}

impl WorkspaceActivityRepository for MemoryStore {
    async fn log_workspace_activity(
        &mut self,
        activity: NewWorkspaceActivity,
    ) -> Result<WorkspaceActivity, PgError> {
        if self.fail_activity_log {
            return Err(PgError::Unexpected("activity log unavailable".into()));
        }

        let activity = WorkspaceActivity {
            id: Uuid::now_v7(),
            workspace_id: activity.workspace_id,
            user_id: activity.user_id,
            action: activity.action,
            resource: activity.resource,
            resource_id: activity.resource_id,
            metadata: activity
                .metadata
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            ip_address: activity.ip_address,
            user_agent: activity.user_agent,
            created_at: now(),
        };
        self.activities.push(activity.clone());
        Ok(activity)
    }

    async fn list_workspace_activity(
        &mut self,
        workspace_id: Uuid,
        pagination: Pagination,
    ) -> Result<Vec<WorkspaceActivity>, PgError> {
        let newest_first = self
            .activities
            .iter()
            .rev()
            .filter(|a| a.workspace_id == workspace_id)
            .cloned();

        Ok(page(newest_first, pagination))
    }
}

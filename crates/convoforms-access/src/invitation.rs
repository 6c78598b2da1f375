//! Invitation lifecycle: `pending -> accepted | expired`.
//!
//! Expiry is applied lazily. Whenever a pending invitation is read past its
//! expiry, on validation, on acceptance or when re-inviting the same email,
//! the `expired` status is persisted before anything else happens.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use convoforms_postgres::model::{
    NewWorkspaceInvitation, NewWorkspaceMember, UpdateWorkspaceInvitation, Workspace,
    WorkspaceInvitation, WorkspaceMember,
};
use convoforms_postgres::query::{
    InvitationAcceptance, SubscriptionRepository, UserRepository, WorkspaceActivityRepository,
    WorkspaceInvitationRepository, WorkspaceMemberRepository, WorkspaceRepository,
};
use convoforms_postgres::types::{
    ConstraintViolation, EmailStatus, InvitationStatus, WorkspaceInvitationConstraints,
    WorkspaceMemberConstraints, WorkspaceRole,
};
use jiff::{SignedDuration, Timestamp};
use uuid::Uuid;

use crate::activity::{ActivityLogger, RequestContext};
use crate::check::authorize;
use crate::mail::{InvitationEmail, InvitationMailer, WelcomeEmail};
use crate::permission::{Action, Resource};
use crate::plan::QuotaLimit;
use crate::quota::{can_invite_to_workspace, load_limits, seat_limit_reason};
use crate::{AccessError, AccessResult, TRACING_TARGET_INVITATION};

/// How long an invitation stays valid.
pub const INVITATION_TTL: SignedDuration = SignedDuration::from_hours(7 * 24);

/// Random bytes in an invitation token.
const TOKEN_BYTES: usize = 32;

/// Generates an opaque, URL-safe invitation token.
pub fn generate_invitation_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Trims and lowercases an email address, rejecting obviously invalid ones.
pub(crate) fn normalize_email(email: &str) -> AccessResult<String> {
    let email = email.trim().to_lowercase();

    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        })
        && !email.chars().any(char::is_whitespace);

    if !valid {
        return Err(AccessError::bad_request("Invalid email address"));
    }

    Ok(email)
}

/// An invitation as shown to the person holding its token.
#[derive(Debug, Clone, PartialEq)]
pub struct InvitationView {
    pub invitation: WorkspaceInvitation,
    pub workspace_name: String,
    pub workspace_slug: String,
    pub inviter_name: Option<String>,
}

impl InvitationView {
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.invitation.status == InvitationStatus::Expired
    }
}

/// Result of a successful acceptance.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedInvitation {
    pub invitation_id: Uuid,
    pub workspace: Workspace,
    pub member: WorkspaceMember,
}

/// Persists the `expired` status of a pending invitation past its expiry.
async fn expire<R>(
    repo: &mut R,
    invitation: &WorkspaceInvitation,
    ctx: &RequestContext,
) -> AccessResult<WorkspaceInvitation>
where
    R: WorkspaceInvitationRepository + WorkspaceActivityRepository,
{
    let expired = repo
        .update_workspace_invitation(invitation.id, UpdateWorkspaceInvitation::expired())
        .await?;

    tracing::info!(
        target: TRACING_TARGET_INVITATION,
        invitation_id = %invitation.id,
        workspace_id = %invitation.workspace_id,
        "invitation expired"
    );

    ActivityLogger::new(ctx)
        .invitation_expired(repo, &expired)
        .await;

    Ok(expired)
}

/// Invites `email` to a workspace with `role`.
///
/// Checks run in order: `members.invite` permission, input, seat quota,
/// existing membership and an existing pending invitation. The invitation
/// email is sent best-effort and its outcome recorded on the invitation.
pub async fn create_invitation<R>(
    repo: &mut R,
    mailer: &dyn InvitationMailer,
    inviter_id: &str,
    workspace_id: Uuid,
    email: &str,
    role: WorkspaceRole,
    ctx: &RequestContext,
) -> AccessResult<WorkspaceInvitation>
where
    R: UserRepository
        + SubscriptionRepository
        + WorkspaceRepository
        + WorkspaceMemberRepository
        + WorkspaceInvitationRepository
        + WorkspaceActivityRepository,
{
    authorize(repo, inviter_id, workspace_id, Resource::Members, Action::Invite).await?;

    if role.is_owner() {
        return Err(AccessError::bad_request(
            "Invitations cannot grant the owner role",
        ));
    }
    let email = normalize_email(email)?;

    can_invite_to_workspace(repo, workspace_id, Some(inviter_id))
        .await?
        .into_result()?;

    if let Some(invitee) = repo.find_user_by_email(&email).await? {
        let membership = repo.find_workspace_member(workspace_id, &invitee.id).await?;
        if membership.is_some() {
            return Err(AccessError::conflict(
                "This user is already a member of the workspace",
            ));
        }
    }

    let now = Timestamp::now();
    if let Some(pending) = repo.find_pending_invitation(workspace_id, &email).await? {
        if !pending.is_expired_at(now) {
            return Err(AccessError::conflict(
                "A pending invitation for this email already exists",
            ));
        }
        expire(repo, &pending, ctx).await?;
    }

    let new_invitation = NewWorkspaceInvitation {
        id: Uuid::now_v7(),
        workspace_id,
        email,
        role,
        token: generate_invitation_token(),
        expires_at: (now + INVITATION_TTL).into(),
        invited_by: inviter_id.to_string(),
    };

    let invitation = match repo.create_workspace_invitation(new_invitation).await {
        Ok(invitation) => invitation,
        Err(err)
            if err.constraint_violation()
                == Some(ConstraintViolation::WorkspaceInvitation(
                    WorkspaceInvitationConstraints::OnePendingPerEmail,
                )) =>
        {
            return Err(AccessError::conflict(
                "A pending invitation for this email already exists",
            ));
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(
        target: TRACING_TARGET_INVITATION,
        invitation_id = %invitation.id,
        workspace_id = %workspace_id,
        inviter_id = %inviter_id,
        role = %role,
        "invitation created"
    );

    let invitation = deliver_invitation(repo, mailer, invitation, inviter_id).await;
    ActivityLogger::new(ctx)
        .member_invited(repo, inviter_id, &invitation)
        .await;

    Ok(invitation)
}

/// Sends the invitation email and records the outcome. Never fails: a
/// delivery or bookkeeping error leaves the invitation valid.
async fn deliver_invitation<R>(
    repo: &mut R,
    mailer: &dyn InvitationMailer,
    invitation: WorkspaceInvitation,
    inviter_id: &str,
) -> WorkspaceInvitation
where
    R: UserRepository + WorkspaceRepository + WorkspaceInvitationRepository,
{
    let workspace_name = match repo.find_workspace_by_id(invitation.workspace_id).await {
        Ok(Some(workspace)) => workspace.name,
        _ => "a workspace".to_string(),
    };
    let inviter_name = match repo.find_user_by_id(inviter_id).await {
        Ok(Some(user)) => user.display_name(),
        _ => inviter_id.to_string(),
    };

    let email = InvitationEmail {
        to: invitation.email.clone(),
        workspace_name,
        inviter_name,
        role: invitation.role,
        token: invitation.token.clone(),
        expires_at: invitation.expires_at.into(),
    };

    let status = match mailer.send_invitation(&email).await {
        Ok(()) => EmailStatus::Sent,
        Err(err) => {
            tracing::warn!(
                target: TRACING_TARGET_INVITATION,
                invitation_id = %invitation.id,
                error = %err,
                "failed to send invitation email"
            );
            EmailStatus::Failed
        }
    };

    let changes = UpdateWorkspaceInvitation::email_delivery(status, Timestamp::now());
    match repo.update_workspace_invitation(invitation.id, changes).await {
        Ok(updated) => updated,
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET_INVITATION,
                invitation_id = %invitation.id,
                error = %err,
                "failed to record invitation email status"
            );
            invitation
        }
    }
}

/// Looks an invitation up by token, expiring it when overdue.
pub async fn validate_invitation<R>(
    repo: &mut R,
    token: &str,
    ctx: &RequestContext,
) -> AccessResult<InvitationView>
where
    R: UserRepository
        + WorkspaceRepository
        + WorkspaceInvitationRepository
        + WorkspaceActivityRepository,
{
    validate_invitation_at(repo, token, Timestamp::now(), ctx).await
}

/// [`validate_invitation`] evaluated at `now`.
pub async fn validate_invitation_at<R>(
    repo: &mut R,
    token: &str,
    now: Timestamp,
    ctx: &RequestContext,
) -> AccessResult<InvitationView>
where
    R: UserRepository
        + WorkspaceRepository
        + WorkspaceInvitationRepository
        + WorkspaceActivityRepository,
{
    let mut invitation = repo
        .find_invitation_by_token(token)
        .await?
        .ok_or_else(|| AccessError::not_found("Invitation not found"))?;

    if invitation.is_pending() && invitation.is_expired_at(now) {
        invitation = expire(repo, &invitation, ctx).await?;
    }

    let workspace = repo
        .find_workspace_by_id(invitation.workspace_id)
        .await?
        .ok_or_else(|| AccessError::not_found("Invitation not found"))?;
    let inviter_name = repo
        .find_user_by_id(&invitation.invited_by)
        .await?
        .map(|user| user.display_name());

    Ok(InvitationView {
        invitation,
        workspace_name: workspace.name,
        workspace_slug: workspace.slug,
        inviter_name,
    })
}

/// Accepts the invitation behind `token` on behalf of `user_id`.
pub async fn accept_invitation<R>(
    repo: &mut R,
    mailer: &dyn InvitationMailer,
    token: &str,
    user_id: &str,
    ctx: &RequestContext,
) -> AccessResult<AcceptedInvitation>
where
    R: UserRepository
        + SubscriptionRepository
        + WorkspaceRepository
        + WorkspaceMemberRepository
        + WorkspaceInvitationRepository
        + WorkspaceActivityRepository,
{
    accept_invitation_at(repo, mailer, token, user_id, Timestamp::now(), ctx).await
}

/// [`accept_invitation`] evaluated at `now`.
///
/// Fails with gone when the invitation has expired and with a conflict when
/// it is no longer pending. If the user already belongs to the workspace,
/// the invitation is marked accepted and a conflict is returned. Otherwise
/// the membership insert and the status change commit together, provided
/// the workspace still has a free seat under its owner's plan.
pub async fn accept_invitation_at<R>(
    repo: &mut R,
    mailer: &dyn InvitationMailer,
    token: &str,
    user_id: &str,
    now: Timestamp,
    ctx: &RequestContext,
) -> AccessResult<AcceptedInvitation>
where
    R: UserRepository
        + SubscriptionRepository
        + WorkspaceRepository
        + WorkspaceMemberRepository
        + WorkspaceInvitationRepository
        + WorkspaceActivityRepository,
{
    let invitation = repo
        .find_invitation_by_token(token)
        .await?
        .ok_or_else(|| AccessError::not_found("Invitation not found"))?;

    match invitation.status {
        InvitationStatus::Accepted => {
            return Err(AccessError::conflict(
                "This invitation has already been accepted",
            ));
        }
        InvitationStatus::Expired => {
            return Err(AccessError::gone("This invitation has expired"));
        }
        InvitationStatus::Pending if invitation.is_expired_at(now) => {
            expire(repo, &invitation, ctx).await?;
            return Err(AccessError::gone("This invitation has expired"));
        }
        InvitationStatus::Pending => {}
    }

    let user = repo
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AccessError::not_found("Complete onboarding before joining a workspace"))?;
    let workspace = repo
        .find_workspace_by_id(invitation.workspace_id)
        .await?
        .ok_or_else(|| AccessError::not_found("Invitation not found"))?;

    if repo
        .find_workspace_member(workspace.id, user_id)
        .await?
        .is_some()
    {
        repo.update_workspace_invitation(
            invitation.id,
            UpdateWorkspaceInvitation::accepted(user_id, now),
        )
        .await?;

        return Err(AccessError::conflict(
            "You are already a member of this workspace",
        ));
    }

    let new_member = NewWorkspaceMember::new(workspace.id, user_id, invitation.role)
        .with_invited_by(invitation.invited_by.clone());

    let limits = load_limits(repo, &workspace.owner_id).await?;
    let max_seats = match limits.total_seats() {
        QuotaLimit::Unlimited => None,
        QuotaLimit::Limited(limit) => Some(limit),
    };

    let member = match repo
        .accept_workspace_invitation(invitation.id, new_member, now, max_seats)
        .await
    {
        Ok(InvitationAcceptance::Accepted(member)) => member,
        Ok(InvitationAcceptance::NotPending) => {
            return Err(AccessError::conflict(
                "This invitation is no longer pending",
            ));
        }
        Ok(InvitationAcceptance::SeatLimitReached) => {
            tracing::info!(
                target: TRACING_TARGET_INVITATION,
                invitation_id = %invitation.id,
                workspace_id = %workspace.id,
                user_id = %user_id,
                plan = %limits.plan,
                "invitation acceptance blocked by seat limit"
            );
            return Err(AccessError::PlanLimitExceeded(seat_limit_reason(
                &limits,
                max_seats.unwrap_or_default(),
            )));
        }
        Err(err)
            if err.constraint_violation()
                == Some(ConstraintViolation::WorkspaceMember(
                    WorkspaceMemberConstraints::PrimaryKey,
                )) =>
        {
            return Err(AccessError::conflict(
                "You are already a member of this workspace",
            ));
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(
        target: TRACING_TARGET_INVITATION,
        invitation_id = %invitation.id,
        workspace_id = %workspace.id,
        user_id = %user_id,
        role = %member.role,
        "invitation accepted"
    );

    ActivityLogger::new(ctx)
        .member_joined(repo, workspace.id, user_id, member.role, Some(invitation.id))
        .await;

    let welcome = WelcomeEmail {
        to: user.email,
        workspace_name: workspace.name.clone(),
        role: member.role,
    };
    if let Err(err) = mailer.send_welcome(&welcome).await {
        tracing::warn!(
            target: TRACING_TARGET_INVITATION,
            workspace_id = %workspace.id,
            user_id = %user_id,
            error = %err,
            "failed to send welcome email"
        );
    }

    Ok(AcceptedInvitation {
        invitation_id: invitation.id,
        workspace,
        member,
    })
}

#[cfg(test)]
mod tests {
    use convoforms_postgres::types::SubscriptionPlan;
    use convoforms_test::{MemoryStore, test_email};

    use super::*;
    use crate::mail::RecordingMailer;

    fn pro_workspace(store: &mut MemoryStore) -> Workspace {
        store.seed_subscription("alice", SubscriptionPlan::Pro);
        store.seed_workspace("alice", "acme")
    }

    async fn invite(
        store: &mut MemoryStore,
        mailer: &RecordingMailer,
        workspace_id: Uuid,
        email: &str,
    ) -> AccessResult<WorkspaceInvitation> {
        let ctx = RequestContext::new();
        create_invitation(
            store,
            mailer,
            "alice",
            workspace_id,
            email,
            WorkspaceRole::Member,
            &ctx,
        )
        .await
    }

    #[test]
    fn tokens_are_long_and_url_safe() {
        let token = generate_invitation_token();
        assert_eq!(token.len(), 43);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(token, generate_invitation_token());
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Bob@Example.COM ").unwrap(), "bob@example.com");
        assert!(normalize_email("bob").is_err());
        assert!(normalize_email("bob@localhost").is_err());
        assert!(normalize_email("b ob@example.com").is_err());
    }

    #[tokio::test]
    async fn creates_pending_invitation_and_sends_email() {
        let mut store = MemoryStore::new();
        let mailer = RecordingMailer::new();
        let ws = pro_workspace(&mut store);

        let before = Timestamp::now();
        let invitation = invite(&mut store, &mailer, ws.id, "Bob@Example.com").await.unwrap();

        assert_eq!(invitation.status, InvitationStatus::Pending);
        assert_eq!(invitation.email, "bob@example.com");
        assert_eq!(invitation.email_status, EmailStatus::Sent);
        let ttl = Timestamp::from(invitation.expires_at).duration_since(before);
        assert!(ttl >= INVITATION_TTL && ttl < INVITATION_TTL + SignedDuration::from_mins(1));

        let sent = mailer.invitations();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].token, invitation.token);
        assert_eq!(store.activities()[0].action, "member.invited");
    }

    #[tokio::test]
    async fn failed_delivery_is_recorded_not_raised() {
        let mut store = MemoryStore::new();
        let mailer = RecordingMailer::failing();
        let ws = pro_workspace(&mut store);

        let invitation = invite(&mut store, &mailer, ws.id, "bob@example.com").await.unwrap();

        assert_eq!(invitation.email_status, EmailStatus::Failed);
        assert!(invitation.email_sent_at.is_none());
    }

    #[tokio::test]
    async fn duplicate_pending_invitation_conflicts() {
        let mut store = MemoryStore::new();
        let mailer = RecordingMailer::new();
        let ws = pro_workspace(&mut store);

        invite(&mut store, &mailer, ws.id, "bob@example.com").await.unwrap();
        let err = invite(&mut store, &mailer, ws.id, "BOB@example.com").await.unwrap_err();

        assert!(matches!(err, AccessError::Conflict(_)));
        assert_eq!(store.invitations().len(), 1);
    }

    #[tokio::test]
    async fn overdue_pending_invitation_is_replaced() {
        let mut store = MemoryStore::new();
        let mailer = RecordingMailer::new();
        let ws = pro_workspace(&mut store);
        let past = Timestamp::now() - SignedDuration::from_hours(1);
        let stale = store.seed_invitation(ws.id, "bob@example.com", WorkspaceRole::Member, "stale", past);

        invite(&mut store, &mailer, ws.id, "bob@example.com").await.unwrap();

        assert_eq!(store.invitation(stale.id).unwrap().status, InvitationStatus::Expired);
        assert_eq!(store.invitations().len(), 2);
    }

    #[tokio::test]
    async fn invite_checks_permission_role_and_membership() {
        let mut store = MemoryStore::new();
        let mailer = RecordingMailer::new();
        let ws = pro_workspace(&mut store);
        store.seed_member(ws.id, "bob", WorkspaceRole::Member);
        let ctx = RequestContext::new();

        let err = create_invitation(
            &mut store, &mailer, "bob", ws.id, "carol@example.com", WorkspaceRole::Viewer, &ctx,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AccessError::Forbidden(_)));

        let err = create_invitation(
            &mut store, &mailer, "alice", ws.id, "carol@example.com", WorkspaceRole::Owner, &ctx,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AccessError::BadRequest(_)));

        let err = invite(&mut store, &mailer, ws.id, &test_email("bob")).await.unwrap_err();
        assert!(matches!(err, AccessError::Conflict(_)));
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn starter_plan_cannot_invite() {
        let mut store = MemoryStore::new();
        let mailer = RecordingMailer::new();
        let ws = store.seed_workspace("alice", "acme");

        let err = invite(&mut store, &mailer, ws.id, "bob@example.com").await.unwrap_err();

        assert!(matches!(err, AccessError::PlanLimitExceeded(_)));
    }

    #[tokio::test]
    async fn accept_round_trip_happens_once() {
        let mut store = MemoryStore::new();
        let mailer = RecordingMailer::new();
        let ws = pro_workspace(&mut store);
        store.seed_user("bob");
        let invitation = invite(&mut store, &mailer, ws.id, &test_email("bob")).await.unwrap();
        let ctx = RequestContext::new();

        let accepted = accept_invitation(&mut store, &mailer, &invitation.token, "bob", &ctx)
            .await
            .unwrap();
        assert_eq!(accepted.member.role, WorkspaceRole::Member);
        assert_eq!(accepted.member.invited_by.as_deref(), Some("alice"));

        let err = accept_invitation(&mut store, &mailer, &invitation.token, "bob", &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Conflict(_)));

        let stored = store.invitation(invitation.id).unwrap();
        assert_eq!(stored.status, InvitationStatus::Accepted);
        assert_eq!(stored.accepted_by.as_deref(), Some("bob"));
        assert_eq!(store.members_of(ws.id).len(), 2);
        assert_eq!(mailer.welcomes().len(), 1);
        assert!(store.activities().iter().any(|a| a.action == "member.joined"));
    }

    #[tokio::test]
    async fn acceptance_respects_seat_limit() {
        let mut store = MemoryStore::new();
        let mailer = RecordingMailer::new();
        let ws = pro_workspace(&mut store);
        let ctx = RequestContext::new();

        // Pending invitations hold no seat, so all five fit under the cap.
        let invitees = ["bob", "carol", "dave", "erin", "frank"];
        let mut invitations = Vec::new();
        for user in invitees {
            store.seed_user(user);
            let invitation = invite(&mut store, &mailer, ws.id, &test_email(user)).await.unwrap();
            invitations.push(invitation);
        }

        for (user, invitation) in invitees.iter().zip(&invitations).take(4) {
            accept_invitation(&mut store, &mailer, &invitation.token, user, &ctx)
                .await
                .unwrap();
        }
        assert_eq!(store.members_of(ws.id).len(), 5);

        let last = &invitations[4];
        let err = accept_invitation(&mut store, &mailer, &last.token, "frank", &ctx)
            .await
            .unwrap_err();

        let AccessError::PlanLimitExceeded(reason) = err else {
            panic!("expected a plan limit error, got {err:?}");
        };
        assert!(reason.contains("5 seats"));
        assert_eq!(store.members_of(ws.id).len(), 5);
        assert_eq!(store.invitation(last.id).unwrap().status, InvitationStatus::Pending);
        let joined = store.activities().iter().filter(|a| a.action == "member.joined").count();
        assert_eq!(joined, 4);
    }

    #[tokio::test]
    async fn expiry_boundary_is_exclusive() {
        let mut store = MemoryStore::new();
        let mailer = RecordingMailer::new();
        let ws = pro_workspace(&mut store);
        store.seed_user("bob");
        store.seed_user("carol");
        store.seed_user("dave");
        let ctx = RequestContext::new();
        let now = Timestamp::now();
        let millis = SignedDuration::from_millis(1);

        let overdue = store.seed_invitation(ws.id, "bob@example.com", WorkspaceRole::Member, "overdue", now - millis);
        let fresh = store.seed_invitation(ws.id, "carol@example.com", WorkspaceRole::Member, "fresh", now + millis);

        let err = accept_invitation_at(&mut store, &mailer, "overdue", "bob", now, &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::Gone(_)));
        assert_eq!(store.invitation(overdue.id).unwrap().status, InvitationStatus::Expired);

        accept_invitation_at(&mut store, &mailer, "fresh", "carol", now, &ctx)
            .await
            .unwrap();
        assert_eq!(store.invitation(fresh.id).unwrap().status, InvitationStatus::Accepted);

        let exact = store.seed_invitation(ws.id, "dave@example.com", WorkspaceRole::Member, "exact", now);
        accept_invitation_at(&mut store, &mailer, "exact", "dave", now, &ctx)
            .await
            .unwrap();
        assert_eq!(store.invitation(exact.id).unwrap().status, InvitationStatus::Accepted);
    }

    #[tokio::test]
    async fn existing_member_marks_invitation_accepted() {
        let mut store = MemoryStore::new();
        let mailer = RecordingMailer::new();
        let ws = pro_workspace(&mut store);
        store.seed_member(ws.id, "bob", WorkspaceRole::Viewer);
        let future = Timestamp::now() + SignedDuration::from_hours(1);
        let invitation = store.seed_invitation(ws.id, "bob@example.com", WorkspaceRole::Admin, "tok", future);
        let ctx = RequestContext::new();

        let err = accept_invitation(&mut store, &mailer, "tok", "bob", &ctx)
            .await
            .unwrap_err();

        assert!(matches!(err, AccessError::Conflict(_)));
        assert_eq!(store.invitation(invitation.id).unwrap().status, InvitationStatus::Accepted);
        // Role unchanged, no second membership.
        let members = store.members_of(ws.id);
        assert_eq!(members.len(), 2);
        assert!(members.iter().any(|m| m.user_id == "bob" && m.role == WorkspaceRole::Viewer));
    }

    #[tokio::test]
    async fn validate_persists_expiry() {
        let mut store = MemoryStore::new();
        let ws = pro_workspace(&mut store);
        let expires_at = Timestamp::now();
        let invitation =
            store.seed_invitation(ws.id, "bob@example.com", WorkspaceRole::Member, "tok", expires_at);
        let ctx = RequestContext::new();

        let view = validate_invitation_at(&mut store, "tok", expires_at, &ctx).await.unwrap();
        assert!(!view.is_expired());
        assert_eq!(store.invitation(invitation.id).unwrap().status, InvitationStatus::Pending);

        let later = expires_at + SignedDuration::from_millis(1);
        let view = validate_invitation_at(&mut store, "tok", later, &ctx).await.unwrap();

        assert!(view.is_expired());
        assert_eq!(view.workspace_slug, "acme");
        assert_eq!(store.invitation(invitation.id).unwrap().status, InvitationStatus::Expired);
        assert!(store.activities().iter().any(|a| a.action == "invitation.expired"));
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let mut store = MemoryStore::new();
        let mailer = RecordingMailer::new();
        let ctx = RequestContext::new();

        let err = validate_invitation(&mut store, "missing", &ctx).await.unwrap_err();
        assert!(matches!(err, AccessError::NotFound(_)));

        let err = accept_invitation(&mut store, &mailer, "missing", "bob", &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::NotFound(_)));
    }
}

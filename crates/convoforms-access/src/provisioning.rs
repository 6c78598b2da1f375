//! Workspace creation, workspace updates and first-time onboarding.

use convoforms_postgres::PgError;
use convoforms_postgres::model::{
    NewSubscription, NewUser, NewWorkspace, Subscription, UpdateWorkspace, User, Workspace,
    WorkspaceMember,
};
use convoforms_postgres::query::{
    SubscriptionRepository, UserRepository, WorkspaceActivityRepository,
    WorkspaceMemberRepository, WorkspaceRepository,
};
use convoforms_postgres::types::{
    ConstraintViolation, UserConstraints, WorkspaceConstraints, WorkspaceType,
};
use uuid::Uuid;

use crate::activity::{ActivityLogger, RequestContext};
use crate::check::authorize;
use crate::invitation::normalize_email;
use crate::permission::{Action, Resource};
use crate::plan::QuotaLimit;
use crate::quota::{can_create_workspace, load_limits};
use crate::{AccessError, AccessResult, TRACING_TARGET_PROVISIONING};

const SLUG_MIN_LENGTH: usize = 3;
const SLUG_MAX_LENGTH: usize = 48;
const NAME_MAX_LENGTH: usize = 100;
const DESCRIPTION_MAX_LENGTH: usize = 500;

/// Attempts with a random suffix after a derived slug collides.
const SLUG_ATTEMPTS: usize = 4;

/// Input of [`create_workspace`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateWorkspace {
    pub name: String,
    /// Derived from `name` when absent.
    pub slug: Option<String>,
    pub description: Option<String>,
}

/// Input of [`update_workspace`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateWorkspaceDetails {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub settings: Option<serde_json::Value>,
}

/// A user as reported by the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Result of [`onboard_user`].
#[derive(Debug, Clone, PartialEq)]
pub struct Onboarding {
    pub user: User,
    pub subscription: Subscription,
    pub workspace: Workspace,
    /// Whether the default workspace existed before this call.
    pub already_onboarded: bool,
}

/// Checks that `slug` is 3 to 48 lowercase letters, digits and hyphens,
/// neither starting nor ending with a hyphen.
pub fn validate_slug(slug: &str) -> AccessResult<()> {
    let valid_chars = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if !(SLUG_MIN_LENGTH..=SLUG_MAX_LENGTH).contains(&slug.len())
        || !valid_chars
        || slug.starts_with('-')
        || slug.ends_with('-')
    {
        return Err(AccessError::bad_request(
            "Slugs must be 3 to 48 lowercase letters, digits or hyphens, and cannot start or end with a hyphen",
        ));
    }

    Ok(())
}

/// Turns arbitrary text into a valid slug.
pub fn derive_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    slug.truncate(SLUG_MAX_LENGTH);
    let slug = slug.trim_matches('-');

    if slug.len() < SLUG_MIN_LENGTH {
        "workspace".to_string()
    } else {
        slug.to_string()
    }
}

/// Appends a short random suffix, keeping the result a valid slug.
fn suffixed_slug(base: &str) -> String {
    let suffix = format!("{:06x}", rand::random::<u32>() & 0x00ff_ffff);
    let keep = SLUG_MAX_LENGTH - suffix.len() - 1;
    let base = base.get(..keep).unwrap_or(base).trim_end_matches('-');
    format!("{base}-{suffix}")
}

fn is_violation(err: &PgError, expected: ConstraintViolation) -> bool {
    err.constraint_violation() == Some(expected)
}

fn validate_name(name: &str) -> AccessResult<String> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > NAME_MAX_LENGTH {
        return Err(AccessError::bad_request(
            "Workspace names must be between 1 and 100 characters",
        ));
    }
    Ok(name.to_string())
}

fn validate_description(description: Option<String>) -> AccessResult<Option<String>> {
    let description = description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    if description
        .as_ref()
        .is_some_and(|d| d.chars().count() > DESCRIPTION_MAX_LENGTH)
    {
        return Err(AccessError::bad_request(
            "Descriptions cannot be longer than 500 characters",
        ));
    }
    Ok(description)
}

/// Creates a team workspace owned by `user_id`.
///
/// The plan quota is checked first for a readable denial, then enforced
/// again inside the insert transaction. An explicit slug that is taken is a
/// conflict; a derived one is retried with a random suffix.
pub async fn create_workspace<R>(
    repo: &mut R,
    user_id: &str,
    input: CreateWorkspace,
    ctx: &RequestContext,
) -> AccessResult<(Workspace, WorkspaceMember)>
where
    R: UserRepository
        + SubscriptionRepository
        + WorkspaceRepository
        + WorkspaceActivityRepository,
{
    can_create_workspace(repo, Some(user_id))
        .await?
        .into_result()?;

    let name = validate_name(&input.name)?;
    let description = validate_description(input.description)?;
    let explicit_slug = input.slug.is_some();
    let base_slug = match input.slug {
        Some(slug) => {
            validate_slug(&slug)?;
            slug
        }
        None => derive_slug(&name),
    };

    if repo.find_user_by_id(user_id).await?.is_none() {
        return Err(AccessError::not_found(
            "Complete onboarding before creating a workspace",
        ));
    }

    let limits = load_limits(repo, user_id).await?;
    let max_owned = match limits.max_workspaces {
        QuotaLimit::Unlimited => None,
        QuotaLimit::Limited(limit) => Some(limit),
    };

    let mut slug = base_slug.clone();
    for attempt in 1..=SLUG_ATTEMPTS {
        let new_workspace = NewWorkspace::new(user_id, name.clone(), slug.clone())
            .with_description(description.clone());

        match repo.create_workspace_with_owner(new_workspace, max_owned).await {
            Ok(Some((workspace, member))) => {
                tracing::info!(
                    target: TRACING_TARGET_PROVISIONING,
                    workspace_id = %workspace.id,
                    user_id = %user_id,
                    slug = %workspace.slug,
                    "workspace created"
                );

                ActivityLogger::new(ctx)
                    .workspace_created(repo, &workspace)
                    .await;
                return Ok((workspace, member));
            }
            Ok(None) => {
                tracing::warn!(
                    target: TRACING_TARGET_PROVISIONING,
                    user_id = %user_id,
                    "workspace cap reached inside the insert transaction"
                );
                return Err(AccessError::PlanLimitExceeded(format!(
                    "Your {} plan does not allow more workspaces. Upgrade your plan to create more workspaces.",
                    limits.plan
                )));
            }
            Err(err)
                if is_violation(
                    &err,
                    ConstraintViolation::Workspace(WorkspaceConstraints::SlugUnique),
                ) =>
            {
                if explicit_slug {
                    return Err(AccessError::conflict(format!(
                        "The slug {slug} is already taken"
                    )));
                }

                tracing::debug!(
                    target: TRACING_TARGET_PROVISIONING,
                    slug = %slug,
                    attempt,
                    "derived slug taken, retrying with a suffix"
                );
                slug = suffixed_slug(&base_slug);
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(AccessError::conflict(
        "Could not find a free slug for this workspace, please choose one",
    ))
}

/// Updates name, description or settings. Requires `workspace.update`.
pub async fn update_workspace<R>(
    repo: &mut R,
    user_id: &str,
    workspace_id: Uuid,
    details: UpdateWorkspaceDetails,
    ctx: &RequestContext,
) -> AccessResult<Workspace>
where
    R: WorkspaceRepository + WorkspaceMemberRepository + WorkspaceActivityRepository,
{
    authorize(repo, user_id, workspace_id, Resource::Workspace, Action::Update).await?;

    let mut changed = Vec::new();
    let mut changes = UpdateWorkspace::default();

    if let Some(name) = details.name {
        changes.name = Some(validate_name(&name)?);
        changed.push("name");
    }
    if let Some(description) = details.description {
        changes.description = Some(validate_description(description)?);
        changed.push("description");
    }
    if let Some(settings) = details.settings {
        if !settings.is_object() {
            return Err(AccessError::bad_request("Settings must be a JSON object"));
        }
        changes.settings = Some(settings);
        changed.push("settings");
    }

    if changes.is_empty() {
        return Err(AccessError::bad_request("No changes to apply"));
    }

    let workspace = repo.update_workspace(workspace_id, changes).await?;

    tracing::info!(
        target: TRACING_TARGET_PROVISIONING,
        workspace_id = %workspace_id,
        user_id = %user_id,
        changed = ?changed,
        "workspace updated"
    );

    ActivityLogger::new(ctx)
        .workspace_updated(repo, workspace_id, user_id, &changed)
        .await;

    Ok(workspace)
}

fn default_workspace_name(user: &User) -> String {
    let owner = match user.first_name.as_deref().map(str::trim) {
        Some(first) if !first.is_empty() => first.to_string(),
        _ => user
            .email
            .split('@')
            .next()
            .unwrap_or(&user.email)
            .to_string(),
    };

    let name = format!("{owner}'s Workspace");
    name.chars().take(NAME_MAX_LENGTH).collect()
}

/// Sets up a new user: profile, starter subscription and default workspace.
///
/// Idempotent. Calling it again, or concurrently, returns the existing
/// default workspace with `already_onboarded` set.
pub async fn onboard_user<R>(
    repo: &mut R,
    identity: Identity,
    ctx: &RequestContext,
) -> AccessResult<Onboarding>
where
    R: UserRepository
        + SubscriptionRepository
        + WorkspaceRepository
        + WorkspaceActivityRepository,
{
    let email = normalize_email(&identity.email)?;
    let profile = NewUser {
        id: identity.user_id.clone(),
        email,
        first_name: identity.first_name,
        last_name: identity.last_name,
        avatar_url: identity.avatar_url,
    };

    let user = match repo.upsert_user(profile).await {
        Ok(user) => user,
        Err(err)
            if is_violation(&err, ConstraintViolation::User(UserConstraints::EmailUnique)) =>
        {
            return Err(AccessError::conflict(
                "This email address is already used by another account",
            ));
        }
        Err(err) => return Err(err.into()),
    };

    let subscription = repo
        .ensure_subscription(NewSubscription::starter(&user.id))
        .await?;

    if let Some(workspace) = repo.find_default_workspace(&user.id).await? {
        return Ok(Onboarding {
            user,
            subscription,
            workspace,
            already_onboarded: true,
        });
    }

    let name = default_workspace_name(&user);
    let base_slug = derive_slug(user.email.split('@').next().unwrap_or_default());
    let mut slug = base_slug.clone();

    for attempt in 1..=SLUG_ATTEMPTS {
        let new_workspace =
            NewWorkspace::new(&user.id, name.clone(), slug.clone()).with_type(WorkspaceType::Default);

        match repo.create_workspace_with_owner(new_workspace, None).await {
            Ok(Some((workspace, _))) => {
                tracing::info!(
                    target: TRACING_TARGET_PROVISIONING,
                    user_id = %user.id,
                    workspace_id = %workspace.id,
                    "user onboarded"
                );

                ActivityLogger::new(ctx)
                    .workspace_created(repo, &workspace)
                    .await;

                return Ok(Onboarding {
                    user,
                    subscription,
                    workspace,
                    already_onboarded: false,
                });
            }
            Ok(None) => break,
            Err(err)
                if is_violation(
                    &err,
                    ConstraintViolation::Workspace(WorkspaceConstraints::OneDefaultPerOwner),
                ) =>
            {
                let workspace = repo
                    .find_default_workspace(&user.id)
                    .await?
                    .ok_or_else(|| AccessError::conflict("Onboarding is already in progress"))?;

                return Ok(Onboarding {
                    user,
                    subscription,
                    workspace,
                    already_onboarded: true,
                });
            }
            Err(err)
                if is_violation(
                    &err,
                    ConstraintViolation::Workspace(WorkspaceConstraints::SlugUnique),
                ) =>
            {
                tracing::debug!(
                    target: TRACING_TARGET_PROVISIONING,
                    slug = %slug,
                    attempt,
                    "default workspace slug taken, retrying with a suffix"
                );
                slug = suffixed_slug(&base_slug);
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(AccessError::conflict(
        "Could not create the default workspace, please try again",
    ))
}

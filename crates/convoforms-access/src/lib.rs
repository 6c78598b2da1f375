#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for permission checks.
pub const TRACING_TARGET_PERMISSION: &str = "convoforms_access::permission";

/// Tracing target for plan quota decisions.
pub const TRACING_TARGET_QUOTA: &str = "convoforms_access::quota";

/// Tracing target for the activity log writer.
pub const TRACING_TARGET_ACTIVITY: &str = "convoforms_access::activity";

/// Tracing target for the invitation lifecycle.
pub const TRACING_TARGET_INVITATION: &str = "convoforms_access::invitation";

/// Tracing target for member management.
pub const TRACING_TARGET_MEMBERSHIP: &str = "convoforms_access::membership";

/// Tracing target for workspace creation and onboarding.
pub const TRACING_TARGET_PROVISIONING: &str = "convoforms_access::provisioning";

/// Tracing target for outgoing email.
pub const TRACING_TARGET_MAIL: &str = "convoforms_access::mail";

mod activity;
mod check;
mod error;
mod invitation;
mod mail;
mod membership;
mod permission;
mod plan;
mod provisioning;
mod quota;
mod usage;

pub use crate::activity::{
    ActivityAction, ActivityLogger, RequestContext, list_workspace_activity,
};
pub use crate::check::{PermissionCheck, authorize, check_workspace_permission};
pub use crate::error::{AccessError, AccessResult};
pub use crate::invitation::{
    AcceptedInvitation, INVITATION_TTL, InvitationView, accept_invitation,
    accept_invitation_at, create_invitation, generate_invitation_token, validate_invitation,
    validate_invitation_at,
};
pub use crate::mail::{
    InvitationEmail, InvitationMailer, MailError, RecordingMailer, SentMail, TracingMailer,
    WelcomeEmail,
};
pub use crate::membership::{MemberDetails, list_members, remove_member, update_member_role};
pub use crate::permission::{Action, Permission, Resource, required_role};
pub use crate::plan::{PlanConfig, QuotaLimit, ResolvedLimits};
pub use crate::provisioning::{
    CreateWorkspace, Identity, Onboarding, UpdateWorkspaceDetails, create_workspace,
    derive_slug, onboard_user, update_workspace, validate_slug,
};
pub use crate::quota::{QuotaDecision, can_create_workspace, can_invite_to_workspace, load_limits};
pub use crate::usage::{MemberUsage, UsageMetric, WorkspaceUsage, workspace_member_usage, workspace_usage};

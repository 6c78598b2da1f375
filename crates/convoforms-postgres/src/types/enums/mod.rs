//! Postgres enum types.

mod email_status;
mod invitation_status;
mod subscription_plan;
mod subscription_status;
mod workspace_role;
mod workspace_type;

pub use email_status::EmailStatus;
pub use invitation_status::InvitationStatus;
pub use subscription_plan::SubscriptionPlan;
pub use subscription_status::SubscriptionStatus;
pub use workspace_role::WorkspaceRole;
pub use workspace_type::WorkspaceType;

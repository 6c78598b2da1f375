//! Constraint names, enumerations and small shared types.

mod constraints;
mod enums;

pub use constraints::{
    ConstraintCategory, ConstraintViolation, SubscriptionConstraints, UserConstraints,
    WorkspaceActivityConstraints, WorkspaceConstraints, WorkspaceInvitationConstraints,
    WorkspaceMemberConstraints,
};
pub use enums::{
    EmailStatus, InvitationStatus, SubscriptionPlan, SubscriptionStatus, WorkspaceRole,
    WorkspaceType,
};

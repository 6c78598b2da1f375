//! Row types for every table, plus their insert and changeset forms.

mod subscription;
mod user;
mod workspace;
mod workspace_activity;
mod workspace_invitation;
mod workspace_member;

pub use subscription::{NewSubscription, Subscription, UpdateSubscription};
pub use user::{NewUser, UpdateUser, User};
pub use workspace::{NewWorkspace, UpdateWorkspace, Workspace};
pub use workspace_activity::{NewWorkspaceActivity, WorkspaceActivity};
pub use workspace_invitation::{
    NewWorkspaceInvitation, UpdateWorkspaceInvitation, WorkspaceInvitation,
};
pub use workspace_member::{NewWorkspaceMember, UpdateWorkspaceMember, WorkspaceMember};

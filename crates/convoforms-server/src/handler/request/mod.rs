//! Request types for HTTP handlers.

mod invitations;
mod members;
mod onboarding;
mod paginations;
mod paths;
mod validations;
mod workspaces;

pub use invitations::*;
pub use members::*;
pub use onboarding::*;
pub use paginations::*;
pub use paths::*;
pub use workspaces::*;

//! Repository traits, implemented for [`PgConnection`].
//!
//! Each trait covers one table. Operations that must be atomic, such as
//! creating a workspace together with its owner membership or accepting an
//! invitation under the seat cap, are exposed as single methods that run
//! their own transaction.
//!
//! [`PgConnection`]: crate::PgConnection

mod subscription;
mod user;
mod workspace;
mod workspace_activity;
mod workspace_invitation;
mod workspace_member;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use subscription::SubscriptionRepository;
pub use user::UserRepository;
pub use workspace::WorkspaceRepository;
pub use workspace_activity::WorkspaceActivityRepository;
pub use workspace_invitation::{InvitationAcceptance, WorkspaceInvitationRepository};
pub use workspace_member::WorkspaceMemberRepository;

/// Largest page any list query returns.
pub const MAX_PAGE_SIZE: i64 = 200;

/// Offset pagination for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    /// Clamps `limit` to `1..=MAX_PAGE_SIZE` and `offset` to non-negative.
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            offset: offset.max(0),
        }
    }

    /// Builds pagination from a 1-based page number.
    pub fn from_page(page: i64, page_size: i64) -> Self {
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        Self::new(page_size, (page.max(1) - 1) * page_size)
    }

    pub fn page_number(&self) -> i64 {
        (self.offset / self.limit) + 1
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(50, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_bounds() {
        assert_eq!(Pagination::new(0, -5), Pagination { limit: 1, offset: 0 });
        assert_eq!(Pagination::new(10_000, 3).limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn pages_are_one_based() {
        let page = Pagination::from_page(3, 20);
        assert_eq!(page.offset, 40);
        assert_eq!(page.page_number(), 3);
        assert_eq!(Pagination::from_page(0, 20).offset, 0);
    }
}

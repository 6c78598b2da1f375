//! Workspace member roles and their ordering.

use std::cmp;

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Role of a member inside a workspace.
///
/// Roles are totally ordered, `viewer < member < admin < owner`, and the
/// [`Ord`] implementation follows [`WorkspaceRole::rank`].
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::WorkspaceRole"]
#[strum(serialize_all = "snake_case")]
pub enum WorkspaceRole {
    /// Read-only access.
    #[db_rename = "viewer"]
    #[serde(rename = "viewer")]
    Viewer,

    /// Can create and edit forms and templates.
    #[db_rename = "member"]
    #[serde(rename = "member")]
    #[default]
    Member,

    /// Manages members, invitations and workspace settings.
    #[db_rename = "admin"]
    #[serde(rename = "admin")]
    Admin,

    /// Full control, including deleting the workspace.
    #[db_rename = "owner"]
    #[serde(rename = "owner")]
    Owner,
}

impl WorkspaceRole {
    /// Position in the hierarchy, from 1 (viewer) to 4 (owner).
    #[inline]
    pub const fn rank(self) -> u8 {
        match self {
            WorkspaceRole::Viewer => 1,
            WorkspaceRole::Member => 2,
            WorkspaceRole::Admin => 3,
            WorkspaceRole::Owner => 4,
        }
    }

    /// Returns whether this role is at least `required`.
    #[inline]
    pub const fn has_permission_of(self, required: WorkspaceRole) -> bool {
        self.rank() >= required.rank()
    }

    /// Returns whether a member with this role may manage a member holding
    /// `target`. Strict: peers cannot manage each other.
    #[inline]
    pub const fn can_manage(self, target: WorkspaceRole) -> bool {
        self.rank() > target.rank()
    }

    #[inline]
    pub const fn is_owner(self) -> bool {
        matches!(self, WorkspaceRole::Owner)
    }
}

impl PartialOrd for WorkspaceRole {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WorkspaceRole {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn ranks_are_ordered() {
        assert!(WorkspaceRole::Viewer < WorkspaceRole::Member);
        assert!(WorkspaceRole::Member < WorkspaceRole::Admin);
        assert!(WorkspaceRole::Admin < WorkspaceRole::Owner);
    }

    #[test]
    fn permission_follows_rank_for_every_pair() {
        for a in WorkspaceRole::iter() {
            for b in WorkspaceRole::iter() {
                assert_eq!(a.has_permission_of(b), a.rank() >= b.rank(), "{a} vs {b}");
                assert_eq!(a.can_manage(b), a.rank() > b.rank(), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn peers_cannot_manage_each_other() {
        assert!(!WorkspaceRole::Admin.can_manage(WorkspaceRole::Admin));
        assert!(!WorkspaceRole::Owner.can_manage(WorkspaceRole::Owner));
        assert!(WorkspaceRole::Owner.can_manage(WorkspaceRole::Admin));
        assert!(WorkspaceRole::Admin.can_manage(WorkspaceRole::Member));
    }

    #[test]
    fn parses_lowercase_names() {
        assert_eq!("admin".parse::<WorkspaceRole>().ok(), Some(WorkspaceRole::Admin));
        assert_eq!(WorkspaceRole::Viewer.to_string(), "viewer");
        assert!("superuser".parse::<WorkspaceRole>().is_err());
    }
}

//! Static permission table.
//!
//! Maps every `(resource, action)` pair to the lowest role allowed to perform
//! it. Pairs without an entry have no required role and are always denied.

use std::fmt;
use std::str::FromStr;

use convoforms_postgres::types::WorkspaceRole;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Something inside a workspace that access is checked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Resource {
    Workspace,
    Members,
    Forms,
    Templates,
}

/// What the caller wants to do with a [`Resource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    Invite,
    Remove,
}

/// Returns the lowest role allowed to perform `action` on `resource`, or
/// `None` when the pair is not in the table.
pub const fn required_role(resource: Resource, action: Action) -> Option<WorkspaceRole> {
    use WorkspaceRole::{Admin, Member, Owner, Viewer};

    match (resource, action) {
        (Resource::Workspace, Action::Read) => Some(Viewer),
        (Resource::Workspace, Action::Update) => Some(Admin),
        (Resource::Workspace, Action::Delete) => Some(Owner),

        (Resource::Members, Action::Read) => Some(Viewer),
        (Resource::Members, Action::Update) => Some(Admin),
        (Resource::Members, Action::Invite) => Some(Admin),
        (Resource::Members, Action::Remove) => Some(Admin),

        (Resource::Forms | Resource::Templates, Action::Read) => Some(Viewer),
        (Resource::Forms | Resource::Templates, Action::Create) => Some(Member),
        (Resource::Forms | Resource::Templates, Action::Update) => Some(Member),
        (Resource::Forms | Resource::Templates, Action::Delete) => Some(Admin),

        _ => None,
    }
}

/// A `(resource, action)` pair, written `resource.action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permission {
    pub resource: Resource,
    pub action: Action,
}

impl Permission {
    pub const fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }

    #[inline]
    pub const fn required_role(self) -> Option<WorkspaceRole> {
        required_role(self.resource, self.action)
    }

    /// Returns whether `role` satisfies this permission. Unknown pairs are
    /// never satisfied.
    pub const fn is_permitted_by_role(self, role: WorkspaceRole) -> bool {
        match self.required_role() {
            Some(required) => role.has_permission_of(required),
            None => false,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource, self.action)
    }
}

impl FromStr for Permission {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (resource, action) = s
            .split_once('.')
            .ok_or(strum::ParseError::VariantNotFound)?;

        Ok(Self::new(resource.parse()?, action.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn table_matches_documented_roles() {
        use WorkspaceRole::{Admin, Member, Owner, Viewer};

        assert_eq!(required_role(Resource::Workspace, Action::Read), Some(Viewer));
        assert_eq!(required_role(Resource::Workspace, Action::Update), Some(Admin));
        assert_eq!(required_role(Resource::Workspace, Action::Delete), Some(Owner));
        assert_eq!(required_role(Resource::Members, Action::Invite), Some(Admin));
        assert_eq!(required_role(Resource::Members, Action::Remove), Some(Admin));
        assert_eq!(required_role(Resource::Forms, Action::Create), Some(Member));
        assert_eq!(required_role(Resource::Templates, Action::Delete), Some(Admin));
    }

    #[test]
    fn unmapped_pairs_deny_every_role() {
        let unmapped = [
            Permission::new(Resource::Workspace, Action::Invite),
            Permission::new(Resource::Members, Action::Create),
            Permission::new(Resource::Forms, Action::Remove),
        ];

        for permission in unmapped {
            assert_eq!(permission.required_role(), None);
            for role in WorkspaceRole::iter() {
                assert!(!permission.is_permitted_by_role(role), "{permission} {role}");
            }
        }
    }

    #[test]
    fn owner_satisfies_every_mapped_pair() {
        for resource in Resource::iter() {
            for action in Action::iter() {
                let permission = Permission::new(resource, action);
                if permission.required_role().is_some() {
                    assert!(permission.is_permitted_by_role(WorkspaceRole::Owner));
                }
            }
        }
    }

    #[test]
    fn parses_dotted_names() {
        let permission: Permission = "members.invite".parse().unwrap();
        assert_eq!(permission, Permission::new(Resource::Members, Action::Invite));
        assert_eq!(permission.to_string(), "members.invite");

        assert!("members".parse::<Permission>().is_err());
        assert!("billing.read".parse::<Permission>().is_err());
    }
}

//! `workspace_members` constraint names.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Constraints on the `workspace_members` table.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum WorkspaceMemberConstraints {
    #[strum(serialize = "workspace_members_pkey")]
    PrimaryKey,
}

impl WorkspaceMemberConstraints {
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            WorkspaceMemberConstraints::PrimaryKey => ConstraintCategory::Uniqueness,
        }
    }
}

impl From<WorkspaceMemberConstraints> for String {
    #[inline]
    fn from(val: WorkspaceMemberConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for WorkspaceMemberConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

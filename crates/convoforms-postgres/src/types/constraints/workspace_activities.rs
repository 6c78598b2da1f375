//! `workspace_activities` constraint names.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Constraints on the `workspace_activities` table.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum WorkspaceActivityConstraints {
    #[strum(serialize = "workspace_activities_action_format")]
    ActionFormat,
}

impl WorkspaceActivityConstraints {
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            WorkspaceActivityConstraints::ActionFormat => ConstraintCategory::Validation,
        }
    }
}

impl From<WorkspaceActivityConstraints> for String {
    #[inline]
    fn from(val: WorkspaceActivityConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for WorkspaceActivityConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

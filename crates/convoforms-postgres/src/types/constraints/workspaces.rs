//! `workspaces` constraint names.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Constraints on the `workspaces` table.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum WorkspaceConstraints {
    #[strum(serialize = "workspaces_slug_unique")]
    SlugUnique,
    #[strum(serialize = "workspaces_one_default_per_owner")]
    OneDefaultPerOwner,
    #[strum(serialize = "workspaces_name_length")]
    NameLength,
    #[strum(serialize = "workspaces_slug_format")]
    SlugFormat,
    #[strum(serialize = "workspaces_description_length")]
    DescriptionLength,
    #[strum(serialize = "workspaces_settings_object")]
    SettingsObject,
}

impl WorkspaceConstraints {
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            WorkspaceConstraints::SlugUnique => ConstraintCategory::Uniqueness,
            WorkspaceConstraints::OneDefaultPerOwner => ConstraintCategory::BusinessLogic,
            WorkspaceConstraints::NameLength
            | WorkspaceConstraints::SlugFormat
            | WorkspaceConstraints::DescriptionLength
            | WorkspaceConstraints::SettingsObject => ConstraintCategory::Validation,
        }
    }
}

impl From<WorkspaceConstraints> for String {
    #[inline]
    fn from(val: WorkspaceConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for WorkspaceConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

//! `users` constraint names.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Constraints on the `users` table.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum UserConstraints {
    #[strum(serialize = "users_pkey")]
    PrimaryKey,
    #[strum(serialize = "users_email_unique")]
    EmailUnique,
    #[strum(serialize = "users_id_not_empty")]
    IdNotEmpty,
    #[strum(serialize = "users_email_format")]
    EmailFormat,
}

impl UserConstraints {
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            UserConstraints::PrimaryKey
            | UserConstraints::EmailUnique => ConstraintCategory::Uniqueness,
            UserConstraints::IdNotEmpty
            | UserConstraints::EmailFormat => ConstraintCategory::Validation,
        }
    }
}

impl From<UserConstraints> for String {
    #[inline]
    fn from(val: UserConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for UserConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

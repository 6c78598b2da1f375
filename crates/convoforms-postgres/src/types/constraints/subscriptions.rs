//! `subscriptions` constraint names.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Constraints on the `subscriptions` table.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum SubscriptionConstraints {
    #[strum(serialize = "subscriptions_user_unique")]
    UserUnique,
    #[strum(serialize = "subscriptions_max_workspaces_range")]
    MaxWorkspacesRange,
    #[strum(serialize = "subscriptions_max_seats_range")]
    MaxSeatsRange,
    #[strum(serialize = "subscriptions_addon_seats_non_negative")]
    AddonSeatsNonNegative,
}

impl SubscriptionConstraints {
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            SubscriptionConstraints::UserUnique => ConstraintCategory::Uniqueness,
            SubscriptionConstraints::MaxWorkspacesRange
            | SubscriptionConstraints::MaxSeatsRange
            | SubscriptionConstraints::AddonSeatsNonNegative => ConstraintCategory::Validation,
        }
    }
}

impl From<SubscriptionConstraints> for String {
    #[inline]
    fn from(val: SubscriptionConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for SubscriptionConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

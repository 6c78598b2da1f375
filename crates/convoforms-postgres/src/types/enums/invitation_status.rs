use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Lifecycle of a workspace invitation: `pending -> accepted | expired`.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::InvitationStatus"]
#[strum(serialize_all = "snake_case")]
pub enum InvitationStatus {
    #[db_rename = "pending"]
    #[serde(rename = "pending")]
    #[default]
    Pending,

    #[db_rename = "accepted"]
    #[serde(rename = "accepted")]
    Accepted,

    #[db_rename = "expired"]
    #[serde(rename = "expired")]
    Expired,
}

impl InvitationStatus {
    /// Returns whether no further transition is possible.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, InvitationStatus::Pending)
    }
}

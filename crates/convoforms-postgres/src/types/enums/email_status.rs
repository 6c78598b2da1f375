use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Delivery state of the invitation email.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::EmailStatus"]
#[strum(serialize_all = "snake_case")]
pub enum EmailStatus {
    #[db_rename = "queued"]
    #[serde(rename = "queued")]
    #[default]
    Queued,

    #[db_rename = "sent"]
    #[serde(rename = "sent")]
    Sent,

    #[db_rename = "failed"]
    #[serde(rename = "failed")]
    Failed,
}

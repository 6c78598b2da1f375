use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Subscription tier. Determines default quotas.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::SubscriptionPlan"]
#[strum(serialize_all = "snake_case")]
pub enum SubscriptionPlan {
    #[db_rename = "starter"]
    #[serde(rename = "starter")]
    #[default]
    Starter,

    #[db_rename = "pro"]
    #[serde(rename = "pro")]
    Pro,

    #[db_rename = "enterprise"]
    #[serde(rename = "enterprise")]
    Enterprise,
}

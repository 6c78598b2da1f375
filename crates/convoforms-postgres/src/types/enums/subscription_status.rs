use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Billing state reported by the payment provider.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::SubscriptionStatus"]
#[strum(serialize_all = "snake_case")]
pub enum SubscriptionStatus {
    #[db_rename = "active"]
    #[serde(rename = "active")]
    #[default]
    Active,

    #[db_rename = "trialing"]
    #[serde(rename = "trialing")]
    Trialing,

    #[db_rename = "past_due"]
    #[serde(rename = "past_due")]
    PastDue,

    #[db_rename = "canceled"]
    #[serde(rename = "canceled")]
    Canceled,
}

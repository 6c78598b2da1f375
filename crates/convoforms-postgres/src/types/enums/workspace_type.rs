use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Kind of workspace. Each owner has at most one `default` workspace.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::WorkspaceType"]
#[strum(serialize_all = "snake_case")]
pub enum WorkspaceType {
    /// Personal workspace created during onboarding.
    #[db_rename = "default"]
    #[serde(rename = "default")]
    Default,

    /// Workspace created explicitly for collaboration.
    #[db_rename = "team"]
    #[serde(rename = "team")]
    #[default]
    Team,
}

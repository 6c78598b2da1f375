//! Health check response types.

use convoforms_postgres::PgPoolStatus;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Connection pool figures reported by the health check.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PoolStatus {
    pub max_size: usize,
    pub size: usize,
    pub available: usize,
    pub waiting: usize,
}

impl From<PgPoolStatus> for PoolStatus {
    fn from(status: PgPoolStatus) -> Self {
        Self {
            max_size: status.max_size,
            size: status.size,
            available: status.available,
            waiting: status.waiting,
        }
    }
}

/// Health check response.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    /// `ok`, or `degraded` when the connection pool is under pressure.
    pub status: String,
    pub version: String,
    pub database: PoolStatus,
}

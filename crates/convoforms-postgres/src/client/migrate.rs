//! Embedded schema migrations.

use std::time::{Duration, Instant};

use diesel_async::RunQueryDsl;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use crate::{MIGRATIONS, PgClient, PgError, PgResult, PooledConnection, TRACING_TARGET_MIGRATION};

/// Applied and pending migration versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStatus {
    pub applied_versions: Vec<String>,
    pub pending_versions: Vec<String>,
}

impl MigrationStatus {
    #[inline]
    pub fn is_up_to_date(&self) -> bool {
        self.pending_versions.is_empty()
    }

    pub fn last_applied_version(&self) -> Option<&str> {
        self.applied_versions.iter().max().map(String::as_str)
    }
}

/// Outcome of a migration run.
#[derive(Debug, Clone)]
pub struct MigrationResult {
    pub duration: Duration,
    pub processed_versions: Vec<String>,
}

impl MigrationResult {
    /// Returns whether nothing had to be applied.
    #[inline]
    pub fn is_no_op(&self) -> bool {
        self.processed_versions.is_empty()
    }
}

/// Migration operations on [`PgClient`].
pub trait PgClientMigrationExt {
    /// Applies every pending migration. Safe to call on every startup.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<MigrationResult>> + Send;

    /// Lists applied and pending migrations.
    fn migration_status(&self) -> impl Future<Output = PgResult<MigrationStatus>> + Send;

    /// Checks that the diesel bookkeeping table exists.
    fn verify_schema_integrity(&self) -> impl Future<Output = PgResult<()>> + Send;
}

impl PgClientMigrationExt for PgClient {
    #[tracing::instrument(skip(self), target = TRACING_TARGET_MIGRATION)]
    async fn run_pending_migrations(&self) -> PgResult<MigrationResult> {
        let start = Instant::now();
        let conn = self.get_pooled_connection().await?;
        let mut conn: AsyncConnectionWrapper<PooledConnection> = conn.into();

        let outcome = spawn_blocking(move || {
            conn.run_pending_migrations(MIGRATIONS).map(|versions| {
                versions
                    .into_iter()
                    .map(|version| version.to_string())
                    .collect::<Vec<_>>()
            })
        })
        .await
        .map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_MIGRATION,
                error = %err,
                "migration task did not complete"
            );
            PgError::Migration(err.into())
        })?;

        let duration = start.elapsed();
        let processed_versions = outcome.map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_MIGRATION,
                duration = ?duration,
                error = %err,
                "failed to apply migrations"
            );
            PgError::Migration(err)
        })?;

        tracing::info!(
            target: TRACING_TARGET_MIGRATION,
            duration = ?duration,
            applied = processed_versions.len(),
            "database schema is up to date"
        );

        Ok(MigrationResult {
            duration,
            processed_versions,
        })
    }

    #[tracing::instrument(skip(self), target = TRACING_TARGET_MIGRATION)]
    async fn migration_status(&self) -> PgResult<MigrationStatus> {
        let conn = self.get_pooled_connection().await?;
        let mut conn: AsyncConnectionWrapper<PooledConnection> = conn.into();

        let status = spawn_blocking(move || {
            let applied_versions = conn
                .applied_migrations()?
                .into_iter()
                .map(|version| version.to_string())
                .collect();
            let pending_versions = conn
                .pending_migrations(MIGRATIONS)?
                .iter()
                .map(|migration| migration.name().version().to_string())
                .collect();

            Ok::<_, crate::error::BoxError>(MigrationStatus {
                applied_versions,
                pending_versions,
            })
        })
        .await
        .map_err(|err| PgError::Migration(err.into()))?
        .map_err(PgError::Migration)?;

        tracing::debug!(
            target: TRACING_TARGET_MIGRATION,
            applied = status.applied_versions.len(),
            pending = status.pending_versions.len(),
            "migration status retrieved"
        );

        Ok(status)
    }

    #[tracing::instrument(skip(self), target = TRACING_TARGET_MIGRATION)]
    async fn verify_schema_integrity(&self) -> PgResult<()> {
        #[derive(diesel::QueryableByName)]
        struct Exists {
            #[diesel(sql_type = diesel::sql_types::Bool)]
            exists: bool,
        }

        let mut conn = self.get_pooled_connection().await?;
        let table = diesel::sql_query(
            "SELECT EXISTS (
                SELECT FROM information_schema.tables
                WHERE table_name = '__diesel_schema_migrations'
             ) AS exists",
        )
        .get_result::<Exists>(&mut *conn)
        .await?;

        if !table.exists {
            tracing::warn!(
                target: TRACING_TARGET_MIGRATION,
                "migration table is missing, database is not initialized"
            );
            return Err(PgError::Migration(
                "migration table __diesel_schema_migrations does not exist".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reports_latest_applied_version() {
        let status = MigrationStatus {
            applied_versions: vec!["20250101000000".into(), "20250301000000".into()],
            pending_versions: vec![],
        };

        assert!(status.is_up_to_date());
        assert_eq!(status.last_applied_version(), Some("20250301000000"));
    }

    #[test]
    fn empty_run_is_no_op() {
        let result = MigrationResult {
            duration: Duration::from_millis(3),
            processed_versions: vec![],
        };
        assert!(result.is_no_op());
    }
}

//! Workspace activity repository. Insert and read only.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::Pagination;
use crate::model::{NewWorkspaceActivity, WorkspaceActivity};
use crate::{PgConnection, PgError, PgResult, schema};

pub trait WorkspaceActivityRepository {
    fn log_workspace_activity(
        &mut self,
        activity: NewWorkspaceActivity,
    ) -> impl Future<Output = PgResult<WorkspaceActivity>> + Send;

    /// Lists entries of a workspace, newest first.
    fn list_workspace_activity(
        &mut self,
        workspace_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<WorkspaceActivity>>> + Send;
}

impl WorkspaceActivityRepository for PgConnection {
    async fn log_workspace_activity(
        &mut self,
        activity: NewWorkspaceActivity,
    ) -> PgResult<WorkspaceActivity> {
        use schema::workspace_activities;

        diesel::insert_into(workspace_activities::table)
            .values(&activity)
            .returning(WorkspaceActivity::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_workspace_activity(
        &mut self,
        workspace_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<WorkspaceActivity>> {
        use schema::workspace_activities;

        workspace_activities::table
            .filter(workspace_activities::workspace_id.eq(workspace_id))
            .order(workspace_activities::created_at.desc())
            .select(WorkspaceActivity::as_select())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .load(self)
            .await
            .map_err(PgError::from)
    }
}

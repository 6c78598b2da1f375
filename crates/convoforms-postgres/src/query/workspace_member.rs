//! Workspace membership repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::Pagination;
use crate::model::{NewWorkspaceMember, UpdateWorkspaceMember, WorkspaceMember};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

pub trait WorkspaceMemberRepository {
    /// Loads the membership of `user_id` in `workspace_id`.
    fn find_workspace_member(
        &mut self,
        workspace_id: Uuid,
        user_id: &str,
    ) -> impl Future<Output = PgResult<Option<WorkspaceMember>>> + Send;

    /// Inserts a membership. A duplicate fails on `workspace_members_pkey`.
    fn add_workspace_member(
        &mut self,
        member: NewWorkspaceMember,
    ) -> impl Future<Output = PgResult<WorkspaceMember>> + Send;

    fn update_workspace_member(
        &mut self,
        workspace_id: Uuid,
        user_id: &str,
        changes: UpdateWorkspaceMember,
    ) -> impl Future<Output = PgResult<WorkspaceMember>> + Send;

    /// Deletes a membership, returning whether a row was removed.
    fn remove_workspace_member(
        &mut self,
        workspace_id: Uuid,
        user_id: &str,
    ) -> impl Future<Output = PgResult<bool>> + Send;

    /// Lists members, highest role first, then by join date.
    fn list_workspace_members(
        &mut self,
        workspace_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<WorkspaceMember>>> + Send;

    /// Counts occupied seats of a workspace.
    fn count_workspace_members(
        &mut self,
        workspace_id: Uuid,
    ) -> impl Future<Output = PgResult<i64>> + Send;
}

impl WorkspaceMemberRepository for PgConnection {
    async fn find_workspace_member(
        &mut self,
        workspace_id: Uuid,
        user_id: &str,
    ) -> PgResult<Option<WorkspaceMember>> {
        use schema::workspace_members;

        workspace_members::table
            .find((workspace_id, user_id))
            .select(WorkspaceMember::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn add_workspace_member(&mut self, member: NewWorkspaceMember) -> PgResult<WorkspaceMember> {
        use schema::workspace_members;

        let member = diesel::insert_into(workspace_members::table)
            .values(&member)
            .returning(WorkspaceMember::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            workspace_id = %member.workspace_id,
            user_id = %member.user_id,
            role = %member.role,
            "workspace member added"
        );

        Ok(member)
    }

    async fn update_workspace_member(
        &mut self,
        workspace_id: Uuid,
        user_id: &str,
        changes: UpdateWorkspaceMember,
    ) -> PgResult<WorkspaceMember> {
        use schema::workspace_members;

        diesel::update(workspace_members::table.find((workspace_id, user_id)))
            .set(&changes)
            .returning(WorkspaceMember::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn remove_workspace_member(&mut self, workspace_id: Uuid, user_id: &str) -> PgResult<bool> {
        use schema::workspace_members;

        let removed = diesel::delete(workspace_members::table.find((workspace_id, user_id)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(removed > 0)
    }

    async fn list_workspace_members(
        &mut self,
        workspace_id: Uuid,
        pagination: Pagination,
    ) -> PgResult<Vec<WorkspaceMember>> {
        use schema::workspace_members;

        workspace_members::table
            .filter(workspace_members::workspace_id.eq(workspace_id))
            .order((workspace_members::role.desc(), workspace_members::joined_at.asc()))
            .select(WorkspaceMember::as_select())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn count_workspace_members(&mut self, workspace_id: Uuid) -> PgResult<i64> {
        use schema::workspace_members;

        workspace_members::table
            .filter(workspace_members::workspace_id.eq(workspace_id))
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)
    }
}

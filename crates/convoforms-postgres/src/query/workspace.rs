//! Workspace repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use super::Pagination;
use crate::model::{NewWorkspace, NewWorkspaceMember, UpdateWorkspace, Workspace, WorkspaceMember};
use crate::types::WorkspaceType;
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

pub trait WorkspaceRepository {
    fn find_workspace_by_id(
        &mut self,
        workspace_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Workspace>>> + Send;

    fn find_workspace_by_slug(
        &mut self,
        slug: &str,
    ) -> impl Future<Output = PgResult<Option<Workspace>>> + Send;

    /// Returns the owner's `default` workspace, if onboarding created one.
    fn find_default_workspace(
        &mut self,
        owner_id: &str,
    ) -> impl Future<Output = PgResult<Option<Workspace>>> + Send;

    /// Counts workspaces owned by `owner_id`, of any type.
    fn count_owned_workspaces(
        &mut self,
        owner_id: &str,
    ) -> impl Future<Output = PgResult<i64>> + Send;

    /// Creates a workspace and its owner membership in one transaction.
    ///
    /// When `max_owned` is set, the owner's `users` row is locked and the
    /// owned workspaces are recounted first; `Ok(None)` means the cap was
    /// already reached and nothing was written.
    fn create_workspace_with_owner(
        &mut self,
        workspace: NewWorkspace,
        max_owned: Option<i64>,
    ) -> impl Future<Output = PgResult<Option<(Workspace, WorkspaceMember)>>> + Send;

    fn update_workspace(
        &mut self,
        workspace_id: Uuid,
        changes: UpdateWorkspace,
    ) -> impl Future<Output = PgResult<Workspace>> + Send;

    /// Lists the workspaces `user_id` belongs to, with the membership row.
    fn list_user_workspaces(
        &mut self,
        user_id: &str,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<(Workspace, WorkspaceMember)>>> + Send;
}

impl WorkspaceRepository for PgConnection {
    async fn find_workspace_by_id(&mut self, workspace_id: Uuid) -> PgResult<Option<Workspace>> {
        use schema::workspaces;

        workspaces::table
            .find(workspace_id)
            .select(Workspace::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_workspace_by_slug(&mut self, slug: &str) -> PgResult<Option<Workspace>> {
        use schema::workspaces;

        workspaces::table
            .filter(workspaces::slug.eq(slug))
            .select(Workspace::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_default_workspace(&mut self, owner_id: &str) -> PgResult<Option<Workspace>> {
        use schema::workspaces;

        workspaces::table
            .filter(workspaces::owner_id.eq(owner_id))
            .filter(workspaces::workspace_type.eq(WorkspaceType::Default))
            .select(Workspace::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn count_owned_workspaces(&mut self, owner_id: &str) -> PgResult<i64> {
        use schema::workspaces;

        workspaces::table
            .filter(workspaces::owner_id.eq(owner_id))
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn create_workspace_with_owner(
        &mut self,
        workspace: NewWorkspace,
        max_owned: Option<i64>,
    ) -> PgResult<Option<(Workspace, WorkspaceMember)>> {
        use schema::{users, workspace_members, workspaces};

        let created = self
            .transaction(|conn| {
                async move {
                    if let Some(limit) = max_owned {
                        // Concurrent creations by the same owner queue here.
                        users::table
                            .find(workspace.owner_id.as_str())
                            .select(users::id)
                            .for_update()
                            .first::<String>(conn)
                            .await
                            .optional()?;

                        let owned: i64 = workspaces::table
                            .filter(workspaces::owner_id.eq(&workspace.owner_id))
                            .count()
                            .get_result(conn)
                            .await?;

                        if owned >= limit {
                            return Ok(None);
                        }
                    }

                    let workspace = diesel::insert_into(workspaces::table)
                        .values(&workspace)
                        .returning(Workspace::as_returning())
                        .get_result(conn)
                        .await?;

                    let owner = NewWorkspaceMember::new_owner(workspace.id, &workspace.owner_id);
                    let member = diesel::insert_into(workspace_members::table)
                        .values(&owner)
                        .returning(WorkspaceMember::as_returning())
                        .get_result(conn)
                        .await?;

                    Ok::<_, PgError>(Some((workspace, member)))
                }
                .scope_boxed()
            })
            .await?;

        match &created {
            Some((workspace, _)) => tracing::info!(
                target: TRACING_TARGET_QUERY,
                workspace_id = %workspace.id,
                owner_id = %workspace.owner_id,
                slug = %workspace.slug,
                "workspace created"
            ),
            None => tracing::debug!(
                target: TRACING_TARGET_QUERY,
                max_owned,
                "workspace cap reached inside transaction"
            ),
        }

        Ok(created)
    }

    async fn update_workspace(
        &mut self,
        workspace_id: Uuid,
        changes: UpdateWorkspace,
    ) -> PgResult<Workspace> {
        use schema::workspaces;

        diesel::update(workspaces::table.find(workspace_id))
            .set(&changes)
            .returning(Workspace::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_user_workspaces(
        &mut self,
        user_id: &str,
        pagination: Pagination,
    ) -> PgResult<Vec<(Workspace, WorkspaceMember)>> {
        use schema::{workspace_members, workspaces};

        workspaces::table
            .inner_join(workspace_members::table)
            .filter(workspace_members::user_id.eq(user_id))
            .order(workspaces::created_at.asc())
            .select((Workspace::as_select(), WorkspaceMember::as_select()))
            .limit(pagination.limit)
            .offset(pagination.offset)
            .load(self)
            .await
            .map_err(PgError::from)
    }
}

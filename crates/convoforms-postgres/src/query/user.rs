//! User repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{NewUser, UpdateUser, User};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

pub trait UserRepository {
    /// Inserts the user or refreshes the profile of an existing one.
    fn upsert_user(&mut self, user: NewUser) -> impl Future<Output = PgResult<User>> + Send;

    fn find_user_by_id(
        &mut self,
        user_id: &str,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Looks a user up by lowercased email address.
    fn find_user_by_email(
        &mut self,
        email: &str,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;
}

impl UserRepository for PgConnection {
    async fn upsert_user(&mut self, user: NewUser) -> PgResult<User> {
        use schema::users;

        let changes = UpdateUser::from(&user);
        let user = diesel::insert_into(users::table)
            .values(&user)
            .on_conflict(users::id)
            .do_update()
            .set(&changes)
            .returning(User::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(target: TRACING_TARGET_QUERY, user_id = %user.id, "user upserted");
        Ok(user)
    }

    async fn find_user_by_id(&mut self, user_id: &str) -> PgResult<Option<User>> {
        use schema::users;

        users::table
            .find(user_id)
            .select(User::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_user_by_email(&mut self, email: &str) -> PgResult<Option<User>> {
        use schema::users;

        users::table
            .filter(users::email.eq(email))
            .select(User::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }
}

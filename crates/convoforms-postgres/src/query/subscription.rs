//! Subscription repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{NewSubscription, Subscription, UpdateSubscription};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

pub trait SubscriptionRepository {
    fn find_subscription_by_user(
        &mut self,
        user_id: &str,
    ) -> impl Future<Output = PgResult<Option<Subscription>>> + Send;

    /// Inserts `subscription` unless the user already has one, and returns
    /// the user's subscription either way.
    fn ensure_subscription(
        &mut self,
        subscription: NewSubscription,
    ) -> impl Future<Output = PgResult<Subscription>> + Send;

    /// Changes the plan or the quota overrides of a user's subscription.
    fn update_subscription(
        &mut self,
        user_id: &str,
        changes: UpdateSubscription,
    ) -> impl Future<Output = PgResult<Subscription>> + Send;
}

impl SubscriptionRepository for PgConnection {
    async fn find_subscription_by_user(&mut self, user_id: &str) -> PgResult<Option<Subscription>> {
        use schema::subscriptions;

        subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .select(Subscription::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn ensure_subscription(&mut self, subscription: NewSubscription) -> PgResult<Subscription> {
        use schema::subscriptions;

        let user_id = subscription.user_id.clone();
        diesel::insert_into(subscriptions::table)
            .values(&subscription)
            .on_conflict(subscriptions::user_id)
            .do_nothing()
            .execute(self)
            .await
            .map_err(PgError::from)?;

        subscriptions::table
            .filter(subscriptions::user_id.eq(&user_id))
            .select(Subscription::as_select())
            .first(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_subscription(
        &mut self,
        user_id: &str,
        changes: UpdateSubscription,
    ) -> PgResult<Subscription> {
        use schema::subscriptions;

        let subscription = diesel::update(subscriptions::table)
            .filter(subscriptions::user_id.eq(user_id))
            .set(&changes)
            .returning(Subscription::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        tracing::info!(
            target: TRACING_TARGET_QUERY,
            user_id,
            plan = %subscription.plan,
            max_workspaces = ?subscription.max_workspaces,
            max_seats_per_workspace = ?subscription.max_seats_per_workspace,
            addon_seats = subscription.addon_seats,
            "subscription updated"
        );

        Ok(subscription)
    }
}

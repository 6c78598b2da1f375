//! Per-user subscription and quota overrides.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::subscriptions;
use crate::types::{SubscriptionPlan, SubscriptionStatus};

/// One row per user. Non-null override columns take precedence over the
/// plan's defaults, `-1` meaning unlimited.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: String,
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub max_workspaces: Option<i32>,
    pub max_seats_per_workspace: Option<i32>,
    pub addon_seats: i32,
    pub current_period_end: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewSubscription {
    pub id: Uuid,
    pub user_id: String,
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateSubscription {
    pub plan: Option<SubscriptionPlan>,
    pub status: Option<SubscriptionStatus>,
    pub max_workspaces: Option<Option<i32>>,
    pub max_seats_per_workspace: Option<Option<i32>>,
    pub addon_seats: Option<i32>,
    pub current_period_end: Option<Option<Timestamp>>,
}

impl NewSubscription {
    /// Active starter subscription, the default for new users.
    pub fn starter(user_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: user_id.into(),
            plan: SubscriptionPlan::Starter,
            status: SubscriptionStatus::Active,
        }
    }
}

//! Plan defaults and their resolution against a subscription.

use std::fmt;

use convoforms_postgres::model::Subscription;
use convoforms_postgres::types::SubscriptionPlan;

/// A numeric quota that may be unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuotaLimit {
    Unlimited,
    Limited(i64),
}

impl QuotaLimit {
    /// Raw value used in storage for an unlimited quota.
    pub const UNLIMITED_RAW: i64 = -1;

    /// Decodes a stored value, where `-1` means unlimited.
    pub const fn from_raw(raw: i64) -> Self {
        if raw == Self::UNLIMITED_RAW {
            Self::Unlimited
        } else if raw < 0 {
            Self::Limited(0)
        } else {
            Self::Limited(raw)
        }
    }

    pub const fn as_raw(self) -> i64 {
        match self {
            Self::Unlimited => Self::UNLIMITED_RAW,
            Self::Limited(limit) => limit,
        }
    }

    #[inline]
    pub const fn is_unlimited(self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// Returns whether one more unit fits when `used` are taken.
    #[inline]
    pub const fn allows(self, used: i64) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Limited(limit) => used < limit,
        }
    }

    /// Units still available, `None` when unlimited.
    pub const fn remaining(self, used: i64) -> Option<i64> {
        match self {
            Self::Unlimited => None,
            Self::Limited(limit) if used >= limit => Some(0),
            Self::Limited(limit) => Some(limit - used),
        }
    }

    /// Adds extra units to a limited quota.
    pub const fn plus(self, extra: i64) -> Self {
        match self {
            Self::Unlimited => Self::Unlimited,
            Self::Limited(limit) => Self::Limited(limit + extra),
        }
    }
}

impl fmt::Display for QuotaLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => f.write_str("unlimited"),
            Self::Limited(limit) => write!(f, "{limit}"),
        }
    }
}

/// Static limits of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanConfig {
    pub plan: SubscriptionPlan,
    pub max_workspaces: QuotaLimit,
    pub max_seats_per_workspace: QuotaLimit,
    pub can_invite_users: bool,
    pub addon_seats_available: bool,
}

impl PlanConfig {
    pub const STARTER: Self = Self {
        plan: SubscriptionPlan::Starter,
        max_workspaces: QuotaLimit::Limited(1),
        max_seats_per_workspace: QuotaLimit::Limited(1),
        can_invite_users: false,
        addon_seats_available: false,
    };

    pub const PRO: Self = Self {
        plan: SubscriptionPlan::Pro,
        max_workspaces: QuotaLimit::Limited(3),
        max_seats_per_workspace: QuotaLimit::Limited(5),
        can_invite_users: true,
        addon_seats_available: true,
    };

    pub const ENTERPRISE: Self = Self {
        plan: SubscriptionPlan::Enterprise,
        max_workspaces: QuotaLimit::Unlimited,
        max_seats_per_workspace: QuotaLimit::Unlimited,
        can_invite_users: true,
        addon_seats_available: true,
    };

    pub const fn for_plan(plan: SubscriptionPlan) -> Self {
        match plan {
            SubscriptionPlan::Starter => Self::STARTER,
            SubscriptionPlan::Pro => Self::PRO,
            SubscriptionPlan::Enterprise => Self::ENTERPRISE,
        }
    }
}

/// Effective limits of one user.
///
/// Non-null overrides on the subscription replace the plan's workspace and
/// seat limits. The invite and add-on flags always come from the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLimits {
    pub plan: SubscriptionPlan,
    pub max_workspaces: QuotaLimit,
    pub max_seats_per_workspace: QuotaLimit,
    pub addon_seats: i64,
    pub can_invite_users: bool,
    pub addon_seats_available: bool,
}

impl ResolvedLimits {
    /// Resolves limits for a user. No subscription means the starter plan
    /// without add-on seats.
    pub fn resolve(subscription: Option<&Subscription>) -> Self {
        let Some(subscription) = subscription else {
            return Self::from_plan(PlanConfig::STARTER);
        };

        let defaults = PlanConfig::for_plan(subscription.plan);
        let max_workspaces = subscription
            .max_workspaces
            .map(|raw| QuotaLimit::from_raw(raw.into()))
            .unwrap_or(defaults.max_workspaces);
        let max_seats_per_workspace = subscription
            .max_seats_per_workspace
            .map(|raw| QuotaLimit::from_raw(raw.into()))
            .unwrap_or(defaults.max_seats_per_workspace);

        Self {
            max_workspaces,
            max_seats_per_workspace,
            addon_seats: i64::from(subscription.addon_seats.max(0)),
            ..Self::from_plan(defaults)
        }
    }

    const fn from_plan(config: PlanConfig) -> Self {
        Self {
            plan: config.plan,
            max_workspaces: config.max_workspaces,
            max_seats_per_workspace: config.max_seats_per_workspace,
            addon_seats: 0,
            can_invite_users: config.can_invite_users,
            addon_seats_available: config.addon_seats_available,
        }
    }

    /// Seats per workspace including purchased add-ons.
    #[inline]
    pub const fn total_seats(&self) -> QuotaLimit {
        self.max_seats_per_workspace.plus(self.addon_seats)
    }
}

#[cfg(test)]
mod tests {
    use convoforms_postgres::types::SubscriptionStatus;
    use uuid::Uuid;

    use super::*;

    fn subscription(plan: SubscriptionPlan) -> Subscription {
        let now = jiff::Timestamp::now().into();
        Subscription {
            id: Uuid::now_v7(),
            user_id: "alice".into(),
            plan,
            status: SubscriptionStatus::Active,
            max_workspaces: None,
            max_seats_per_workspace: None,
            addon_seats: 0,
            current_period_end: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn raw_sentinel_is_unlimited() {
        assert_eq!(QuotaLimit::from_raw(-1), QuotaLimit::Unlimited);
        assert_eq!(QuotaLimit::from_raw(3), QuotaLimit::Limited(3));
        assert_eq!(QuotaLimit::Unlimited.as_raw(), -1);
        assert!(QuotaLimit::Unlimited.allows(10_000));
        assert!(QuotaLimit::Unlimited.is_unlimited());
        assert!(!QuotaLimit::Limited(0).is_unlimited());
    }

    #[test]
    fn limited_allows_below_limit_only() {
        let limit = QuotaLimit::Limited(3);
        assert!(limit.allows(2));
        assert!(!limit.allows(3));
        assert_eq!(limit.remaining(1), Some(2));
        assert_eq!(limit.remaining(5), Some(0));
    }

    #[test]
    fn missing_subscription_is_starter() {
        let limits = ResolvedLimits::resolve(None);
        assert_eq!(limits.plan, SubscriptionPlan::Starter);
        assert_eq!(limits.max_workspaces, QuotaLimit::Limited(1));
        assert_eq!(limits.addon_seats, 0);
        assert!(!limits.can_invite_users);
    }

    #[test]
    fn overrides_win_over_plan_defaults() {
        let mut sub = subscription(SubscriptionPlan::Starter);
        sub.max_workspaces = Some(3);
        sub.max_seats_per_workspace = Some(-1);

        let limits = ResolvedLimits::resolve(Some(&sub));
        assert_eq!(limits.max_workspaces, QuotaLimit::Limited(3));
        assert_eq!(limits.max_seats_per_workspace, QuotaLimit::Unlimited);
        // Flags are not overridable.
        assert!(!limits.can_invite_users);
    }

    #[test]
    fn total_seats_include_addons() {
        let mut sub = subscription(SubscriptionPlan::Pro);
        sub.addon_seats = 2;

        let limits = ResolvedLimits::resolve(Some(&sub));
        assert_eq!(limits.total_seats(), QuotaLimit::Limited(7));

        let enterprise = ResolvedLimits::resolve(Some(&subscription(SubscriptionPlan::Enterprise)));
        assert_eq!(enterprise.total_seats(), QuotaLimit::Unlimited);
    }
}

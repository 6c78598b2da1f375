//! Onboarding response types.

use convoforms_access::Onboarding as OnboardingModel;
use convoforms_postgres::model;
use convoforms_postgres::types::SubscriptionPlan;
use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Workspace;

/// Profile of the signed-in user.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: Timestamp,
}

impl User {
    pub fn from_model(user: model::User) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            avatar_url: user.avatar_url,
            created_at: user.created_at.into(),
        }
    }
}

/// Result of onboarding the signed-in user.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Onboarding {
    pub user: User,
    pub plan: SubscriptionPlan,
    /// The user's default workspace.
    pub workspace: Workspace,
    /// Whether the user had already been onboarded before this call.
    pub already_onboarded: bool,
}

impl From<OnboardingModel> for Onboarding {
    fn from(onboarding: OnboardingModel) -> Self {
        Self {
            user: User::from_model(onboarding.user),
            plan: onboarding.subscription.plan,
            workspace: Workspace::from_model(onboarding.workspace),
            already_onboarded: onboarding.already_onboarded,
        }
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Claims read from a verified bearer token.
///
/// Only `sub` and `exp` are required. The profile claims follow the OpenID
/// Connect names and are used to prefill onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AuthClaims {
    /// Identity provider subject, used as the user id.
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Expiry as a unix timestamp.
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl AuthClaims {
    #[inline]
    pub fn user_id(&self) -> &str {
        &self.sub
    }
}

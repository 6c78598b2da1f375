//! Onboarding request types.

use convoforms_access::Identity;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::extract::AuthClaims;
use crate::handler::{ErrorKind, Result};

/// Profile details sent by the client after signing up.
///
/// Every field is optional. Values missing here are taken from the bearer
/// token claims.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OnboardUser {
    #[validate(email(message = "Enter a valid email address"), length(max = 254))]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(url, length(max = 2048))]
    pub avatar_url: Option<String>,
}

impl OnboardUser {
    /// Merges the payload with the token claims into an [`Identity`].
    pub fn into_identity(self, claims: &AuthClaims) -> Result<Identity> {
        let email = self
            .email
            .or_else(|| claims.email.clone())
            .ok_or_else(|| {
                ErrorKind::BadRequest
                    .with_message("An email address is required to complete onboarding")
                    .with_resource("user")
            })?;

        Ok(Identity {
            user_id: claims.sub.clone(),
            email,
            first_name: self.first_name.or_else(|| claims.given_name.clone()),
            last_name: self.last_name.or_else(|| claims.family_name.clone()),
            avatar_url: self.avatar_url.or_else(|| claims.picture.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(email: Option<&str>) -> AuthClaims {
        AuthClaims {
            sub: "user_1".to_owned(),
            email: email.map(str::to_owned),
            given_name: Some("Alice".to_owned()),
            family_name: None,
            picture: None,
            exp: 0,
            iat: None,
        }
    }

    #[test]
    fn falls_back_to_claims() {
        let identity = OnboardUser::default()
            .into_identity(&claims(Some("alice@example.com")))
            .unwrap();

        assert_eq!(identity.user_id, "user_1");
        assert_eq!(identity.email, "alice@example.com");
        assert_eq!(identity.first_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn payload_wins_over_claims() {
        let request = OnboardUser {
            email: Some("alice@work.com".to_owned()),
            first_name: Some("Ali".to_owned()),
            ..Default::default()
        };
        let identity = request
            .into_identity(&claims(Some("alice@example.com")))
            .unwrap();

        assert_eq!(identity.email, "alice@work.com");
        assert_eq!(identity.first_name.as_deref(), Some("Ali"));
    }

    #[test]
    fn email_is_required() {
        let error = OnboardUser::default().into_identity(&claims(None)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
    }
}

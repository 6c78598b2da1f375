use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use derive_more::Deref;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};

use super::{AuthClaims, AuthHeader, TRACING_TARGET_AUTHENTICATION};
use crate::handler::{Error, ErrorKind};
use crate::service::IdentityKeys;

/// Verified identity of the caller.
///
/// Verification happens once per request. The result is cached in the
/// request extensions so the authentication middleware and the handler
/// share it.
#[derive(Debug, Clone, Deref)]
pub struct AuthState(pub AuthClaims);

impl AuthState {
    /// Verifies `header` against `keys`.
    pub fn from_header(header: &AuthHeader, keys: &IdentityKeys) -> Result<Self, Error<'static>> {
        let claims: AuthClaims = keys.decode(header.token()).map_err(|error| {
            tracing::debug!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %error,
                "bearer token rejected"
            );
            Error::from(error)
        })?;

        if claims.sub.trim().is_empty() {
            return Err(ErrorKind::Unauthorized
                .with_message("Authentication token has no subject")
                .with_resource("authentication"));
        }

        Ok(Self(claims))
    }

    #[inline]
    pub fn user_id(&self) -> &str {
        self.0.user_id()
    }
}

impl<S> FromRequestParts<S> for AuthState
where
    S: Sync + Send,
    IdentityKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_state) = parts.extensions.get::<Self>() {
            return Ok(auth_state.clone());
        }

        let header = AuthHeader::from_request_parts(parts, state).await?;
        let keys = IdentityKeys::from_ref(state);
        let auth_state = Self::from_header(&header, &keys)?;

        parts.extensions.insert(auth_state.clone());
        Ok(auth_state)
    }
}

impl<S> OptionalFromRequestParts<S> for AuthState
where
    S: Sync + Send,
    IdentityKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <Self as FromRequestParts<S>>::from_request_parts(parts, state).await {
            Ok(auth_state) => Ok(Some(auth_state)),
            Err(_) => Ok(None),
        }
    }
}

impl aide::OperationInput for AuthState {}

impl From<JwtError> for Error<'static> {
    fn from(error: JwtError) -> Self {
        let error = match error.kind() {
            JwtErrorKind::ExpiredSignature => {
                ErrorKind::TokenExpired.with_message("Your session has expired")
            }
            JwtErrorKind::ImmatureSignature => {
                ErrorKind::Unauthorized.with_message("Authentication token is not valid yet")
            }
            JwtErrorKind::InvalidSignature => {
                ErrorKind::Unauthorized.with_message("Authentication token verification failed")
            }
            JwtErrorKind::InvalidAudience => ErrorKind::Unauthorized
                .with_message("Authentication token is not valid for this service"),
            JwtErrorKind::InvalidIssuer => ErrorKind::Unauthorized
                .with_message("Authentication token is from an untrusted source"),
            JwtErrorKind::InvalidAlgorithm | JwtErrorKind::InvalidAlgorithmName => {
                ErrorKind::MalformedAuthToken
                    .with_message("Authentication token uses an unsupported algorithm")
            }
            JwtErrorKind::MissingRequiredClaim(claim) => ErrorKind::MalformedAuthToken
                .with_message(format!("Authentication token is missing the {claim} claim")),
            JwtErrorKind::InvalidToken
            | JwtErrorKind::Base64(_)
            | JwtErrorKind::Json(_)
            | JwtErrorKind::Utf8(_) => {
                ErrorKind::MalformedAuthToken.with_message("Authentication token is malformed")
            }
            _ => ErrorKind::InternalServerError
                .with_message("Authentication verification encountered an error"),
        };

        error.with_resource("authentication")
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    use super::*;

    const SECRET: &[u8] = b"an-hs256-secret-that-is-long-enough";

    fn header(claims: serde_json::Value) -> AuthHeader {
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap();
        AuthHeader(token)
    }

    fn in_one_hour() -> i64 {
        jiff::Timestamp::now().as_second() + 3600
    }

    #[test]
    fn verifies_claims() {
        let keys = IdentityKeys::from_secret(SECRET);
        let state = AuthState::from_header(
            &header(json!({ "sub": "user_1", "email": "a@example.com", "exp": in_one_hour() })),
            &keys,
        )
        .unwrap();

        assert_eq!(state.user_id(), "user_1");
        assert_eq!(state.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn expired_tokens() {
        let keys = IdentityKeys::from_secret(SECRET);
        let error =
            AuthState::from_header(&header(json!({ "sub": "user_1", "exp": 1_000 })), &keys)
                .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::TokenExpired);
    }

    #[test]
    fn missing_subject() {
        let keys = IdentityKeys::from_secret(SECRET);
        let error = AuthState::from_header(&header(json!({ "exp": in_one_hour() })), &keys)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MalformedAuthToken);

        let error =
            AuthState::from_header(&header(json!({ "sub": " ", "exp": in_one_hour() })), &keys)
                .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn wrong_secret() {
        let keys = IdentityKeys::from_secret(b"a-completely-different-secret-value");
        let error = AuthState::from_header(
            &header(json!({ "sub": "user_1", "exp": in_one_hour() })),
            &keys,
        )
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn garbage_tokens() {
        let keys = IdentityKeys::from_secret(SECRET);
        let error = AuthState::from_header(&AuthHeader("not-a-jwt".to_owned()), &keys)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MalformedAuthToken);
    }
}

use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequestParts, Query as AxumQuery};
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use super::sanitize_error_message;
use crate::handler::{Error, ErrorKind};

/// [`axum::extract::Query`] with uniform rejections.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Query<T>(pub T);

impl<T> Query<T> {
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AxumQuery::<T>::from_request_parts(parts, state).await {
            Ok(AxumQuery(query)) => Ok(Query(query)),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

impl From<QueryRejection> for Error<'static> {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(
            target: "convoforms_server::extract::query",
            error = %rejection,
            "query string rejected"
        );

        let QueryRejection::FailedToDeserializeQueryString(err) = rejection else {
            return ErrorKind::BadRequest.with_message("Invalid query parameters");
        };

        let message = err.body_text();
        if message.contains("missing field") {
            let field = extract_field_name(&message).unwrap_or("unknown");
            ErrorKind::BadRequest
                .with_message("Missing required query parameter")
                .with_context(format!("The query parameter '{field}' is required"))
        } else if message.contains("duplicate field") {
            let field = extract_field_name(&message).unwrap_or("unknown");
            ErrorKind::BadRequest
                .with_message("Duplicate query parameter")
                .with_context(format!("The query parameter '{field}' was provided twice"))
        } else {
            ErrorKind::BadRequest
                .with_message("Invalid query parameters")
                .with_context(sanitize_error_message(&message, 200))
        }
    }
}

/// Pulls the backticked field name out of a serde error message.
fn extract_field_name(message: &str) -> Option<&str> {
    let start = message.find('`')? + 1;
    let end = message[start..].find('`')?;
    Some(&message[start..start + end])
}

impl<T> aide::OperationInput for Query<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        AxumQuery::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AxumQuery::<T>::inferred_early_responses(ctx, operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names() {
        assert_eq!(
            extract_field_name("Failed to deserialize query string: missing field `token`"),
            Some("token")
        );
        assert_eq!(extract_field_name("no field here"), None);
        assert_eq!(extract_field_name("unterminated `field"), None);
    }
}

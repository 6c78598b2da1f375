use axum::extract::{FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use super::Json;
use crate::handler::response::ValidationErrorDetail;
use crate::handler::{Error, ErrorKind};

/// JSON body that is validated with [`validator`] after deserialization.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T> ValidateJson<T> {
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        data.validate()?;
        Ok(Self::new(data))
    }
}

fn format_validation_error(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return format!("Field '{field}': {message}");
    }

    let bound = |name: &str| error.params.get(name).and_then(serde_json::Value::as_u64);
    match error.code.as_ref() {
        "required" => format!("Field '{field}' is required"),
        "email" => format!("Field '{field}' must be a valid email address"),
        "url" => format!("Field '{field}' must be a valid URL"),
        "length" => match (bound("min"), bound("max")) {
            (Some(min), Some(max)) => {
                format!("Field '{field}' must be between {min} and {max} characters long")
            }
            (Some(min), None) => format!("Field '{field}' must be at least {min} characters long"),
            (None, Some(max)) => format!("Field '{field}' must be at most {max} characters long"),
            (None, None) => format!("Field '{field}' has invalid length"),
        },
        "range" => match (bound("min"), bound("max")) {
            (Some(min), Some(max)) => format!("Field '{field}' must be between {min} and {max}"),
            _ => format!("Field '{field}' is out of range"),
        },
        code => format!("Field '{field}' failed validation: {code}"),
    }
}

impl From<ValidationErrors> for Error<'static> {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, field_errors)| {
                field_errors
                    .iter()
                    .map(move |error| format_validation_error(field, error))
            })
            .collect();
        messages.sort();

        tracing::debug!(
            target: "convoforms_server::extract::validation",
            errors = ?errors.field_errors(),
            "request validation failed"
        );

        let message = match messages.as_slice() {
            [] => "Validation failed".to_owned(),
            _ => messages.join(". "),
        };

        ErrorKind::BadRequest
            .with_message(message)
            .with_resource("request")
            .with_validation_errors(ValidationErrorDetail::from_errors(&errors))
    }
}

impl<T> aide::OperationInput for ValidateJson<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        Json::<T>::inferred_early_responses(ctx, operation)
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;

    #[test]
    fn length_messages() {
        let mut error = ValidationError::new("length");
        error.add_param(Cow::Borrowed("min"), &1);
        error.add_param(Cow::Borrowed("max"), &64);
        assert_eq!(
            format_validation_error("name", &error),
            "Field 'name' must be between 1 and 64 characters long"
        );
    }

    #[test]
    fn custom_messages_win() {
        let error = ValidationError::new("slug").with_message(Cow::Borrowed("is taken"));
        assert_eq!(format_validation_error("slug", &error), "Field 'slug': is taken");
    }

    #[test]
    fn validation_errors_become_bad_request() {
        let mut errors = ValidationErrors::new();
        errors.add("email", ValidationError::new("email"));

        let error = Error::from(errors);
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.resource(), Some("request"));
        assert_eq!(
            error.message(),
            Some("Field 'email' must be a valid email address")
        );
    }
}

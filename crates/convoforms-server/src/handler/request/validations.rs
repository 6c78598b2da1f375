//! Custom validators shared by request types.

use std::borrow::Cow;

use validator::ValidationError;

pub fn validation_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Accepts slugs the workspace table would accept.
pub fn workspace_slug(slug: &str) -> Result<(), ValidationError> {
    convoforms_access::validate_slug(slug)
        .map_err(|error| validation_error("slug_format", error.to_string()))
}

/// Rejects values that are empty once trimmed.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(validation_error("blank", "Must not be blank"));
    }

    Ok(())
}

/// Accepts JSON objects only.
pub fn json_object(value: &serde_json::Value) -> Result<(), ValidationError> {
    if !value.is_object() {
        return Err(validation_error("not_object", "Settings must be a JSON object"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs() {
        assert!(workspace_slug("acme-labs").is_ok());
        assert!(workspace_slug("Acme").is_err());
        assert!(workspace_slug("-acme").is_err());
    }

    #[test]
    fn blank_values() {
        assert!(not_blank("Acme").is_ok());
        assert!(not_blank("   ").is_err());
    }

    #[test]
    fn settings_must_be_objects() {
        assert!(json_object(&serde_json::json!({ "theme": "dark" })).is_ok());
        assert!(json_object(&serde_json::json!([1, 2])).is_err());
    }
}

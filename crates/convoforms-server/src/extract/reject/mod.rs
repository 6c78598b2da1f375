//! Drop-in replacements for the axum body and URL extractors.
//!
//! Every rejection is turned into a [`handler::Error`] so clients always get
//! the same JSON error shape.
//!
//! [`handler::Error`]: crate::handler::Error

mod enhanced_json;
mod enhanced_path;
mod enhanced_query;
mod validated_json;

pub use self::enhanced_json::Json;
pub use self::enhanced_path::Path;
pub use self::enhanced_query::Query;
pub use self::validated_json::ValidateJson;

/// Keeps the first lines of a rejection message and caps its length.
fn sanitize_error_message(message: &str, max_chars: usize) -> String {
    message
        .lines()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(max_chars)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_truncates() {
        let message = "first line\nsecond line\nthird line";
        assert_eq!(sanitize_error_message(message, 200), "first line second line");
        assert_eq!(sanitize_error_message(message, 5), "first");
    }
}

//! Validation helpers for request DTOs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::web::error::ApiError;

/// A JSON extractor that validates the request body.
///
/// Deserialization failures become `400 Bad Request`; validation failures
/// become `422` with per-field messages.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

/// A node or collection name: non-blank, no `/`, no control characters.
pub fn node_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("node_name").with_message("Must not be empty".into()));
    }
    if value.contains('/') {
        return Err(ValidationError::new("node_name").with_message("Must not contain '/'".into()));
    }
    if value.chars().any(char::is_control) {
        return Err(ValidationError::new("node_name")
            .with_message("Must not contain control characters".into()));
    }
    Ok(())
}

/// A CSS hex color: `#rgb` or `#rrggbb`.
pub fn hex_color(value: &str) -> Result<(), ValidationError> {
    let valid = value
        .strip_prefix('#')
        .filter(|hex| hex.len() == 3 || hex.len() == 6)
        .is_some_and(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()));
    if !valid {
        return Err(ValidationError::new("hex_color")
            .with_message("Must be a hex color like #4caf50".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_name() {
        assert!(node_name("notes.md").is_ok());
        assert!(node_name("My Folder").is_ok());
        assert!(node_name("").is_err());
        assert!(node_name("  ").is_err());
        assert!(node_name("a/b").is_err());
        assert!(node_name("bad\x00name").is_err());
        assert!(node_name("two\nlines").is_err());
    }

    #[test]
    fn test_hex_color() {
        assert!(hex_color("#4caf50").is_ok());
        assert!(hex_color("#FFF").is_ok());
        assert!(hex_color("4caf50").is_err());
        assert!(hex_color("#4caf5").is_err());
        assert!(hex_color("#zzzzzz").is_err());
        assert!(hex_color("red").is_err());
    }
}

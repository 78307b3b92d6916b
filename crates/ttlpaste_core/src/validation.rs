//! Creation request validation.
//!
//! Works on the raw JSON body so that type mistakes (`"ttl_seconds": 2.5`,
//! `"content": 7`) surface as field-specific messages instead of generic
//! deserialization failures. Checks run in a fixed order and stop at the
//! first violation.

use crate::constants::MAX_TTL_SECONDS;
use crate::error::AppError;
use crate::models::paste::NewPaste;
use serde_json::{Map, Value};
use thiserror::Error;

/// A rejected creation request. `Display` is the message returned to clients.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("content is required and must be a non-empty string")]
    ContentMissing,

    #[error("content cannot be empty")]
    ContentEmpty,

    #[error("content exceeds maximum of {max} bytes")]
    ContentTooLarge { max: usize },

    #[error("ttl_seconds must be an integer ≥ 1")]
    InvalidTtl,

    #[error("max_views must be an integer ≥ 1")]
    InvalidMaxViews,
}

impl ValidationError {
    /// Name of the offending request field, if the error is about one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::NotAnObject => None,
            Self::ContentMissing | Self::ContentEmpty | Self::ContentTooLarge { .. } => {
                Some("content")
            }
            Self::InvalidTtl => Some("ttl_seconds"),
            Self::InvalidMaxViews => Some("max_views"),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        AppError::BadRequest(value.to_string())
    }
}

/// Validate a create-paste body.
///
/// Order: content presence/type, content emptiness (trimmed), content size,
/// `ttl_seconds`, `max_views`. Stored content is never trimmed.
/// `ttl_seconds` above [`MAX_TTL_SECONDS`] is rejected like any other
/// invalid ttl.
///
/// # Arguments
/// - `body`: Parsed JSON request body.
/// - `max_paste_size`: Largest accepted content length in bytes.
///
/// # Returns
/// The validated [`NewPaste`].
///
/// # Errors
/// The first [`ValidationError`] encountered.
pub fn validate_create_request(
    body: &Value,
    max_paste_size: usize,
) -> Result<NewPaste, ValidationError> {
    let fields = body.as_object().ok_or(ValidationError::NotAnObject)?;

    let content = match fields.get("content") {
        Some(Value::String(content)) => content,
        _ => return Err(ValidationError::ContentMissing),
    };
    if content.trim().is_empty() {
        return Err(ValidationError::ContentEmpty);
    }
    if content.len() > max_paste_size {
        return Err(ValidationError::ContentTooLarge {
            max: max_paste_size,
        });
    }

    let ttl_seconds = optional_positive_integer(fields, "ttl_seconds")
        .filter(|ttl| ttl.map_or(true, |ttl| ttl <= MAX_TTL_SECONDS))
        .ok_or(ValidationError::InvalidTtl)?;
    let max_views =
        optional_positive_integer(fields, "max_views").ok_or(ValidationError::InvalidMaxViews)?;

    Ok(NewPaste {
        content: content.clone(),
        ttl_seconds,
        max_views,
    })
}

/// `Some(None)` when absent, `Some(Some(n))` for an integer ≥ 1, `None` when
/// the field is present with any other value (including `null`).
///
/// Integral floats such as `5.0` count as integers; out-of-range floats
/// saturate to `u64::MAX`.
fn optional_positive_integer(fields: &Map<String, Value>, name: &str) -> Option<Option<u64>> {
    let Some(value) = fields.get(name) else {
        return Some(None);
    };
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(n) = number.as_u64() {
        return (n >= 1).then_some(Some(n));
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= 1.0 => Some(Some(f as u64)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MAX: usize = 1024;

    fn reject(body: Value) -> ValidationError {
        validate_create_request(&body, MAX).expect_err("body should be rejected")
    }

    #[test]
    fn accepts_minimal_and_full_requests() {
        let minimal = validate_create_request(&json!({ "content": "hello" }), MAX)
            .expect("minimal body");
        assert_eq!(minimal.ttl_seconds, None);
        assert_eq!(minimal.max_views, None);

        let full = validate_create_request(
            &json!({ "content": "  y  ", "ttl_seconds": 10, "max_views": 3 }),
            MAX,
        )
        .expect("full body");
        assert_eq!(full.content, "  y  ", "stored content is not trimmed");
        assert_eq!(full.ttl_seconds, Some(10));
        assert_eq!(full.max_views, Some(3));
    }

    #[test]
    fn whitespace_only_content_is_empty() {
        for content in ["", "   ", "\n\t "] {
            let err = reject(json!({ "content": content }));
            assert_eq!(err, ValidationError::ContentEmpty);
            assert_eq!(err.to_string(), "content cannot be empty");
        }
    }

    #[test]
    fn missing_or_non_string_content_is_rejected() {
        for body in [json!({}), json!({ "content": 5 }), json!({ "content": null })] {
            assert_eq!(reject(body), ValidationError::ContentMissing);
        }
        assert_eq!(reject(json!("content")), ValidationError::NotAnObject);
    }

    #[test]
    fn ttl_must_be_a_positive_integer() {
        for ttl in [json!(0), json!(-5), json!(2.5), json!("10"), json!(null)] {
            let err = reject(json!({ "content": "x", "ttl_seconds": ttl }));
            assert_eq!(err, ValidationError::InvalidTtl, "ttl {}", ttl);
            assert_eq!(err.field(), Some("ttl_seconds"));
        }
        let integral_float = validate_create_request(
            &json!({ "content": "x", "ttl_seconds": 5.0 }),
            MAX,
        )
        .expect("5.0 is an integer");
        assert_eq!(integral_float.ttl_seconds, Some(5));
    }

    #[test]
    fn ttl_beyond_renderable_range_is_rejected() {
        for ttl in [json!(10_000_000_000_000u64), json!(1e300), json!(u64::MAX)] {
            let err = reject(json!({ "content": "x", "ttl_seconds": ttl }));
            assert_eq!(err, ValidationError::InvalidTtl, "ttl {}", ttl);
        }
        let longest = validate_create_request(
            &json!({ "content": "x", "ttl_seconds": MAX_TTL_SECONDS }),
            MAX,
        )
        .expect("largest ttl accepted");
        assert_eq!(longest.ttl_seconds, Some(MAX_TTL_SECONDS));
    }

    #[test]
    fn max_views_must_be_a_positive_integer() {
        for views in [json!(0), json!(-1), json!(1.5), json!(true)] {
            let err = reject(json!({ "content": "x", "max_views": views }));
            assert_eq!(err.to_string(), "max_views must be an integer ≥ 1");
        }
    }

    #[test]
    fn first_failure_wins_in_field_order() {
        let err = reject(json!({ "content": " ", "ttl_seconds": 0, "max_views": 0 }));
        assert_eq!(err, ValidationError::ContentEmpty);
        let err = reject(json!({ "content": "x", "ttl_seconds": 0, "max_views": 0 }));
        assert_eq!(err, ValidationError::InvalidTtl);
    }

    #[test]
    fn oversized_content_is_rejected() {
        let err = reject(json!({ "content": "a".repeat(MAX + 1) }));
        assert_eq!(err.to_string(), "content exceeds maximum of 1024 bytes");
    }

    #[test]
    fn repeated_validation_gives_the_same_message() {
        let body = json!({ "content": "x", "ttl_seconds": -5 });
        let first = reject(body.clone()).to_string();
        let second = reject(body).to_string();
        assert_eq!(first, second);
    }

    #[test]
    fn converts_into_bad_request() {
        let err: AppError = ValidationError::ContentEmpty.into();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "content cannot be empty"));
    }
}

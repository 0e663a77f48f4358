//! Validation error types
//!
//! Field-level validation for the few inputs the client collects:
//! email, password and post content.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Validation error with field-level details
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Validation failed: {message}")]
pub struct ValidationError {
    /// High-level validation message
    pub message: String,

    /// Field-specific errors
    pub field_errors: HashMap<String, Vec<FieldError>>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }

    /// Add a field error
    pub fn add_field_error(
        mut self,
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let error = FieldError {
            code: code.into(),
            message: message.into(),
        };

        self.field_errors.entry(field.into()).or_default().push(error);

        self
    }

    /// First message recorded for a field
    pub fn field_message(&self, field: &str) -> Option<&str> {
        self.field_errors
            .get(field)
            .and_then(|errors| errors.first())
            .map(|e| e.message.as_str())
    }
}

/// Individual field validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Error code (e.g., "required", "invalid_format", "too_short")
    pub code: String,

    /// Human-readable error message
    pub message: String,
}

/// Common validation rules
pub mod rules {
    use super::ValidationError;
    use once_cell::sync::Lazy;
    use regex::Regex;

    // RFC 5322 simplified
    static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
        )
        .expect("email regex is valid")
    });

    /// Validate email format
    pub fn validate_email(email: &str) -> Result<(), ValidationError> {
        if !EMAIL_REGEX.is_match(email) {
            return Err(ValidationError::new("Invalid email format")
                .add_field_error("email", "invalid_format", "Email address is not valid"));
        }

        Ok(())
    }

    /// Validate string length in characters
    pub fn validate_length(
        field: &str,
        value: &str,
        min: Option<usize>,
        max: Option<usize>,
    ) -> Result<(), ValidationError> {
        let len = value.chars().count();

        if let Some(min) = min {
            if len < min {
                return Err(ValidationError::new("Validation failed").add_field_error(
                    field,
                    "too_short",
                    format!("Must be at least {} characters", min),
                ));
            }
        }

        if let Some(max) = max {
            if len > max {
                return Err(ValidationError::new("Validation failed").add_field_error(
                    field,
                    "too_long",
                    format!("Must be at most {} characters", max),
                ));
            }
        }

        Ok(())
    }

    /// Validate required field
    pub fn validate_required(field: &str, value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("Validation failed").add_field_error(
                field,
                "required",
                "This field is required",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::rules::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.org").is_ok());

        let err = validate_email("not-an-email").unwrap_err();
        assert_eq!(err.field_errors["email"][0].code, "invalid_format");
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_length_counts_characters() {
        // four characters, nine bytes
        assert!(validate_length("password", "ñññ✓", Some(4), None).is_ok());

        let err = validate_length("password", "12345", Some(6), None).unwrap_err();
        assert_eq!(err.field_errors["password"][0].code, "too_short");
        assert_eq!(err.field_message("password"), Some("Must be at least 6 characters"));
    }

    #[test]
    fn test_required_rejects_whitespace() {
        assert!(validate_required("content", "   \n\t").is_err());
        assert!(validate_required("content", " hi ").is_ok());
    }
}

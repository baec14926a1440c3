//! # Error Types
//!
//! Errors raised while validating agent payloads.

use thiserror::Error;

/// A payload did not conform to the expected shape.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// The JSON value could not be deserialized into the target type.
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// The value deserialized but a field failed its format check.
    #[error("Invalid {field}: {reason}")]
    InvalidField {
        /// Field or type name.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

impl SchemaError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_field_message() {
        let err = SchemaError::invalid("address", "missing 0x prefix");
        assert_eq!(err.to_string(), "Invalid address: missing 0x prefix");
    }

    #[test]
    fn test_malformed_message() {
        let err = SchemaError::Malformed("expected object".to_string());
        assert!(err.to_string().contains("expected object"));
    }
}

//! # Payload Schemas
//!
//! "Validate a value of shape T, fail otherwise." A type's shape is its serde
//! representation; [`Schema::check`] adds the format rules serde cannot
//! express (hex widths, required object payloads).

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::SchemaError;

/// A type that can be validated out of a raw agent payload.
pub trait Schema: DeserializeOwned {
    /// Format checks applied after deserialization.
    fn check(&self) -> Result<(), SchemaError> {
        Ok(())
    }
}

/// Deserialize `raw` into `T` and run its format checks.
pub fn parse<T: Schema>(raw: Value) -> Result<T, SchemaError> {
    let value: T =
        serde_json::from_value(raw).map_err(|e| SchemaError::Malformed(e.to_string()))?;
    value.check()?;
    Ok(value)
}

impl<T: Schema> Schema for Vec<T> {
    fn check(&self) -> Result<(), SchemaError> {
        self.iter().try_for_each(Schema::check)
    }
}

impl<T: Schema> Schema for Option<T> {
    fn check(&self) -> Result<(), SchemaError> {
        self.as_ref().map_or(Ok(()), Schema::check)
    }
}

impl Schema for Value {}

impl Schema for String {}

impl Schema for bool {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_value() {
        let value: Value = parse(json!({"any": "thing"})).unwrap();
        assert_eq!(value["any"], "thing");
    }

    #[test]
    fn test_parse_wrong_shape_is_malformed() {
        let result: Result<bool, _> = parse(json!("not a bool"));
        assert!(matches!(result, Err(SchemaError::Malformed(_))));
    }

    #[test]
    fn test_option_accepts_null() {
        let value: Option<String> = parse(Value::Null).unwrap();
        assert!(value.is_none());
    }
}

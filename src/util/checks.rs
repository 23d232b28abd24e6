//! Shape predicates for untyped option values.
//!
//! A field that is absent from an update is `None`; an explicit JSON `null`
//! is present, and therefore not undefined.

use serde_json::Value;

/// Whether the value is absent
pub fn is_undefined(value: Option<&Value>) -> bool {
    value.is_none()
}

/// Whether the value is an explicit `null`
pub fn is_null(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Null))
}

/// Whether the value is a string
pub fn is_string(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(_)))
}

/// Whether the value is a number
pub fn is_number(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Number(_)))
}

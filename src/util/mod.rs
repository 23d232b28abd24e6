//! Utility module
//!
//! This module provides the value shape checks and the numeric rounding
//! used throughout the library.

pub mod checks;
mod round;

pub use self::checks::{is_null, is_number, is_string, is_undefined};
pub use self::round::{round, DEFAULT_ROUNDING_DECIMALS};

use serde_json::Value;

/// Renders a value for an error message. Strings render bare, absent
/// values as `undefined`, everything else as JSON.
pub fn describe(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(value) => value.to_string(),
        None => "undefined".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe() {
        assert_eq!(describe(None), "undefined");
        assert_eq!(describe(Some(&Value::Null)), "null");
        assert_eq!(describe(Some(&json!("purple"))), "purple");
        assert_eq!(describe(Some(&json!(2.5))), "2.5");
        assert_eq!(describe(Some(&json!(["s"]))), r#"["s"]"#);
    }
}

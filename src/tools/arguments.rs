//! Typed access to tool call arguments.

use serde_json::Value;

use crate::error::ParleyError;

/// Wrapper around tool call arguments providing typed extraction.
///
/// Models occasionally send the argument object as a JSON-encoded string;
/// that form is decoded on construction.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: Value,
}

impl ToolArguments {
    pub fn new(value: Value) -> Self {
        let value = match value {
            Value::String(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    Value::Object(Default::default())
                } else {
                    serde_json::from_str(trimmed).unwrap_or(Value::String(raw))
                }
            }
            other => other,
        };
        Self { value }
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &Value {
        &self.value
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, ParleyError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| ParleyError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional, non-blank string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    /// Get an integer argument. Numeric strings are accepted.
    pub fn get_i64(&self, key: &str) -> Result<i64, ParleyError> {
        match self.value.get(key) {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
        .ok_or_else(|| ParleyError::InvalidArgument(format!("Missing integer argument: {key}")))
    }

    /// Get a float argument. Numeric strings are accepted.
    pub fn get_f64(&self, key: &str) -> Result<f64, ParleyError> {
        match self.value.get(key) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
        .ok_or_else(|| ParleyError::InvalidArgument(format!("Missing numeric argument: {key}")))
    }
}

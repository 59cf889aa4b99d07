//! Forgiving decoders for payload fields the UI sends in inconsistent shapes.
//!
//! UI code sends numbers as JSON numbers or numeric strings, and sizes as
//! objects or as JSON text. These helpers accept every shape that was ever
//! sent and fall back to a default for anything else, so one bad field never
//! rejects a whole command.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Interpret a JSON value as a finite float.
///
/// Numbers and numeric strings (surrounding whitespace allowed) are accepted.
pub fn number_from_value(value: &Value) -> Option<f32> {
    let number = match value {
        Value::Number(n) => n.as_f64()? as f32,
        Value::String(s) => s.trim().parse::<f32>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Deserialize a float, defaulting to `0.0` when the value is not numeric.
pub fn f32_or_zero<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value).unwrap_or(0.0))
}

/// Deserialize a float, keeping `None` when the value is not numeric.
pub fn f32_or_none<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

/// Render a JSON value as text: strings verbatim, everything else as JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Deserialize a field that may be a string or any JSON value into text.
pub fn text_or_json<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value))
}

/// Deserialize an optional object that may also arrive as JSON-encoded text.
///
/// Anything that does not decode into `T` becomes `None`.
pub fn object_or_json_text<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let decoded = match value {
        Value::String(text) => serde_json::from_str(&text).ok(),
        Value::Null => None,
        other => serde_json::from_value(other).ok(),
    };
    Ok(decoded)
}

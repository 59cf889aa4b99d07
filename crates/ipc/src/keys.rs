//! Key / key-combo extraction from `send_message_to_main` payloads.
//!
//! Pages report keyboard input in many shapes. The accepted shapes are
//! tried in a fixed order and the first match wins:
//!
//! 1. blank data yields nothing; non-JSON text is itself the key
//! 2. top-level string or list fields in [`TOP_LEVEL_FIELDS`] order
//! 3. list fields in [`LIST_FIELDS`] order
//! 4. one level down, inside each of [`CONTAINERS`], fields in
//!    [`NESTED_FIELDS`] order
//! 5. a command name starting with `key` is itself the key

use serde_json::{Map, Value};

pub const TOP_LEVEL_FIELDS: [&str; 6] = ["key", "code", "combo", "text", "name", "key_text"];

pub const LIST_FIELDS: [&str; 2] = ["keys", "comboKeys"];

pub const CONTAINERS: [&str; 5] = ["event", "data", "payload", "value", "detail"];

pub const NESTED_FIELDS: [&str; 8] = [
    "key", "code", "combo", "keys", "comboKeys", "text", "name", "key_text",
];

/// Derive the key text for a `send_message_to_main` call, if any.
pub fn extract_key_text(command_name: &str, command_data: &Value) -> Option<String> {
    match command_data {
        Value::Null => return None,
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(fields)) => {
                    if let Some(key) = from_object(&fields) {
                        return Some(key);
                    }
                }
                Ok(_) => {}
                Err(_) => return Some(text.to_string()),
            }
        }
        Value::Object(fields) => {
            if let Some(key) = from_object(fields) {
                return Some(key);
            }
        }
        _ => {}
    }

    command_name
        .to_ascii_lowercase()
        .starts_with("key")
        .then(|| command_name.to_string())
}

fn from_object(fields: &Map<String, Value>) -> Option<String> {
    let top_level = TOP_LEVEL_FIELDS
        .iter()
        .find_map(|field| fields.get(*field).and_then(string_or_joined));
    if top_level.is_some() {
        return top_level;
    }

    let listed = LIST_FIELDS
        .iter()
        .find_map(|field| fields.get(*field).and_then(joined));
    if listed.is_some() {
        return listed;
    }

    CONTAINERS.iter().find_map(|container| {
        let Some(Value::Object(inner)) = fields.get(*container) else {
            return None;
        };
        NESTED_FIELDS
            .iter()
            .find_map(|field| inner.get(*field).and_then(string_or_joined))
    })
}

fn string_or_joined(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        other => joined(other),
    }
}

fn joined(value: &Value) -> Option<String> {
    let Value::Array(items) = value else {
        return None;
    };
    if items.is_empty() {
        return None;
    }
    let parts: Vec<String> = items
        .iter()
        .map(|item| match item {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .collect();
    Some(parts.join("+"))
}

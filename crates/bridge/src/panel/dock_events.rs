//! Forwarded dock events that act on panels (drag, close, float, resize)

use dockyard_ipc::lenient::number_from_value;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    /// Move a floating panel by a delta
    Drag { dx: i32, dy: i32 },
    Close,
    Float(bool),
    /// Missing fields keep the panel's current geometry
    Resize {
        x: Option<i32>,
        y: Option<i32>,
        width: Option<i32>,
        height: Option<i32>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelDockEvent {
    /// `routename` of the addressed panel; `None` addresses every panel
    pub target: Option<String>,
    pub action: PanelAction,
}

impl PanelDockEvent {
    /// Decode a forwarded event. Unknown types and payloads that are not a
    /// JSON object yield `None`.
    pub fn parse(event_type: &str, event_data: &str) -> Option<Self> {
        let data: Value = serde_json::from_str(event_data).ok()?;
        let data = data.as_object()?;

        let target = match data.get("routename") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name.clone()),
            Some(other) => Some(other.to_string()),
        };

        let action = match event_type {
            "drag" => PanelAction::Drag {
                dx: int_field(data, "deltaX").unwrap_or(0),
                dy: int_field(data, "deltaY").unwrap_or(0),
            },
            "close" => PanelAction::Close,
            "float" => PanelAction::Float(data.get("isFloating").is_some_and(truthy)),
            "resize" => PanelAction::Resize {
                x: int_field(data, "x"),
                y: int_field(data, "y"),
                width: int_field(data, "width"),
                height: int_field(data, "height"),
            },
            _ => return None,
        };

        Some(Self { target, action })
    }

    pub fn applies_to(&self, panel: &str) -> bool {
        self.target.as_deref().is_none_or(|target| target == panel)
    }
}

fn int_field(data: &Map<String, Value>, key: &str) -> Option<i32> {
    data.get(key).and_then(number_from_value).map(|n| n as i32)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::Null => false,
    }
}

//! Outbound events broadcast from the bridge to UI surfaces.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Name and source path of an actor, as reported to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSummary {
    pub name: String,
    pub path: String,
}

/// Outcome reported by `sceneSaved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    Success,
    Error,
}

/// Events carried on the generic `dock_event` channel.
#[derive(Debug, Clone, PartialEq)]
pub enum DockEvent {
    ActorCreated(ActorSummary),
    SceneLoaded { actors: Vec<ActorSummary> },
    SceneError { message: String },
    SunDirectionError { message: String },
    ScriptError { message: String, stacktrace: String },
    SceneSaved {
        status: SaveStatus,
        filepath: Option<String>,
    },
    /// Relayed verbatim from `forward_dock_event` (drag, close, float, ...)
    Forwarded { event_type: String, event_data: String },
    /// JSON text addressed to one panel by `send_message_to_dock`
    DockData { data: String },
}

impl DockEvent {
    pub fn event_type(&self) -> &str {
        match self {
            Self::ActorCreated(_) => "actorCreated",
            Self::SceneLoaded { .. } => "sceneLoaded",
            Self::SceneError { .. } => "sceneError",
            Self::SunDirectionError { .. } => "sunDirectionError",
            Self::ScriptError { .. } => "scriptError",
            Self::SceneSaved { .. } => "sceneSaved",
            Self::Forwarded { event_type, .. } => event_type,
            Self::DockData { .. } => "dockData",
        }
    }

    /// The JSON text surfaces receive as `eventData`.
    pub fn event_data(&self) -> String {
        let data = match self {
            Self::ActorCreated(actor) => json!({ "name": actor.name, "path": actor.path }),
            Self::SceneLoaded { actors } => json!({ "actors": actors }),
            Self::SceneError { message } | Self::SunDirectionError { message } => {
                json!({ "type": "error", "message": message })
            }
            Self::ScriptError {
                message,
                stacktrace,
            } => json!({ "status": "error", "message": message, "stacktrace": stacktrace }),
            Self::SceneSaved { status, filepath } => {
                json!({ "status": status, "filepath": filepath })
            }
            Self::Forwarded { event_data, .. } => return event_data.clone(),
            Self::DockData { data } => return data.clone(),
        };
        data.to_string()
    }
}

/// Status of an assistant reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiStatus {
    Success,
    Error,
}

/// Body of an `ai_response` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub status: AiStatus,
    /// Seconds since the Unix epoch
    pub timestamp: u64,
}

impl AiResponse {
    pub fn success(content: impl Into<String>, timestamp: u64) -> Self {
        Self {
            kind: "ai_response".to_string(),
            content: content.into(),
            status: AiStatus::Success,
            timestamp,
        }
    }

    pub fn failure(message: impl Into<String>, timestamp: u64) -> Self {
        Self {
            kind: "error".to_string(),
            content: message.into(),
            status: AiStatus::Error,
            timestamp,
        }
    }

    /// The JSON string surfaces receive.
    pub fn to_json(&self) -> String {
        // Only strings and integers inside; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Everything the bridge can emit.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    /// Generic `dock_event(eventType, eventData)` channel
    Dock(DockEvent),
    AiResponse(AiResponse),
    /// Relayed `send_message_to_main` for the main surface
    CommandToMain {
        command_name: String,
        command_data: String,
    },
    /// Key or key combo derived from a `send_message_to_main` payload
    KeyEvent { key: String },
}

impl BridgeEvent {
    /// Channel name the event travels on.
    pub fn channel(&self) -> &'static str {
        match self {
            Self::Dock(_) => "dock_event",
            Self::AiResponse(_) => "ai_response",
            Self::CommandToMain { .. } => "command_to_main",
            Self::KeyEvent { .. } => "key_event",
        }
    }

    /// Flatten into a single JSON object for line-oriented transports.
    pub fn to_wire(&self) -> Value {
        match self {
            Self::Dock(event) => json!({
                "channel": self.channel(),
                "eventType": event.event_type(),
                "eventData": event.event_data(),
            }),
            Self::AiResponse(response) => json!({
                "channel": self.channel(),
                "message": response.to_json(),
            }),
            Self::CommandToMain {
                command_name,
                command_data,
            } => json!({
                "channel": self.channel(),
                "commandName": command_name,
                "commandData": command_data,
            }),
            Self::KeyEvent { key } => json!({ "channel": self.channel(), "key": key }),
        }
    }
}

impl From<DockEvent> for BridgeEvent {
    fn from(event: DockEvent) -> Self {
        Self::Dock(event)
    }
}

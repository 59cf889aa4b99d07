//! Inbound commands sent by UI surfaces.
//!
//! Surfaces address the bridge with a command name plus a JSON payload.
//! [`Command::parse`] turns that pair into a closed enum so the bridge can
//! match exhaustively instead of looking handlers up by string.

mod panel;
mod scene;

pub use panel::*;
pub use scene::*;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::IpcError;
use crate::lenient;

/// Raw payload as it arrives from a surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// JSON text (possibly malformed)
    Text(String),
    /// Already-decoded JSON
    Json(Value),
}

impl Payload {
    /// Decode into a JSON value. Blank text reads as `null`.
    pub fn into_value(self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Json(value) => Ok(value),
            Self::Text(text) if text.trim().is_empty() => Ok(Value::Null),
            Self::Text(text) => serde_json::from_str(&text),
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Every command name the bridge understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    AddDockWidget,
    RemoveDockWidget,
    CreateActor,
    RemoveActor,
    CreateScene,
    ActorDelete,
    ActorOperation,
    CameraMove,
    SunDirection,
    ExecutePythonCode,
    SceneSave,
    SendMessageToAi,
    SendMessageToMain,
    ForwardDockEvent,
    SendMessageToDock,
    OpenFileDialog,
    CloseProcess,
}

impl CommandName {
    pub const ALL: [CommandName; 17] = [
        Self::AddDockWidget,
        Self::RemoveDockWidget,
        Self::CreateActor,
        Self::RemoveActor,
        Self::CreateScene,
        Self::ActorDelete,
        Self::ActorOperation,
        Self::CameraMove,
        Self::SunDirection,
        Self::ExecutePythonCode,
        Self::SceneSave,
        Self::SendMessageToAi,
        Self::SendMessageToMain,
        Self::ForwardDockEvent,
        Self::SendMessageToDock,
        Self::OpenFileDialog,
        Self::CloseProcess,
    ];

    /// The wire name surfaces use.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddDockWidget => "add_dock_widget",
            Self::RemoveDockWidget => "remove_dock_widget",
            Self::CreateActor => "create_actor",
            Self::RemoveActor => "remove_actor",
            Self::CreateScene => "create_scene",
            Self::ActorDelete => "actor_delete",
            Self::ActorOperation => "actor_operation",
            Self::CameraMove => "camera_move",
            Self::SunDirection => "sun_direction",
            Self::ExecutePythonCode => "execute_python_code",
            Self::SceneSave => "scene_save",
            Self::SendMessageToAi => "send_message_to_ai",
            Self::SendMessageToMain => "send_message_to_main",
            Self::ForwardDockEvent => "forward_dock_event",
            Self::SendMessageToDock => "send_message_to_dock",
            Self::OpenFileDialog => "open_file_dialog",
            Self::CloseProcess => "close_process",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == name)
    }
}

impl std::fmt::Display for CommandName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of `execute_python_code`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExecuteCode {
    pub code: String,
    #[serde(default)]
    pub index: u32,
}

/// Payload of `send_message_to_ai`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AiQuery {
    #[serde(default)]
    pub message: String,
}

/// Payload of `send_message_to_main`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainMessage {
    pub command_name: String,
    /// String or object; kept as JSON so key extraction can inspect it
    #[serde(default)]
    pub command_data: Value,
}

impl MainMessage {
    /// The data as text, the form the main surface receives it in.
    pub fn data_text(&self) -> String {
        lenient::value_to_text(&self.command_data)
    }
}

/// Payload of `forward_dock_event`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardDockEvent {
    pub event_type: String,
    #[serde(default, deserialize_with = "lenient::text_or_json")]
    pub event_data: String,
}

/// Payload of `send_message_to_dock`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SendMessageToDock {
    pub routename: String,
    /// JSON text for the panel; objects are re-encoded
    #[serde(
        default,
        rename = "jsonData",
        alias = "json_data",
        deserialize_with = "lenient::text_or_json"
    )]
    pub json_data: String,
}

/// A fully decoded inbound command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddDockWidget(AddDockWidget),
    RemoveDockWidget(RemoveDockWidget),
    CreateActor(CreateActor),
    /// Reset the `mainscene` entry
    RemoveActor,
    CreateScene(CreateScene),
    ActorDelete(ActorDelete),
    ActorOperation(ActorOperation),
    CameraMove(CameraMove),
    SunDirection(SunDirection),
    ExecutePythonCode(ExecuteCode),
    /// Arbitrary scene document to persist
    SceneSave(Value),
    SendMessageToAi(AiQuery),
    SendMessageToMain(MainMessage),
    ForwardDockEvent(ForwardDockEvent),
    SendMessageToDock(SendMessageToDock),
    OpenFileDialog(OpenFileDialog),
    CloseProcess,
}

impl Command {
    /// Decode a command name and payload.
    ///
    /// Unknown names and payloads that are not valid JSON (or do not match
    /// the command's fields) are errors; commands without fields accept any
    /// valid JSON.
    pub fn parse(name: &str, payload: impl Into<Payload>) -> Result<Self, IpcError> {
        let command =
            CommandName::from_wire(name).ok_or_else(|| IpcError::UnknownCommand(name.to_string()))?;
        let value = payload
            .into()
            .into_value()
            .map_err(|source| IpcError::InvalidPayload {
                command: command.as_str(),
                source,
            })?;

        Ok(match command {
            CommandName::AddDockWidget => Self::AddDockWidget(decode(command, value)?),
            CommandName::RemoveDockWidget => Self::RemoveDockWidget(decode(command, value)?),
            CommandName::CreateActor => Self::CreateActor(decode(command, value)?),
            CommandName::RemoveActor => Self::RemoveActor,
            CommandName::CreateScene => Self::CreateScene(decode(command, value)?),
            CommandName::ActorDelete => Self::ActorDelete(decode(command, value)?),
            CommandName::ActorOperation => Self::ActorOperation(decode(command, value)?),
            CommandName::CameraMove => Self::CameraMove(decode(command, object_or_empty(value))?),
            CommandName::SunDirection => {
                Self::SunDirection(decode(command, object_or_empty(value))?)
            }
            CommandName::ExecutePythonCode => Self::ExecutePythonCode(decode(command, value)?),
            CommandName::SceneSave => Self::SceneSave(value),
            CommandName::SendMessageToAi => Self::SendMessageToAi(decode(command, value)?),
            CommandName::SendMessageToMain => Self::SendMessageToMain(decode(command, value)?),
            CommandName::ForwardDockEvent => Self::ForwardDockEvent(decode(command, value)?),
            CommandName::SendMessageToDock => Self::SendMessageToDock(decode(command, value)?),
            CommandName::OpenFileDialog => Self::OpenFileDialog(decode(command, value)?),
            CommandName::CloseProcess => Self::CloseProcess,
        })
    }

    pub fn name(&self) -> CommandName {
        match self {
            Self::AddDockWidget(_) => CommandName::AddDockWidget,
            Self::RemoveDockWidget(_) => CommandName::RemoveDockWidget,
            Self::CreateActor(_) => CommandName::CreateActor,
            Self::RemoveActor => CommandName::RemoveActor,
            Self::CreateScene(_) => CommandName::CreateScene,
            Self::ActorDelete(_) => CommandName::ActorDelete,
            Self::ActorOperation(_) => CommandName::ActorOperation,
            Self::CameraMove(_) => CommandName::CameraMove,
            Self::SunDirection(_) => CommandName::SunDirection,
            Self::ExecutePythonCode(_) => CommandName::ExecutePythonCode,
            Self::SceneSave(_) => CommandName::SceneSave,
            Self::SendMessageToAi(_) => CommandName::SendMessageToAi,
            Self::SendMessageToMain(_) => CommandName::SendMessageToMain,
            Self::ForwardDockEvent(_) => CommandName::ForwardDockEvent,
            Self::SendMessageToDock(_) => CommandName::SendMessageToDock,
            Self::OpenFileDialog(_) => CommandName::OpenFileDialog,
            Self::CloseProcess => CommandName::CloseProcess,
        }
    }
}

fn decode<T: DeserializeOwned>(command: CommandName, value: Value) -> Result<T, IpcError> {
    serde_json::from_value(value).map_err(|source| IpcError::InvalidPayload {
        command: command.as_str(),
        source,
    })
}

// Commands whose every field has a default also accept an empty payload.
fn object_or_empty(value: Value) -> Value {
    if value.is_null() {
        Value::Object(Default::default())
    } else {
        value
    }
}

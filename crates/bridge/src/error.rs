//! Error types for the command bridge.

use dockyard_ipc::IpcError;
use thiserror::Error;

use crate::engine::EngineError;
use crate::panel::HostError;
use crate::services::ServiceError;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Ipc(#[from] IpcError),

    #[error("Scene '{0}' does not exist")]
    SceneNotFound(String),

    #[error("Scene '{0}' has no engine scene attached")]
    SceneDetached(String),

    #[error("Actor '{actor}' is not in scene '{scene}'")]
    ActorNotFound { scene: String, actor: String },

    #[error("Panel '{0}' does not exist")]
    PanelNotFound(String),

    #[error("Invalid panel request: {0}")]
    InvalidPanelRequest(String),

    #[error("No panel host is attached")]
    NoPanelHost,

    #[error("Invalid JSON for panel '{panel}': {source}")]
    InvalidDockMessage {
        panel: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid scene document: {0}")]
    SceneDocument(#[source] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Render an error and its sources, one per line.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str("\ncaused by: ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

//! Error types for IPC operations.

/// Errors that can occur while decoding inbound commands.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid payload for `{command}`: {source}")]
    InvalidPayload {
        command: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

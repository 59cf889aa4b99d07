//! Line-oriented transport between stdio and the bridge
//!
//! Each stdin line is one command `{"command": <name>, "payload": <json>}`.
//! Each stdout line is one event as produced by `BridgeEvent::to_wire`.

use std::io::BufRead;

use dockyard_bridge::{BridgeHandle, EventReceiver};
use dockyard_ipc::{BridgeEvent, Payload};
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};

#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("Line is not JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Line is not a command object")]
    NotAnObject,

    #[error("Line has no \"command\" name")]
    MissingCommand,
}

/// Parse one stdin line. Blank lines yield `Ok(None)`.
///
/// A string payload is passed on as text, so commands whose payload is
/// itself JSON-encoded text decode exactly as they would from a web page.
pub fn parse_line(line: &str) -> Result<Option<(String, Payload)>, LineError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let Value::Object(mut object) = serde_json::from_str(line)? else {
        return Err(LineError::NotAnObject);
    };
    let name = match object.remove("command") {
        Some(Value::String(name)) if !name.is_empty() => name,
        _ => return Err(LineError::MissingCommand),
    };
    let payload = match object.remove("payload") {
        Some(Value::String(text)) => Payload::Text(text),
        Some(value) => Payload::Json(value),
        None => Payload::Json(Value::Null),
    };
    Ok(Some((name, payload)))
}

/// Dispatch every command read from `reader`, then `close_process` at EOF.
///
/// Blocking; run it on its own thread. Returns the number of commands
/// dispatched, not counting the final `close_process`.
pub fn feed_commands(reader: impl BufRead, bridge: &BridgeHandle) -> usize {
    let mut dispatched = 0;
    for (number, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to read stdin: {}", e);
                break;
            }
        };
        match parse_line(&line) {
            Ok(Some((name, payload))) => {
                bridge.dispatch(name, payload);
                dispatched += 1;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Skipping input line {}: {}", number + 1, e),
        }
    }

    tracing::info!("Input closed after {} commands", dispatched);
    bridge.dispatch("close_process", Payload::Json(Value::Null));
    dispatched
}

/// Write each event as a JSON line until the bridge drops the surface.
pub async fn write_events<W>(mut events: EventReceiver, mut out: W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(event) = events.recv().await {
        let mut line = event.to_wire().to_string();
        line.push('\n');
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;
    }
    Ok(())
}

/// What the main surface does with an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MainAction {
    Reload,
    Ignore,
    Log(String),
}

pub fn handle_main_event(event: &BridgeEvent) -> MainAction {
    match event {
        BridgeEvent::CommandToMain { command_name, .. } if command_name == "go_home" => {
            MainAction::Reload
        }
        BridgeEvent::CommandToMain { command_name, .. } if command_name == "input_event" => {
            MainAction::Ignore
        }
        BridgeEvent::CommandToMain {
            command_name,
            command_data,
        } => MainAction::Log(format!("{command_name}: {command_data}")),
        BridgeEvent::KeyEvent { key } => MainAction::Log(format!("key {key}")),
        other => MainAction::Log(other.channel().to_string()),
    }
}

/// Drive the headless main surface until the bridge drops it.
pub async fn run_main_surface(mut events: EventReceiver) {
    while let Some(event) = events.recv().await {
        match handle_main_event(&event) {
            MainAction::Reload => tracing::info!("Main surface reloading home page"),
            MainAction::Ignore => {}
            MainAction::Log(message) => tracing::debug!("Main surface: {}", message),
        }
    }
}

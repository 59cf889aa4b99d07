//! IPC protocol for Dockyard
//!
//! Defines the commands UI surfaces send to the command bridge and the events
//! the bridge broadcasts back.

pub mod commands;
pub mod error;
pub mod events;
pub mod keys;
pub mod lenient;
pub mod scripts;

pub use commands::*;
pub use error::IpcError;
pub use events::*;
pub use keys::extract_key_text;

//! AI assistant backends for Dockyard
//!
//! The bridge treats the assistant as a slow, blocking black box: it is only
//! ever called from a worker thread, never from the coordinating loop.

mod remote;

pub use remote::RemoteAssistant;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No assistant backend is configured")]
    Unconfigured,
}

/// Trait for assistant backends
pub trait AssistantBackend: Send + Sync {
    /// Answer a query, blocking the calling thread until the reply is complete
    fn ask(&self, query: &str) -> Result<String, AssistantError>;
}

/// Backend used when no assistant server is configured; every query fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredAssistant;

impl AssistantBackend for UnconfiguredAssistant {
    fn ask(&self, _query: &str) -> Result<String, AssistantError> {
        Err(AssistantError::Unconfigured)
    }
}

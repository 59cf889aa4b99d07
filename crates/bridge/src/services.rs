//! File dialogs and the script sink
//!
//! Both are native services the bridge calls synchronously from the
//! coordinating loop.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl ServiceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A file the user picked, with its contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedFile {
    pub path: String,
    pub content: String,
}

/// Native open/save dialogs. `Ok(None)` means the user cancelled.
pub trait FileDialogs {
    /// Pick a model file to load as an actor
    fn pick_model(&mut self) -> Result<Option<String>, ServiceError>;

    /// Pick and read a saved scene document
    fn open_scene(&mut self) -> Result<Option<OpenedFile>, ServiceError>;

    /// Ask where to save a scene document and write it there
    fn save_scene(&mut self, content: &str) -> Result<Option<String>, ServiceError>;
}

/// Destination for code sent with `execute_python_code`
pub trait ScriptSink {
    /// Persist a script and return where it went
    fn write_script(&mut self, code: &str, index: u32) -> Result<PathBuf, ServiceError>;
}

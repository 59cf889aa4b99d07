//! Shared configuration for Dockyard
//!
//! Single source of truth for display geometry, panel lifecycle timing, and
//! the locations of external services. Every section has a `Default`;
//! [`DockyardConfig::from_env`] overlays `DOCKYARD_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default primary display width in pixels
pub const DEFAULT_WIDTH: u32 = 1920;

/// Default primary display height in pixels
pub const DEFAULT_HEIGHT: u32 = 1080;

/// Default scale factor (1.0 = no scaling)
pub const DEFAULT_SCALE: f32 = 1.0;

/// Default delay between panel teardown phases
pub const DEFAULT_TEARDOWN_DELAY_MS: u64 = 50;

/// Display configuration for the primary screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Left edge of the primary screen in desktop coordinates
    pub x: i32,
    /// Top edge of the primary screen in desktop coordinates
    pub y: i32,
    /// Width in logical pixels
    pub width: u32,
    /// Height in logical pixels
    pub height: u32,
    /// Scale factor for DPI scaling
    pub scale: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            scale: DEFAULT_SCALE,
        }
    }
}

impl DisplayConfig {
    /// Create a new display config with the given dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Get scaled width (for physical pixel calculations)
    pub fn scaled_width(&self) -> u32 {
        (self.width as f32 * self.scale) as u32
    }

    /// Get scaled height (for physical pixel calculations)
    pub fn scaled_height(&self) -> u32 {
        (self.height as f32 * self.scale) as u32
    }
}

/// Timing of the deferred panel teardown sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeardownConfig {
    /// Delay before phases 2 and 3; phase 1 only yields
    pub phase_delay_ms: u64,
}

impl Default for TeardownConfig {
    fn default() -> Self {
        Self {
            phase_delay_ms: DEFAULT_TEARDOWN_DELAY_MS,
        }
    }
}

impl TeardownConfig {
    pub fn phase_delay(&self) -> Duration {
        Duration::from_millis(self.phase_delay_ms)
    }
}

/// What creating a panel under an already-used name does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePanelPolicy {
    /// Tear the existing panel down and drop the request
    #[default]
    Toggle,
    /// Tear the existing panel down, then create the requested one
    Replace,
}

impl DuplicatePanelPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "toggle" => Some(Self::Toggle),
            "replace" => Some(Self::Replace),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    pub duplicate_policy: DuplicatePanelPolicy,
}

/// Location of the assistant backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// WebSocket URL; `None` leaves the assistant unconfigured
    pub server_url: Option<String>,
}

/// Directories used by the file-backed services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub script_dir: PathBuf,
    pub saves_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            script_dir: PathBuf::from("script"),
            saves_dir: PathBuf::from("saves"),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DockyardConfig {
    pub display: DisplayConfig,
    pub teardown: TeardownConfig,
    pub panels: PanelConfig,
    pub assistant: AssistantConfig,
    pub storage: StorageConfig,
}

impl DockyardConfig {
    /// Defaults overlaid with `DOCKYARD_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    ///
    /// Unparseable values are logged and the default is kept.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup("DOCKYARD_TEARDOWN_DELAY_MS") {
            match raw.trim().parse() {
                Ok(ms) => config.teardown.phase_delay_ms = ms,
                Err(_) => tracing::warn!("Ignoring DOCKYARD_TEARDOWN_DELAY_MS={raw:?}"),
            }
        }

        if let Some(raw) = lookup("DOCKYARD_DUPLICATE_PANELS") {
            match DuplicatePanelPolicy::parse(&raw) {
                Some(policy) => config.panels.duplicate_policy = policy,
                None => tracing::warn!("Ignoring DOCKYARD_DUPLICATE_PANELS={raw:?}"),
            }
        }

        if let Some(url) = lookup("DOCKYARD_ASSISTANT_URL").filter(|url| !url.trim().is_empty()) {
            config.assistant.server_url = Some(url);
        }

        if let Some(dir) = lookup("DOCKYARD_SCRIPT_DIR") {
            config.storage.script_dir = PathBuf::from(dir);
        }

        if let Some(dir) = lookup("DOCKYARD_SAVES_DIR") {
            config.storage.saves_dir = PathBuf::from(dir);
        }

        config
    }
}

//! Binary-level configuration

use dockyard_bridge::SurfaceKind;

/// Which bridge events are echoed on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventEcho {
    /// Every event, whichever surface it is meant for
    #[default]
    All,
    /// Only what the main surface receives
    Main,
}

impl EventEcho {
    /// Parse from environment variable DOCKYARD_EVENTS
    pub fn from_env() -> Self {
        Self::parse(std::env::var("DOCKYARD_EVENTS").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("main") => Self::Main,
            Some("all") | None => Self::All,
            Some(other) => {
                tracing::warn!("Unknown DOCKYARD_EVENTS={other:?}; echoing all events");
                Self::All
            }
        }
    }

    pub fn surface_kind(self) -> SurfaceKind {
        match self {
            Self::All => SurfaceKind::Observer,
            Self::Main => SurfaceKind::Main,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub echo: EventEcho,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            echo: EventEcho::from_env(),
        }
    }
}

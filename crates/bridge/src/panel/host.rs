//! The native layer that actually shows panels

use dockyard_ipc::{DockArea, FloatAnchor, PanelSize};

use crate::bus::EventSender;

/// Bridge-assigned panel identity. A name can be reused; an id cannot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(pub u64);

/// Rectangle in desktop coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rightmost pixel column (inclusive)
    pub fn right(&self) -> i32 {
        self.x + self.width - 1
    }

    /// Bottom pixel row (inclusive)
    pub fn bottom(&self) -> i32 {
        self.y + self.height - 1
    }

    pub fn center(&self) -> (i32, i32) {
        ((self.x + self.right()) / 2, (self.y + self.bottom()) / 2)
    }
}

/// Current geometry of a mounted panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelFrame {
    pub rect: Rect,
    pub floating: bool,
}

/// Resolved placement of a new panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Docked(DockArea),
    Floating { anchor: FloatAnchor, x: i32, y: i32 },
}

/// Everything the host needs to mount a panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSpec {
    pub id: PanelId,
    pub name: String,
    pub route_path: String,
    pub placement: Placement,
    pub size: Option<PanelSize>,
}

/// What the host hands back after mounting
#[derive(Debug, Default)]
pub struct MountedPanel {
    /// Event channel for the panel's web content, if it has one
    pub events: Option<EventSender>,
}

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Failed to mount panel '{name}': {reason}")]
    Mount { name: String, reason: String },

    #[error("Panel {0:?} is not mounted")]
    UnknownPanel(PanelId),

    #[error("Panel host error: {0}")]
    Other(String),
}

/// The native layer that mounts, moves, and disposes panels.
///
/// Called only from the coordinating loop.
pub trait PanelHost {
    /// Geometry of the primary display
    fn primary_screen(&self) -> Rect;

    /// Create the panel and load its route into embedded web content
    fn mount(&mut self, spec: &PanelSpec) -> Result<MountedPanel, HostError>;

    /// Teardown phase 1: hide and detach the panel's web content
    fn detach_content(&mut self, id: PanelId) -> Result<(), HostError>;

    /// Teardown phase 2: hide the panel, detach it from its parent and
    /// schedule its disposal
    fn dispose_panel(&mut self, id: PanelId) -> Result<(), HostError>;

    fn frame(&self, id: PanelId) -> Option<PanelFrame>;

    fn move_panel(&mut self, id: PanelId, x: i32, y: i32) -> Result<(), HostError>;

    fn resize_panel(&mut self, id: PanelId, width: i32, height: i32) -> Result<(), HostError>;

    /// Dock or float the panel, then raise it
    fn set_floating(&mut self, id: PanelId, floating: bool) -> Result<(), HostError>;
}

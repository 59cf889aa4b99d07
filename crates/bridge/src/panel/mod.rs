//! Panel lifecycle: creation, placement, forwarded dock events, and the
//! deferred teardown state machine

mod dock_events;
mod host;
mod lifecycle;
mod placement;
mod registry;

pub use dock_events::{PanelAction, PanelDockEvent};
pub use host::{HostError, MountedPanel, PanelFrame, PanelHost, PanelId, PanelSpec, Placement, Rect};
pub use lifecycle::{CreateOutcome, PanelLifecycleController, TeardownTick};
pub use placement::{BOTTOM_ANCHOR_OFFSET, RIGHT_ANCHOR_OFFSET, anchor_origin, resolve};
pub use registry::{PanelEntry, PanelRegistry, PanelState, TeardownPhase};

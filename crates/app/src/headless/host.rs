//! In-memory panel host
//!
//! Keeps panel geometry the way a window manager would and logs the scripts
//! a web panel would be sent.

use std::collections::HashMap;

use dockyard_bridge::panel::{HostError, MountedPanel, PanelFrame, PanelId, PanelSpec, Placement, Rect};
use dockyard_bridge::{EventReceiver, PanelHost};
use dockyard_config::DisplayConfig;
use dockyard_ipc::{BridgeEvent, DockArea, scripts};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Width of a left/right docked panel
const DOCKED_WIDTH: i32 = 300;
/// Height of a top/bottom docked panel
const DOCKED_HEIGHT: i32 = 200;
const FLOATING_WIDTH: i32 = 400;
const FLOATING_HEIGHT: i32 = 300;

#[derive(Debug)]
struct HeadlessPanel {
    name: String,
    frame: PanelFrame,
    content_attached: bool,
}

pub struct HeadlessPanelHost {
    screen: Rect,
    runtime: Handle,
    panels: HashMap<PanelId, HeadlessPanel>,
}

impl HeadlessPanelHost {
    pub fn new(display: &DisplayConfig, runtime: Handle) -> Self {
        Self {
            screen: Rect::new(
                display.x,
                display.y,
                display.width as i32,
                display.height as i32,
            ),
            runtime,
            panels: HashMap::new(),
        }
    }

    fn initial_frame(&self, spec: &PanelSpec) -> PanelFrame {
        let screen = self.screen;
        match spec.placement {
            Placement::Docked(area) => {
                let rect = match area {
                    DockArea::Left => Rect::new(screen.x, screen.y, DOCKED_WIDTH, screen.height),
                    DockArea::Right => Rect::new(
                        screen.right() + 1 - DOCKED_WIDTH,
                        screen.y,
                        DOCKED_WIDTH,
                        screen.height,
                    ),
                    DockArea::Top => Rect::new(screen.x, screen.y, screen.width, DOCKED_HEIGHT),
                    DockArea::Bottom => Rect::new(
                        screen.x,
                        screen.bottom() + 1 - DOCKED_HEIGHT,
                        screen.width,
                        DOCKED_HEIGHT,
                    ),
                };
                PanelFrame {
                    rect,
                    floating: false,
                }
            }
            Placement::Floating { x, y, .. } => PanelFrame {
                rect: Rect::new(x, y, FLOATING_WIDTH, FLOATING_HEIGHT),
                floating: true,
            },
        }
    }

    fn panel_mut(&mut self, id: PanelId) -> Result<&mut HeadlessPanel, HostError> {
        self.panels.get_mut(&id).ok_or(HostError::UnknownPanel(id))
    }
}

impl PanelHost for HeadlessPanelHost {
    fn primary_screen(&self) -> Rect {
        self.screen
    }

    fn mount(&mut self, spec: &PanelSpec) -> Result<MountedPanel, HostError> {
        let frame = self.initial_frame(spec);
        tracing::info!(
            "Mounting panel '{}' ({}) at {:?}",
            spec.name,
            spec.route_path,
            frame.rect
        );
        tracing::debug!("Panel '{}' <- {}", spec.name, scripts::dock_route_name(&spec.name));

        let (events, receiver) = mpsc::unbounded_channel();
        self.runtime
            .spawn(render_panel_events(spec.name.clone(), receiver));

        self.panels.insert(
            spec.id,
            HeadlessPanel {
                name: spec.name.clone(),
                frame,
                content_attached: true,
            },
        );
        Ok(MountedPanel {
            events: Some(events),
        })
    }

    fn detach_content(&mut self, id: PanelId) -> Result<(), HostError> {
        let panel = self.panel_mut(id)?;
        if !panel.content_attached {
            return Err(HostError::Other(format!(
                "content of '{}' is already detached",
                panel.name
            )));
        }
        panel.content_attached = false;
        tracing::debug!("Panel '{}' content detached", panel.name);
        Ok(())
    }

    fn dispose_panel(&mut self, id: PanelId) -> Result<(), HostError> {
        let panel = self.panels.remove(&id).ok_or(HostError::UnknownPanel(id))?;
        tracing::info!("Panel '{}' disposed", panel.name);
        Ok(())
    }

    fn frame(&self, id: PanelId) -> Option<PanelFrame> {
        self.panels.get(&id).map(|panel| panel.frame)
    }

    fn move_panel(&mut self, id: PanelId, x: i32, y: i32) -> Result<(), HostError> {
        let panel = self.panel_mut(id)?;
        panel.frame.rect.x = x;
        panel.frame.rect.y = y;
        tracing::debug!("Panel '{}' moved to ({}, {})", panel.name, x, y);
        Ok(())
    }

    fn resize_panel(&mut self, id: PanelId, width: i32, height: i32) -> Result<(), HostError> {
        let panel = self.panel_mut(id)?;
        let (clamped_width, clamped_height) = (width.max(1), height.max(1));
        if (clamped_width, clamped_height) != (width, height) {
            tracing::debug!(
                "Panel '{}' resize {}x{} clamped to {}x{}",
                panel.name,
                width,
                height,
                clamped_width,
                clamped_height
            );
        }
        panel.frame.rect.width = clamped_width;
        panel.frame.rect.height = clamped_height;
        tracing::debug!("Panel '{}' resized to {}x{}", panel.name, clamped_width, clamped_height);
        Ok(())
    }

    fn set_floating(&mut self, id: PanelId, floating: bool) -> Result<(), HostError> {
        let panel = self.panel_mut(id)?;
        panel.frame.floating = floating;
        tracing::debug!("Panel '{}' floating={} and raised", panel.name, floating);
        Ok(())
    }
}

/// Script a web panel would evaluate for an event, if any
fn panel_script(event: &BridgeEvent) -> Option<String> {
    match event {
        BridgeEvent::AiResponse(response) => Some(scripts::receive_ai_message(&response.to_json())),
        BridgeEvent::Dock(dock) => Some(format!(
            "window.dispatchEvent(new CustomEvent({:?}, {{ detail: {} }}));",
            dock.event_type(),
            dock.event_data()
        )),
        _ => None,
    }
}

async fn render_panel_events(name: String, mut events: EventReceiver) {
    while let Some(event) = events.recv().await {
        if let Some(script) = panel_script(&event) {
            tracing::debug!("Panel '{}' <- {}", name, script);
        }
    }
    tracing::debug!("Panel '{}' event channel closed", name);
}

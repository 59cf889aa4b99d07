//! Panel creation and the deferred three-phase teardown
//!
//! Teardown runs as a small state machine. Each phase is applied on the
//! coordinating loop when its [`TeardownTick`] arrives, and only then is the
//! tick for the next phase scheduled on the runtime:
//!
//! 1. after a zero-delay yield: detach the web content and its bus surface
//! 2. after the phase delay: dispose the panel and forget its name
//! 3. after the phase delay: log that the teardown finished
//!
//! Host failures in any phase are logged; later phases still run.

use std::time::Duration;

use dockyard_config::DuplicatePanelPolicy;
use dockyard_ipc::AddDockWidget;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use super::dock_events::{PanelAction, PanelDockEvent};
use super::host::{HostError, PanelHost, PanelId, PanelSpec, Placement};
use super::placement;
use super::registry::{PanelEntry, PanelRegistry, PanelState, TeardownPhase};
use crate::bus::{EventBus, SurfaceKind};
use crate::error::BridgeError;

/// Request to run one teardown phase of one panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownTick {
    pub panel: PanelId,
    pub name: String,
    pub phase: TeardownPhase,
}

/// What a create request turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(PanelId),
    /// The existing panel is being torn down; nothing new is created
    ToggledOff,
    /// The request will be created once the existing panel is disposed
    ReplacementQueued,
    /// The name is already tearing down
    Dropped,
}

pub struct PanelLifecycleController {
    registry: PanelRegistry,
    policy: DuplicatePanelPolicy,
    phase_delay: Duration,
    runtime: Handle,
    ticks: mpsc::UnboundedSender<TeardownTick>,
    next_id: u64,
}

impl PanelLifecycleController {
    pub fn new(
        policy: DuplicatePanelPolicy,
        phase_delay: Duration,
        runtime: Handle,
        ticks: mpsc::UnboundedSender<TeardownTick>,
    ) -> Self {
        Self {
            registry: PanelRegistry::default(),
            policy,
            phase_delay,
            runtime,
            ticks,
            next_id: 1,
        }
    }

    pub fn registry(&self) -> &PanelRegistry {
        &self.registry
    }

    pub fn create(
        &mut self,
        host: &mut dyn PanelHost,
        bus: &mut EventBus,
        request: AddDockWidget,
    ) -> Result<CreateOutcome, BridgeError> {
        if request.routename.trim().is_empty() {
            return Err(BridgeError::InvalidPanelRequest(
                "routename must not be empty".into(),
            ));
        }
        if request.routepath.trim().is_empty() {
            return Err(BridgeError::InvalidPanelRequest(format!(
                "routepath for '{}' must not be empty",
                request.routename
            )));
        }

        let name = request.routename.clone();
        let Some(state) = self.registry.get(&name).map(|entry| entry.state) else {
            return self.mount(host, bus, request);
        };

        match (self.policy, state) {
            (DuplicatePanelPolicy::Toggle, PanelState::TearingDown(_)) => {
                tracing::debug!("Panel '{}' is already closing; dropping create", name);
                Ok(CreateOutcome::Dropped)
            }
            (DuplicatePanelPolicy::Toggle, _) => {
                tracing::info!("Panel '{}' exists; closing it", name);
                self.begin_teardown(&name)?;
                Ok(CreateOutcome::ToggledOff)
            }
            (DuplicatePanelPolicy::Replace, state) => {
                if let Some(entry) = self.registry.get_mut(&name) {
                    entry.replacement = Some(request);
                }
                if !matches!(state, PanelState::TearingDown(_)) {
                    self.begin_teardown(&name)?;
                }
                tracing::info!("Panel '{}' will be replaced", name);
                Ok(CreateOutcome::ReplacementQueued)
            }
        }
    }

    fn mount(
        &mut self,
        host: &mut dyn PanelHost,
        bus: &mut EventBus,
        request: AddDockWidget,
    ) -> Result<CreateOutcome, BridgeError> {
        let id = PanelId(self.next_id);
        self.next_id += 1;

        let name = request.routename.clone();
        let placement = placement::resolve(request.placement(), host.primary_screen());
        let spec = PanelSpec {
            id,
            name: name.clone(),
            route_path: request.routepath.clone(),
            placement,
            size: request.size,
        };

        self.registry.insert(
            name.clone(),
            PanelEntry {
                id,
                route_path: request.routepath,
                placement,
                state: PanelState::Mounting,
                surface: None,
                replacement: None,
            },
        );

        let mounted = match host.mount(&spec) {
            Ok(mounted) => mounted,
            Err(e) => {
                self.registry.remove(&name);
                return Err(e.into());
            }
        };

        if let (Placement::Floating { .. }, Some(size)) = (placement, request.size) {
            if let Err(e) = host.resize_panel(id, size.width, size.height) {
                tracing::warn!("Failed to size floating panel '{}': {}", name, e);
            }
        }

        let surface = mounted
            .events
            .map(|events| bus.attach(SurfaceKind::Panel(name.clone()), events));
        if let Some(entry) = self.registry.get_mut(&name) {
            entry.state = PanelState::Live;
            entry.surface = surface;
        }

        tracing::info!("Panel '{}' mounted at {:?}", name, placement);
        Ok(CreateOutcome::Created(id))
    }

    /// Start tearing a panel down. Returns `false` if it is already closing.
    pub fn begin_teardown(&mut self, name: &str) -> Result<bool, BridgeError> {
        let entry = self
            .registry
            .get_mut(name)
            .ok_or_else(|| BridgeError::PanelNotFound(name.to_string()))?;
        if entry.is_tearing_down() {
            tracing::debug!("Panel '{}' is already closing", name);
            return Ok(false);
        }

        entry.state = PanelState::TearingDown(TeardownPhase::DetachContent);
        let tick = TeardownTick {
            panel: entry.id,
            name: name.to_string(),
            phase: TeardownPhase::DetachContent,
        };
        tracing::debug!("Panel '{}' teardown scheduled", name);
        self.schedule(tick, Duration::ZERO);
        Ok(true)
    }

    /// Apply the phase a tick names, then schedule the next one.
    ///
    /// Ticks for panels that no longer exist, or that do not match the
    /// panel's current phase, are ignored.
    pub fn advance(&mut self, host: &mut dyn PanelHost, bus: &mut EventBus, tick: TeardownTick) {
        let current = self.registry.get(&tick.name).map(|e| (e.id, e.state));
        let expected = Some((tick.panel, PanelState::TearingDown(tick.phase)));
        if tick.phase != TeardownPhase::Confirm && current != expected {
            tracing::debug!("Ignoring stale teardown tick {:?}", tick);
            return;
        }

        match tick.phase {
            TeardownPhase::DetachContent => {
                if let Some(entry) = self.registry.get_mut(&tick.name) {
                    if let Some(surface) = entry.surface.take() {
                        bus.detach(surface);
                    }
                    entry.state = PanelState::TearingDown(TeardownPhase::DisposePanel);
                }
                if let Err(e) = host.detach_content(tick.panel) {
                    tracing::warn!("Panel '{}' teardown phase 1 failed: {}", tick.name, e);
                }
                tracing::debug!("Panel '{}' content detached", tick.name);
                let delay = self.phase_delay;
                self.schedule(
                    TeardownTick {
                        phase: TeardownPhase::DisposePanel,
                        ..tick
                    },
                    delay,
                );
            }
            TeardownPhase::DisposePanel => {
                if let Err(e) = host.dispose_panel(tick.panel) {
                    tracing::warn!("Panel '{}' teardown phase 2 failed: {}", tick.name, e);
                }
                let replacement = self
                    .registry
                    .remove(&tick.name)
                    .and_then(|entry| entry.replacement);
                tracing::debug!("Panel '{}' disposed", tick.name);
                let delay = self.phase_delay;
                self.schedule(
                    TeardownTick {
                        phase: TeardownPhase::Confirm,
                        ..tick
                    },
                    delay,
                );

                if let Some(request) = replacement {
                    if let Err(e) = self.mount(host, bus, request) {
                        tracing::error!("Failed to create replacement panel: {}", e);
                    }
                }
            }
            TeardownPhase::Confirm => {
                tracing::info!("Panel '{}' teardown complete", tick.name);
            }
        }
    }

    /// Apply a forwarded drag/close/float/resize event to matching panels.
    pub fn apply_dock_event(&mut self, host: &mut dyn PanelHost, event_type: &str, event_data: &str) {
        let Some(event) = PanelDockEvent::parse(event_type, event_data) else {
            return;
        };

        for name in self.registry.live_names() {
            if !event.applies_to(&name) {
                continue;
            }
            let Some(id) = self.registry.get(&name).map(|entry| entry.id) else {
                continue;
            };
            if let Err(e) = self.apply_action(host, &name, id, &event.action) {
                tracing::warn!("Panel '{}' failed to handle {}: {}", name, event_type, e);
            }
        }
    }

    fn apply_action(
        &mut self,
        host: &mut dyn PanelHost,
        name: &str,
        id: PanelId,
        action: &PanelAction,
    ) -> Result<(), BridgeError> {
        match action {
            PanelAction::Drag { dx, dy } => match host.frame(id) {
                Some(frame) if frame.floating => {
                    host.move_panel(
                        id,
                        frame.rect.x.saturating_add(*dx),
                        frame.rect.y.saturating_add(*dy),
                    )?;
                }
                _ => {}
            },
            PanelAction::Close => {
                self.begin_teardown(name)?;
            }
            PanelAction::Float(floating) => host.set_floating(id, *floating)?,
            PanelAction::Resize {
                x,
                y,
                width,
                height,
            } => {
                let rect = host
                    .frame(id)
                    .ok_or(HostError::UnknownPanel(id))?
                    .rect;
                host.move_panel(id, x.unwrap_or(rect.x), y.unwrap_or(rect.y))?;
                let width = panel_extent(name, "width", width.unwrap_or(rect.width));
                let height = panel_extent(name, "height", height.unwrap_or(rect.height));
                host.resize_panel(id, width, height)?;
            }
        }
        Ok(())
    }

    fn schedule(&self, tick: TeardownTick, delay: Duration) {
        let ticks = self.ticks.clone();
        self.runtime.spawn(async move {
            if delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(delay).await;
            }
            if ticks.send(tick).is_err() {
                tracing::debug!("Teardown tick dropped; bridge has stopped");
            }
        });
    }
}

/// Panels are at least one pixel in each direction.
fn panel_extent(name: &str, axis: &str, requested: i32) -> i32 {
    if requested < 1 {
        tracing::debug!("Panel '{}' {} {} clamped to 1", name, axis, requested);
        1
    } else {
        requested
    }
}

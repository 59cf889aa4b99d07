//! Event bus between the bridge and attached UI surfaces
//!
//! Each surface attaches with its own channel and a kind that decides which
//! events it receives. Surfaces whose receiver has gone away are pruned on
//! the next publish.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dockyard_ipc::BridgeEvent;
use tokio::sync::mpsc;

pub type EventSender = mpsc::UnboundedSender<BridgeEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<BridgeEvent>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

/// Shared allocator so handles on other threads can name a surface before
/// the bridge has seen its attach message.
#[derive(Debug, Clone, Default)]
pub struct SurfaceIds(Arc<AtomicU64>);

impl SurfaceIds {
    pub fn next(&self) -> SurfaceId {
        SurfaceId(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

/// What a surface is, and therefore what it listens to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceKind {
    /// The main overlay: `command_to_main` and `key_event`
    Main,
    /// A panel's web content: `dock_event` and `ai_response`
    Panel(String),
    /// Diagnostics sink that sees everything
    Observer,
}

impl SurfaceKind {
    pub fn accepts(&self, event: &BridgeEvent) -> bool {
        match self {
            Self::Main => matches!(
                event,
                BridgeEvent::CommandToMain { .. } | BridgeEvent::KeyEvent { .. }
            ),
            Self::Panel(_) => matches!(event, BridgeEvent::Dock(_) | BridgeEvent::AiResponse(_)),
            Self::Observer => true,
        }
    }
}

struct Subscriber {
    kind: SurfaceKind,
    events: EventSender,
}

pub struct EventBus {
    ids: SurfaceIds,
    subscribers: BTreeMap<SurfaceId, Subscriber>,
}

impl EventBus {
    pub fn new(ids: SurfaceIds) -> Self {
        Self {
            ids,
            subscribers: BTreeMap::new(),
        }
    }

    /// Attach a surface under a freshly allocated id
    pub fn attach(&mut self, kind: SurfaceKind, events: EventSender) -> SurfaceId {
        let id = self.ids.next();
        self.attach_as(id, kind, events);
        id
    }

    /// Attach a surface under an id allocated elsewhere
    pub fn attach_as(&mut self, id: SurfaceId, kind: SurfaceKind, events: EventSender) {
        tracing::debug!("Surface {:?} attached as {:?}", id, kind);
        self.subscribers.insert(id, Subscriber { kind, events });
    }

    pub fn detach(&mut self, id: SurfaceId) -> bool {
        let removed = self.subscribers.remove(&id).is_some();
        if removed {
            tracing::debug!("Surface {:?} detached", id);
        }
        removed
    }

    /// Deliver an event to every interested surface. Returns how many
    /// surfaces received it.
    pub fn publish(&mut self, event: BridgeEvent) -> usize {
        let delivered = self.deliver(&event, |kind| kind.accepts(&event));
        if delivered == 0 {
            tracing::trace!("No surface took {} event", event.channel());
        }
        delivered
    }

    /// Deliver an event to the panel surfaces named `name`. Observers get a
    /// copy only when some panel took it; only panel deliveries are counted.
    pub fn publish_to_panel(&mut self, name: &str, event: BridgeEvent) -> usize {
        let panels = self.deliver(&event, |kind| match kind {
            SurfaceKind::Panel(panel) => panel == name,
            _ => false,
        });
        if panels > 0 {
            self.deliver(&event, |kind| *kind == SurfaceKind::Observer);
        }
        panels
    }

    fn deliver(&mut self, event: &BridgeEvent, wants: impl Fn(&SurfaceKind) -> bool) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();

        for (id, subscriber) in &self.subscribers {
            if !wants(&subscriber.kind) {
                continue;
            }
            if subscriber.events.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                closed.push(*id);
            }
        }

        for id in closed {
            tracing::debug!("Pruning closed surface {:?}", id);
            self.subscribers.remove(&id);
        }
        delivered
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

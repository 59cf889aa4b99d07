//! Name-keyed panel bookkeeping

use std::collections::HashMap;

use dockyard_ipc::AddDockWidget;

use super::host::{PanelId, Placement};
use crate::bus::SurfaceId;

/// Next step of a panel's deferred teardown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeardownPhase {
    /// Phase 1: detach web content and its command channel
    DetachContent,
    /// Phase 2: dispose the panel and forget its name
    DisposePanel,
    /// Phase 3: confirmation only
    Confirm,
}

impl TeardownPhase {
    pub fn number(self) -> u8 {
        match self {
            Self::DetachContent => 1,
            Self::DisposePanel => 2,
            Self::Confirm => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Mounting,
    Live,
    /// Waiting for the given phase to run
    TearingDown(TeardownPhase),
}

#[derive(Debug)]
pub struct PanelEntry {
    pub id: PanelId,
    pub route_path: String,
    pub placement: Placement,
    pub state: PanelState,
    /// Bus subscription of the panel's web content
    pub surface: Option<SurfaceId>,
    /// Request to create once this panel has been disposed
    pub replacement: Option<AddDockWidget>,
}

impl PanelEntry {
    pub fn is_live(&self) -> bool {
        self.state == PanelState::Live
    }

    pub fn is_tearing_down(&self) -> bool {
        matches!(self.state, PanelState::TearingDown(_))
    }
}

#[derive(Debug, Default)]
pub struct PanelRegistry {
    panels: HashMap<String, PanelEntry>,
}

impl PanelRegistry {
    pub fn get(&self, name: &str) -> Option<&PanelEntry> {
        self.panels.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PanelEntry> {
        self.panels.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.panels.contains_key(name)
    }

    pub fn insert(&mut self, name: String, entry: PanelEntry) {
        self.panels.insert(name, entry);
    }

    pub fn remove(&mut self, name: &str) -> Option<PanelEntry> {
        self.panels.remove(name)
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Names of live panels, sorted
    pub fn live_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .panels
            .iter()
            .filter(|(_, entry)| entry.is_live())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}

//! Panel (dock) command payloads and placement names.

use serde::{Deserialize, Serialize};

use crate::lenient;

/// Requested panel size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSize {
    pub width: i32,
    pub height: i32,
}

/// Payload of `add_dock_widget`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddDockWidget {
    pub routename: String,
    pub routepath: String,
    #[serde(default = "default_position")]
    pub position: String,
    #[serde(default = "default_float_position")]
    pub floatposition: String,
    /// Object or JSON text; anything unparseable is treated as absent
    #[serde(default, deserialize_with = "lenient::object_or_json_text")]
    pub size: Option<PanelSize>,
}

fn default_position() -> String {
    "left".to_string()
}

fn default_float_position() -> String {
    "None".to_string()
}

impl AddDockWidget {
    /// Resolve the free-form position strings into a placement request.
    pub fn placement(&self) -> PlacementRequest {
        PlacementRequest::parse(&self.position, &self.floatposition)
    }
}

/// Payload of `remove_dock_widget`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoveDockWidget {
    pub routename: String,
}

/// Edge of the main window a docked panel attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockArea {
    #[default]
    Left,
    Right,
    Top,
    Bottom,
}

/// Screen-relative anchor of a floating panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatAnchor {
    #[default]
    TopLeft,
    BottomLeft,
    TopRight,
    BottomRight,
    Center,
}

/// Where a new panel should go, before screen geometry is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementRequest {
    Docked(DockArea),
    Floating(FloatAnchor),
}

impl PlacementRequest {
    /// Parse `position` / `floatposition` the way the UI sends them.
    ///
    /// Matching is case-insensitive. `"float"` selects a floating panel whose
    /// anchor comes from `float_position` (unknown anchors fall back to top
    /// left); any other unknown position docks on the left.
    pub fn parse(position: &str, float_position: &str) -> Self {
        let position = position.trim().to_ascii_lowercase();
        if position == "float" {
            let anchor = match float_position.trim().to_ascii_lowercase().as_str() {
                "bottom_left" => FloatAnchor::BottomLeft,
                "top_right" => FloatAnchor::TopRight,
                "bottom_right" => FloatAnchor::BottomRight,
                "center" => FloatAnchor::Center,
                _ => FloatAnchor::TopLeft,
            };
            return Self::Floating(anchor);
        }

        let area = match position.as_str() {
            "right" => DockArea::Right,
            "top" => DockArea::Top,
            "bottom" => DockArea::Bottom,
            _ => DockArea::Left,
        };
        Self::Docked(area)
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, Self::Floating(_))
    }
}

//! Resolving requested placements against screen geometry

use dockyard_ipc::{FloatAnchor, PlacementRequest};

use super::host::{Placement, Rect};

/// Vertical offset of the bottom anchors
pub const BOTTOM_ANCHOR_OFFSET: i32 = 200;

/// Horizontal offset of the right anchors
pub const RIGHT_ANCHOR_OFFSET: i32 = 150;

/// Top-left corner of a floating panel for an anchor on `screen`.
pub fn anchor_origin(anchor: FloatAnchor, screen: Rect) -> (i32, i32) {
    match anchor {
        FloatAnchor::TopLeft => (screen.x, screen.y),
        FloatAnchor::BottomLeft => (screen.x, screen.bottom() - BOTTOM_ANCHOR_OFFSET),
        FloatAnchor::TopRight => (screen.right() - RIGHT_ANCHOR_OFFSET, screen.y),
        FloatAnchor::BottomRight => (
            screen.right() - RIGHT_ANCHOR_OFFSET,
            screen.bottom() - BOTTOM_ANCHOR_OFFSET,
        ),
        FloatAnchor::Center => screen.center(),
    }
}

pub fn resolve(request: PlacementRequest, screen: Rect) -> Placement {
    match request {
        PlacementRequest::Docked(area) => Placement::Docked(area),
        PlacementRequest::Floating(anchor) => {
            let (x, y) = anchor_origin(anchor, screen);
            Placement::Floating { anchor, x, y }
        }
    }
}

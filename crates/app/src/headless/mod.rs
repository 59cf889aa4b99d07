//! Stand-ins for the 3D engine and the native panel layer

mod engine;
mod host;

pub use engine::HeadlessEngine;
pub use host::HeadlessPanelHost;

//! Command bridge and panel lifecycle coordination for Dockyard
//!
//! [`CommandBridge`] receives named JSON commands from UI surfaces, drives the
//! scene engine through [`SceneActorRegistry`], runs slow assistant queries on
//! a [`WorkerDispatcher`], and creates and tears down panels through a
//! [`PanelLifecycleController`]. Results flow back to surfaces over an
//! [`EventBus`].

mod bridge;
pub mod bus;
pub mod engine;
mod error;
pub mod panel;
pub mod scene;
pub mod services;
pub mod worker;

#[cfg(test)]
mod testing;

pub use bridge::{BridgeHandle, BridgeMessage, BridgeServices, CommandBridge, Inbound, Surface};
pub use bus::{EventBus, EventReceiver, EventSender, SurfaceId, SurfaceKind};
pub use engine::{ActorHandle, CameraParams, EngineError, SceneEngine, SceneHandle};
pub use error::{BridgeError, error_chain};
pub use panel::{PanelHost, PanelLifecycleController};
pub use scene::{MAIN_SCENE, SceneActorRegistry};
pub use services::{FileDialogs, OpenedFile, ScriptSink, ServiceError};
pub use worker::{TaskId, WorkerCompletion, WorkerDispatcher, WorkerError};

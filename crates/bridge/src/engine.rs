//! Scene engine abstraction
//!
//! The 3D engine is an external collaborator. The bridge only sees opaque
//! handles and the handful of primitives it needs to drive scenes.

use dockyard_ipc::TransformKind;

/// Opaque engine-side scene handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneHandle(pub u64);

/// Opaque engine-side actor handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorHandle(pub u64);

/// Camera placement applied to a scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraParams {
    pub position: [f32; 3],
    pub forward: [f32; 3],
    pub up: [f32; 3],
    pub fov: f32,
}

impl From<&dockyard_ipc::CameraMove> for CameraParams {
    fn from(camera: &dockyard_ipc::CameraMove) -> Self {
        Self {
            position: camera.position,
            forward: camera.forward,
            up: camera.up,
            fov: camera.fov,
        }
    }
}

/// Errors reported by the engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine could not load an actor from the given file
    #[error("Failed to load actor from {path}: {reason}")]
    ActorLoad { path: String, reason: String },

    /// The engine could not create a scene
    #[error("Failed to create scene: {0}")]
    SceneCreate(String),

    /// Any other engine primitive failed
    #[error("Engine call failed: {0}")]
    Call(String),
}

/// Primitives the bridge drives on the 3D engine.
///
/// Called only from the coordinating loop, so implementations need not be
/// thread-safe.
pub trait SceneEngine {
    /// Create an empty engine scene
    fn create_scene(&mut self) -> Result<SceneHandle, EngineError>;

    /// Load an actor from a model file
    fn load_actor(&mut self, path: &str) -> Result<ActorHandle, EngineError>;

    /// Apply one transform primitive to an actor
    fn transform(
        &mut self,
        actor: ActorHandle,
        kind: TransformKind,
        vector: [f32; 3],
    ) -> Result<(), EngineError>;

    fn set_camera(&mut self, scene: SceneHandle, camera: &CameraParams) -> Result<(), EngineError>;

    fn set_sun_direction(
        &mut self,
        scene: SceneHandle,
        direction: [f32; 3],
    ) -> Result<(), EngineError>;

    /// Release an actor that is no longer referenced by any scene
    fn release_actor(&mut self, _actor: ActorHandle) {}
}

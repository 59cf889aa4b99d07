//! Engine that tracks handles and logs what a renderer would do

use std::collections::HashMap;

use dockyard_bridge::{ActorHandle, CameraParams, EngineError, SceneEngine, SceneHandle};
use dockyard_ipc::TransformKind;

#[derive(Debug, Default)]
pub struct HeadlessEngine {
    next_handle: u64,
    scenes: Vec<SceneHandle>,
    actors: HashMap<ActorHandle, String>,
}

impl HeadlessEngine {
    fn allocate(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    pub fn live_actors(&self) -> usize {
        self.actors.len()
    }

    fn check_scene(&self, scene: SceneHandle) -> Result<(), EngineError> {
        if self.scenes.contains(&scene) {
            Ok(())
        } else {
            Err(EngineError::Call(format!("unknown scene {scene:?}")))
        }
    }
}

impl SceneEngine for HeadlessEngine {
    fn create_scene(&mut self) -> Result<SceneHandle, EngineError> {
        let handle = SceneHandle(self.allocate());
        self.scenes.push(handle);
        tracing::debug!("Engine created scene {:?}", handle);
        Ok(handle)
    }

    fn load_actor(&mut self, path: &str) -> Result<ActorHandle, EngineError> {
        if path.trim().is_empty() {
            return Err(EngineError::ActorLoad {
                path: path.to_string(),
                reason: "empty path".to_string(),
            });
        }
        let handle = ActorHandle(self.allocate());
        self.actors.insert(handle, path.to_string());
        tracing::info!("Engine loaded {} as {:?}", path, handle);
        Ok(handle)
    }

    fn transform(
        &mut self,
        actor: ActorHandle,
        kind: TransformKind,
        vector: [f32; 3],
    ) -> Result<(), EngineError> {
        let path = self
            .actors
            .get(&actor)
            .ok_or_else(|| EngineError::Call(format!("unknown actor {actor:?}")))?;
        tracing::info!("Engine {:?} {} by {:?}", kind, path, vector);
        Ok(())
    }

    fn set_camera(&mut self, scene: SceneHandle, camera: &CameraParams) -> Result<(), EngineError> {
        self.check_scene(scene)?;
        tracing::info!(
            "Engine camera for {:?}: position {:?}, forward {:?}, up {:?}, fov {}",
            scene,
            camera.position,
            camera.forward,
            camera.up,
            camera.fov
        );
        Ok(())
    }

    fn set_sun_direction(
        &mut self,
        scene: SceneHandle,
        direction: [f32; 3],
    ) -> Result<(), EngineError> {
        self.check_scene(scene)?;
        tracing::info!("Engine sun direction for {:?}: {:?}", scene, direction);
        Ok(())
    }

    fn release_actor(&mut self, actor: ActorHandle) {
        if let Some(path) = self.actors.remove(&actor) {
            tracing::debug!("Engine released {} ({} actors live)", path, self.live_actors());
        }
    }
}

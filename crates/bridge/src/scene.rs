//! Named scenes and the actors loaded into them

use std::collections::HashMap;

use dockyard_ipc::{ActorSummary, SceneDocument, TransformKind};

use crate::engine::{ActorHandle, CameraParams, SceneEngine, SceneHandle};
use crate::error::BridgeError;

/// Scene the viewport renders into; `remove_actor` resets it.
pub const MAIN_SCENE: &str = "mainscene";

#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub handle: ActorHandle,
    pub path: String,
}

#[derive(Debug, Default)]
pub struct Scene {
    handle: Option<SceneHandle>,
    actors: HashMap<String, Actor>,
}

impl Scene {
    pub fn handle(&self) -> Option<SceneHandle> {
        self.handle
    }

    pub fn actor(&self, name: &str) -> Option<&Actor> {
        self.actors.get(name)
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }
}

/// Actor key for a model path: its file base name.
pub fn actor_key(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Registry of scenes, owned by the coordinating loop.
pub struct SceneActorRegistry {
    engine: Box<dyn SceneEngine>,
    scenes: HashMap<String, Scene>,
}

impl SceneActorRegistry {
    pub fn new(engine: Box<dyn SceneEngine>) -> Self {
        Self {
            engine,
            scenes: HashMap::new(),
        }
    }

    pub fn scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.get(name)
    }

    /// Actor names in a scene, sorted; `None` if the scene does not exist.
    pub fn actor_names(&self, scene: &str) -> Option<Vec<String>> {
        let scene = self.scenes.get(scene)?;
        let mut names: Vec<String> = scene.actors.keys().cloned().collect();
        names.sort();
        Some(names)
    }

    /// Adopt a scene the engine already created, e.g. the viewport's main
    /// scene. Replaces any entry of the same name.
    pub fn register_scene(&mut self, name: impl Into<String>, handle: SceneHandle) {
        let name = name.into();
        let previous = self.scenes.insert(
            name.clone(),
            Scene {
                handle: Some(handle),
                actors: HashMap::new(),
            },
        );
        if let Some(previous) = previous {
            self.release_all(previous.actors);
        }
        tracing::debug!("Registered scene '{}' ({:?})", name, handle);
    }

    /// Create a scene. Returns `false` if the name is already taken.
    pub fn create_scene(&mut self, name: &str) -> Result<bool, BridgeError> {
        if self.scenes.contains_key(name) {
            tracing::info!("Scene '{}' already exists", name);
            return Ok(false);
        }
        let handle = self.engine.create_scene()?;
        self.scenes.insert(
            name.to_string(),
            Scene {
                handle: Some(handle),
                actors: HashMap::new(),
            },
        );
        tracing::info!("Created scene '{}'", name);
        Ok(true)
    }

    /// Reset a scene to no engine handle and no actors, creating the entry
    /// if needed.
    pub fn reset_scene(&mut self, name: &str) {
        let previous = self.scenes.insert(name.to_string(), Scene::default());
        if let Some(previous) = previous {
            self.release_all(previous.actors);
        }
        tracing::info!("Reset scene '{}'", name);
    }

    /// Load a model into a scene, keyed by its file base name.
    ///
    /// An actor already registered under that name is replaced.
    pub fn create_actor(&mut self, scene: &str, path: &str) -> Result<ActorSummary, BridgeError> {
        if !self.scenes.contains_key(scene) {
            return Err(BridgeError::SceneNotFound(scene.to_string()));
        }
        let handle = self.engine.load_actor(path)?;
        let name = actor_key(path).to_string();
        let replaced = self
            .scenes
            .get_mut(scene)
            .and_then(|entry| {
                entry.actors.insert(
                    name.clone(),
                    Actor {
                        handle,
                        path: path.to_string(),
                    },
                )
            });
        if let Some(replaced) = replaced {
            self.engine.release_actor(replaced.handle);
        }
        tracing::info!("Created actor '{}' in scene '{}'", name, scene);
        Ok(ActorSummary {
            name,
            path: path.to_string(),
        })
    }

    /// Remove an actor. Missing scenes or actors leave the registry untouched.
    pub fn delete_actor(&mut self, scene: &str, actor: &str) -> Result<(), BridgeError> {
        let entry = self
            .scenes
            .get_mut(scene)
            .ok_or_else(|| BridgeError::SceneNotFound(scene.to_string()))?;
        let removed = entry
            .actors
            .remove(actor)
            .ok_or_else(|| BridgeError::ActorNotFound {
                scene: scene.to_string(),
                actor: actor.to_string(),
            })?;
        self.engine.release_actor(removed.handle);
        tracing::info!("Deleted actor '{}' from scene '{}'", actor, scene);
        Ok(())
    }

    pub fn transform(
        &mut self,
        scene: &str,
        actor: &str,
        kind: TransformKind,
        vector: [f32; 3],
    ) -> Result<(), BridgeError> {
        let handle = self.actor_handle(scene, actor)?;
        self.engine.transform(handle, kind, vector)?;
        Ok(())
    }

    pub fn set_camera(&mut self, scene: &str, camera: &CameraParams) -> Result<(), BridgeError> {
        let handle = self.scene_handle(scene)?;
        self.engine.set_camera(handle, camera)?;
        Ok(())
    }

    pub fn set_sun_direction(&mut self, scene: &str, direction: [f32; 3]) -> Result<(), BridgeError> {
        let handle = self.scene_handle(scene)?;
        self.engine.set_sun_direction(handle, direction)?;
        Ok(())
    }

    /// Replace a scene's actors with those listed in a saved document.
    ///
    /// Entries without a path are skipped. If any actor fails to load the
    /// scene keeps its previous actors.
    pub fn load_document(
        &mut self,
        scene: &str,
        document: &SceneDocument,
    ) -> Result<Vec<ActorSummary>, BridgeError> {
        if !self.scenes.contains_key(scene) {
            return Err(BridgeError::SceneNotFound(scene.to_string()));
        }

        let mut loaded: HashMap<String, Actor> = HashMap::new();
        let mut summaries = Vec::new();
        for path in document.actors.iter().filter_map(|a| a.path.as_deref()) {
            let handle = match self.engine.load_actor(path) {
                Ok(handle) => handle,
                Err(e) => {
                    self.release_all(loaded);
                    return Err(e.into());
                }
            };
            let name = actor_key(path).to_string();
            summaries.retain(|s: &ActorSummary| s.name != name);
            summaries.push(ActorSummary {
                name: name.clone(),
                path: path.to_string(),
            });
            if let Some(duplicate) = loaded.insert(
                name,
                Actor {
                    handle,
                    path: path.to_string(),
                },
            ) {
                self.engine.release_actor(duplicate.handle);
            }
        }

        let previous = match self.scenes.get_mut(scene) {
            Some(entry) => std::mem::replace(&mut entry.actors, loaded),
            None => HashMap::new(),
        };
        self.release_all(previous);
        tracing::info!("Loaded {} actors into scene '{}'", summaries.len(), scene);
        Ok(summaries)
    }

    fn scene_handle(&self, scene: &str) -> Result<SceneHandle, BridgeError> {
        self.scenes
            .get(scene)
            .ok_or_else(|| BridgeError::SceneNotFound(scene.to_string()))?
            .handle
            .ok_or_else(|| BridgeError::SceneDetached(scene.to_string()))
    }

    fn actor_handle(&self, scene: &str, actor: &str) -> Result<ActorHandle, BridgeError> {
        let entry = self
            .scenes
            .get(scene)
            .ok_or_else(|| BridgeError::SceneNotFound(scene.to_string()))?;
        entry
            .actors
            .get(actor)
            .map(|a| a.handle)
            .ok_or_else(|| BridgeError::ActorNotFound {
                scene: scene.to_string(),
                actor: actor.to_string(),
            })
    }

    fn release_all(&mut self, actors: HashMap<String, Actor>) {
        for actor in actors.into_values() {
            self.engine.release_actor(actor.handle);
        }
    }
}

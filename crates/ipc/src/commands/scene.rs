//! Scene and actor command payloads.

use serde::{Deserialize, Serialize};

use crate::lenient;

/// Payload of `create_actor`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActor {
    pub scene_name: String,
    pub path: String,
}

/// Payload of `create_scene`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScene {
    pub scene_name: String,
}

/// Payload of `actor_delete`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorDelete {
    pub scene_name: String,
    pub actor_name: String,
}

/// The three transform primitives an actor supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformKind {
    Move,
    Rotate,
    Scale,
}

impl TransformKind {
    /// Match the exact operation names the UI sends.
    pub fn from_operation(name: &str) -> Option<Self> {
        match name {
            "Move" => Some(Self::Move),
            "Rotate" => Some(Self::Rotate),
            "Scale" => Some(Self::Scale),
            _ => None,
        }
    }
}

/// Payload of `actor_operation`.
///
/// Coordinates that are missing or not numeric read as `0.0` individually.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorOperation {
    pub scene_name: String,
    pub actor_name: String,
    #[serde(rename = "Operation", default)]
    pub operation: String,
    #[serde(default, deserialize_with = "lenient::f32_or_zero")]
    pub x: f32,
    #[serde(default, deserialize_with = "lenient::f32_or_zero")]
    pub y: f32,
    #[serde(default, deserialize_with = "lenient::f32_or_zero")]
    pub z: f32,
}

impl ActorOperation {
    /// The requested transform, or `None` for an unrecognized operation.
    pub fn kind(&self) -> Option<TransformKind> {
        TransformKind::from_operation(&self.operation)
    }

    pub fn vector(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Payload of `camera_move`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraMove {
    #[serde(default = "default_scene")]
    pub scene_name: String,
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    #[serde(default = "default_camera_forward")]
    pub forward: [f32; 3],
    #[serde(default = "default_camera_up")]
    pub up: [f32; 3],
    #[serde(default = "default_fov")]
    pub fov: f32,
}

/// Payload of `sun_direction`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SunDirection {
    #[serde(default = "default_scene")]
    pub scene_name: String,
    /// `None` when the component was sent but is not a number
    #[serde(
        default = "default_sun_component",
        deserialize_with = "lenient::f32_or_none"
    )]
    pub px: Option<f32>,
    #[serde(
        default = "default_sun_component",
        deserialize_with = "lenient::f32_or_none"
    )]
    pub py: Option<f32>,
    #[serde(
        default = "default_sun_component",
        deserialize_with = "lenient::f32_or_none"
    )]
    pub pz: Option<f32>,
}

impl SunDirection {
    /// The direction vector, or the name of the first non-numeric component.
    pub fn direction(&self) -> Result<[f32; 3], &'static str> {
        let px = self.px.ok_or("px")?;
        let py = self.py.ok_or("py")?;
        let pz = self.pz.ok_or("pz")?;
        Ok([px, py, pz])
    }
}

/// What `open_file_dialog` should open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    #[default]
    Model,
    Scene,
}

/// Payload of `open_file_dialog`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenFileDialog {
    pub scene_name: String,
    #[serde(rename = "file_type", alias = "fileType", default)]
    pub file_type: FileKind,
}

/// One actor entry of a saved scene document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocumentActor {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The part of a saved scene document the bridge reads back.
///
/// Saved documents may carry arbitrary extra keys; they are ignored here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub actors: Vec<SceneDocumentActor>,
}

fn default_scene() -> String {
    "scene1".to_string()
}

fn default_camera_position() -> [f32; 3] {
    [0.0, 5.0, 10.0]
}

fn default_camera_forward() -> [f32; 3] {
    [0.0, 1.5, 0.0]
}

fn default_camera_up() -> [f32; 3] {
    [0.0, -1.0, 0.0]
}

fn default_fov() -> f32 {
    45.0
}

fn default_sun_component() -> Option<f32> {
    Some(1.0)
}

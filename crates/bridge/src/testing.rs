//! Recording doubles for the bridge's external collaborators

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::rc::Rc;

use dockyard_assistant::{AssistantBackend, AssistantError};
use dockyard_ipc::{AddDockWidget, TransformKind};
use tokio::sync::mpsc;

use crate::bus::{EventReceiver, EventSender};
use crate::engine::{ActorHandle, CameraParams, EngineError, SceneEngine, SceneHandle};
use crate::panel::{HostError, MountedPanel, PanelFrame, PanelHost, PanelId, PanelSpec, Placement, Rect};
use crate::services::{FileDialogs, OpenedFile, ScriptSink, ServiceError};

pub fn panel_request(name: &str, route: &str) -> AddDockWidget {
    AddDockWidget {
        routename: name.to_string(),
        routepath: route.to_string(),
        position: "left".to_string(),
        floatposition: "None".to_string(),
        size: None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    CreateScene(SceneHandle),
    LoadActor { path: String, handle: ActorHandle },
    Transform {
        actor: ActorHandle,
        kind: TransformKind,
        vector: [f32; 3],
    },
    SetCamera { scene: SceneHandle, camera: CameraParams },
    SetSun { scene: SceneHandle, direction: [f32; 3] },
    Release(ActorHandle),
}

#[derive(Default)]
struct EngineState {
    calls: Vec<EngineCall>,
    next_handle: u64,
    failing_paths: HashSet<String>,
}

/// Engine double; clones share one call log.
#[derive(Clone, Default)]
pub struct RecordingEngine {
    state: Rc<RefCell<EngineState>>,
}

impl RecordingEngine {
    pub fn calls(&self) -> Vec<EngineCall> {
        self.state.borrow().calls.clone()
    }

    pub fn transforms(&self) -> Vec<(TransformKind, [f32; 3])> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Transform { kind, vector, .. } => Some((kind, vector)),
                _ => None,
            })
            .collect()
    }

    pub fn fail_loads_of(&self, path: &str) {
        self.state.borrow_mut().failing_paths.insert(path.to_string());
    }

    fn next_handle(&self) -> u64 {
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        state.next_handle
    }

    fn record(&self, call: EngineCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl SceneEngine for RecordingEngine {
    fn create_scene(&mut self) -> Result<SceneHandle, EngineError> {
        let handle = SceneHandle(self.next_handle());
        self.record(EngineCall::CreateScene(handle));
        Ok(handle)
    }

    fn load_actor(&mut self, path: &str) -> Result<ActorHandle, EngineError> {
        if self.state.borrow().failing_paths.contains(path) {
            return Err(EngineError::ActorLoad {
                path: path.to_string(),
                reason: "unreadable".to_string(),
            });
        }
        let handle = ActorHandle(self.next_handle());
        self.record(EngineCall::LoadActor {
            path: path.to_string(),
            handle,
        });
        Ok(handle)
    }

    fn transform(
        &mut self,
        actor: ActorHandle,
        kind: TransformKind,
        vector: [f32; 3],
    ) -> Result<(), EngineError> {
        self.record(EngineCall::Transform {
            actor,
            kind,
            vector,
        });
        Ok(())
    }

    fn set_camera(&mut self, scene: SceneHandle, camera: &CameraParams) -> Result<(), EngineError> {
        self.record(EngineCall::SetCamera {
            scene,
            camera: *camera,
        });
        Ok(())
    }

    fn set_sun_direction(
        &mut self,
        scene: SceneHandle,
        direction: [f32; 3],
    ) -> Result<(), EngineError> {
        self.record(EngineCall::SetSun { scene, direction });
        Ok(())
    }

    fn release_actor(&mut self, actor: ActorHandle) {
        self.record(EngineCall::Release(actor));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Mount(String),
    DetachContent(PanelId),
    DisposePanel(PanelId),
    Move(PanelId, i32, i32),
    Resize(PanelId, i32, i32),
    SetFloating(PanelId, bool),
}

struct HostState {
    screen: Rect,
    calls: Vec<HostCall>,
    frames: HashMap<PanelId, PanelFrame>,
    panel_events: Option<EventSender>,
    fail_mounts: bool,
    fail_teardown: bool,
}

/// Panel host double on a 1920x1080 screen; clones share state.
#[derive(Clone)]
pub struct RecordingHost {
    state: Rc<RefCell<HostState>>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            state: Rc::new(RefCell::new(HostState {
                screen: Rect::new(0, 0, 1920, 1080),
                calls: Vec::new(),
                frames: HashMap::new(),
                panel_events: None,
                fail_mounts: false,
                fail_teardown: false,
            })),
        }
    }
}

impl RecordingHost {
    pub fn calls(&self) -> Vec<HostCall> {
        self.state.borrow().calls.clone()
    }

    pub fn mounts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Mount(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn frame_of(&self, id: PanelId) -> Option<PanelFrame> {
        self.state.borrow().frames.get(&id).copied()
    }

    /// Give every mounted panel an event channel; all of them feed the
    /// returned receiver.
    pub fn give_panels_events(&self) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.borrow_mut().panel_events = Some(tx);
        rx
    }

    pub fn fail_mounts(&self) {
        self.state.borrow_mut().fail_mounts = true;
    }

    pub fn fail_teardown(&self) {
        self.state.borrow_mut().fail_teardown = true;
    }

    fn record(&self, call: HostCall) {
        self.state.borrow_mut().calls.push(call);
    }

    fn with_frame(
        &self,
        id: PanelId,
        update: impl FnOnce(&mut PanelFrame),
    ) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let frame = state.frames.get_mut(&id).ok_or(HostError::UnknownPanel(id))?;
        update(frame);
        Ok(())
    }
}

impl PanelHost for RecordingHost {
    fn primary_screen(&self) -> Rect {
        self.state.borrow().screen
    }

    fn mount(&mut self, spec: &PanelSpec) -> Result<MountedPanel, HostError> {
        if self.state.borrow().fail_mounts {
            return Err(HostError::Mount {
                name: spec.name.clone(),
                reason: "no window".to_string(),
            });
        }
        self.record(HostCall::Mount(spec.name.clone()));

        let screen = self.primary_screen();
        let frame = match spec.placement {
            Placement::Docked(_) => PanelFrame {
                rect: Rect::new(0, 0, 300, screen.height),
                floating: false,
            },
            Placement::Floating { x, y, .. } => PanelFrame {
                rect: Rect::new(x, y, 300, 400),
                floating: true,
            },
        };
        let mut state = self.state.borrow_mut();
        state.frames.insert(spec.id, frame);
        Ok(MountedPanel {
            events: state.panel_events.clone(),
        })
    }

    fn detach_content(&mut self, id: PanelId) -> Result<(), HostError> {
        self.record(HostCall::DetachContent(id));
        if self.state.borrow().fail_teardown {
            return Err(HostError::Other("content already gone".to_string()));
        }
        Ok(())
    }

    fn dispose_panel(&mut self, id: PanelId) -> Result<(), HostError> {
        self.record(HostCall::DisposePanel(id));
        let mut state = self.state.borrow_mut();
        state.frames.remove(&id);
        if state.fail_teardown {
            return Err(HostError::Other("panel already gone".to_string()));
        }
        Ok(())
    }

    fn frame(&self, id: PanelId) -> Option<PanelFrame> {
        self.frame_of(id)
    }

    fn move_panel(&mut self, id: PanelId, x: i32, y: i32) -> Result<(), HostError> {
        self.record(HostCall::Move(id, x, y));
        self.with_frame(id, |frame| {
            frame.rect.x = x;
            frame.rect.y = y;
        })
    }

    fn resize_panel(&mut self, id: PanelId, width: i32, height: i32) -> Result<(), HostError> {
        self.record(HostCall::Resize(id, width, height));
        self.with_frame(id, |frame| {
            frame.rect.width = width;
            frame.rect.height = height;
        })
    }

    fn set_floating(&mut self, id: PanelId, floating: bool) -> Result<(), HostError> {
        self.record(HostCall::SetFloating(id, floating));
        self.with_frame(id, |frame| frame.floating = floating)
    }
}

#[derive(Default)]
struct DialogState {
    model: Option<String>,
    files: HashMap<String, String>,
    next_open: Option<String>,
    save_to: Option<String>,
    fail_saves: bool,
}

/// In-memory dialogs: saves land in a map that opens read back from.
#[derive(Clone, Default)]
pub struct MemoryDialogs {
    state: Rc<RefCell<DialogState>>,
}

impl MemoryDialogs {
    /// Path the next model pick returns
    pub fn pick_model_next(&self, path: &str) {
        self.state.borrow_mut().model = Some(path.to_string());
    }

    /// Path the next scene open returns
    pub fn open_next(&self, path: &str) {
        self.state.borrow_mut().next_open = Some(path.to_string());
    }

    /// Path the next save writes to; without one saves are cancelled
    pub fn save_next_to(&self, path: &str) {
        self.state.borrow_mut().save_to = Some(path.to_string());
    }

    pub fn put_file(&self, path: &str, content: &str) {
        self.state
            .borrow_mut()
            .files
            .insert(path.to_string(), content.to_string());
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.state.borrow().files.get(path).cloned()
    }

    pub fn fail_saves(&self) {
        self.state.borrow_mut().fail_saves = true;
    }
}

impl FileDialogs for MemoryDialogs {
    fn pick_model(&mut self) -> Result<Option<String>, ServiceError> {
        Ok(self.state.borrow_mut().model.take())
    }

    fn open_scene(&mut self) -> Result<Option<OpenedFile>, ServiceError> {
        let mut state = self.state.borrow_mut();
        let Some(path) = state.next_open.take() else {
            return Ok(None);
        };
        let content = state
            .files
            .get(&path)
            .cloned()
            .ok_or_else(|| ServiceError::Other(format!("{path} does not exist")))?;
        Ok(Some(OpenedFile { path, content }))
    }

    fn save_scene(&mut self, content: &str) -> Result<Option<String>, ServiceError> {
        let mut state = self.state.borrow_mut();
        if state.fail_saves {
            return Err(ServiceError::Other("disk full".to_string()));
        }
        let Some(path) = state.save_to.take() else {
            return Ok(None);
        };
        state.files.insert(path.clone(), content.to_string());
        Ok(Some(path))
    }
}

/// Script sink that keeps scripts in memory, or refuses them all.
#[derive(Clone, Default)]
pub struct MemoryScripts {
    scripts: Rc<RefCell<Vec<(u32, String)>>>,
    read_only: bool,
}

impl MemoryScripts {
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn scripts(&self) -> Vec<(u32, String)> {
        self.scripts.borrow().clone()
    }
}

impl ScriptSink for MemoryScripts {
    fn write_script(&mut self, code: &str, index: u32) -> Result<PathBuf, ServiceError> {
        let path = PathBuf::from(format!("script/{index}.py"));
        if self.read_only {
            return Err(ServiceError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            ));
        }
        self.scripts.borrow_mut().push((index, code.to_string()));
        Ok(path)
    }
}

/// Assistant that echoes queries, failing those starting with `fail` and
/// panicking on those starting with `panic`.
pub struct EchoAssistant;

impl AssistantBackend for EchoAssistant {
    fn ask(&self, query: &str) -> Result<String, AssistantError> {
        if query.starts_with("panic") {
            panic!("assistant crashed on {query}");
        }
        if query.starts_with("fail") {
            return Err(AssistantError::Query(format!("cannot answer {query}")));
        }
        Ok(format!("echo: {query}"))
    }
}

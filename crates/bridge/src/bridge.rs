//! The command bridge
//!
//! A single coordinating loop owns both registries, the panel host, and the
//! event bus. UI surfaces talk to it through a cloneable [`BridgeHandle`];
//! worker completions and teardown ticks arrive on their own channels and are
//! processed on the same loop, so no state is ever shared across threads.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use dockyard_assistant::AssistantBackend;
use dockyard_config::DockyardConfig;
use dockyard_ipc::{
    ActorOperation, AddDockWidget, AiQuery, AiResponse, BridgeEvent, CameraMove, Command,
    DockEvent, ExecuteCode, FileKind, ForwardDockEvent, MainMessage, OpenFileDialog, Payload,
    SaveStatus, SceneDocument, SendMessageToDock, SunDirection, extract_key_text,
};
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::bus::{EventBus, EventReceiver, SurfaceId, SurfaceIds, SurfaceKind};
use crate::engine::{CameraParams, SceneEngine};
use crate::error::{BridgeError, error_chain};
use crate::panel::{PanelHost, PanelLifecycleController, PanelRegistry, TeardownTick};
use crate::scene::{MAIN_SCENE, SceneActorRegistry};
use crate::services::{FileDialogs, ScriptSink};
use crate::worker::{WorkerCompletion, WorkerDispatcher};

/// External collaborators the bridge is constructed with.
///
/// The panel host is not among them: it is installed afterwards with
/// [`CommandBridge::install_panel_host`].
pub struct BridgeServices {
    pub engine: Box<dyn SceneEngine>,
    pub dialogs: Box<dyn FileDialogs>,
    pub scripts: Box<dyn ScriptSink>,
    pub assistant: Arc<dyn AssistantBackend>,
}

/// Messages surfaces send to the bridge
#[derive(Debug)]
pub enum Inbound {
    Command { name: String, payload: Payload },
    Attach {
        id: SurfaceId,
        kind: SurfaceKind,
        events: mpsc::UnboundedSender<BridgeEvent>,
    },
    Detach(SurfaceId),
}

/// Everything the coordinating loop reacts to
#[derive(Debug)]
pub enum BridgeMessage {
    Inbound(Inbound),
    Worker(WorkerCompletion<AiResponse>),
    Teardown(TeardownTick),
}

/// An attached surface's id and event stream
#[derive(Debug)]
pub struct Surface {
    pub id: SurfaceId,
    pub events: EventReceiver,
}

/// Cloneable, thread-safe way into the bridge
#[derive(Debug, Clone)]
pub struct BridgeHandle {
    inbound: mpsc::UnboundedSender<Inbound>,
    surface_ids: SurfaceIds,
}

impl BridgeHandle {
    /// Queue a command. Never blocks and never reports failure to the caller.
    pub fn dispatch(&self, name: impl Into<String>, payload: impl Into<Payload>) {
        self.send(Inbound::Command {
            name: name.into(),
            payload: payload.into(),
        });
    }

    /// Subscribe a surface to bridge events
    pub fn attach(&self, kind: SurfaceKind) -> Surface {
        let id = self.surface_ids.next();
        let (events, receiver) = mpsc::unbounded_channel();
        self.send(Inbound::Attach { id, kind, events });
        Surface {
            id,
            events: receiver,
        }
    }

    pub fn detach(&self, id: SurfaceId) {
        self.send(Inbound::Detach(id));
    }

    fn send(&self, message: Inbound) {
        if self.inbound.send(message).is_err() {
            tracing::warn!("Bridge has stopped; dropping message");
        }
    }
}

/// Submission context of an assistant query
#[derive(Debug)]
struct AiRequest {
    query: String,
}

pub struct CommandBridge {
    scenes: SceneActorRegistry,
    panels: PanelLifecycleController,
    host: Option<Box<dyn PanelHost>>,
    workers: WorkerDispatcher<AiResponse, AiRequest>,
    bus: EventBus,
    dialogs: Box<dyn FileDialogs>,
    scripts: Box<dyn ScriptSink>,
    assistant: Arc<dyn AssistantBackend>,
    handle: BridgeHandle,
    inbound: mpsc::UnboundedReceiver<Inbound>,
    completions: mpsc::UnboundedReceiver<WorkerCompletion<AiResponse>>,
    ticks: mpsc::UnboundedReceiver<TeardownTick>,
}

impl CommandBridge {
    /// Build the bridge. Workers and teardown timers run on `runtime`.
    pub fn new(config: &DockyardConfig, services: BridgeServices, runtime: Handle) -> Self {
        let (inbound_tx, inbound) = mpsc::unbounded_channel();
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let (ticks_tx, ticks) = mpsc::unbounded_channel();
        let surface_ids = SurfaceIds::default();

        Self {
            scenes: SceneActorRegistry::new(services.engine),
            panels: PanelLifecycleController::new(
                config.panels.duplicate_policy,
                config.teardown.phase_delay(),
                runtime.clone(),
                ticks_tx,
            ),
            host: None,
            workers: WorkerDispatcher::new(runtime, completions_tx),
            bus: EventBus::new(surface_ids.clone()),
            dialogs: services.dialogs,
            scripts: services.scripts,
            assistant: services.assistant,
            handle: BridgeHandle {
                inbound: inbound_tx,
                surface_ids,
            },
            inbound,
            completions,
            ticks,
        }
    }

    pub fn handle(&self) -> BridgeHandle {
        self.handle.clone()
    }

    /// Install the panel host if none is present yet.
    ///
    /// Returns `false`, keeping the existing host, if one was already
    /// installed.
    pub fn install_panel_host(&mut self, host: Box<dyn PanelHost>) -> bool {
        if self.host.is_some() {
            tracing::warn!("Panel host already installed; ignoring the new one");
            return false;
        }
        self.host = Some(host);
        tracing::info!("Panel host installed");
        true
    }

    pub fn has_panel_host(&self) -> bool {
        self.host.is_some()
    }

    pub fn scenes(&self) -> &SceneActorRegistry {
        &self.scenes
    }

    pub fn scenes_mut(&mut self) -> &mut SceneActorRegistry {
        &mut self.scenes
    }

    pub fn panels(&self) -> &PanelRegistry {
        self.panels.registry()
    }

    /// Assistant queries submitted but not yet answered
    pub fn outstanding_queries(&self) -> usize {
        self.workers.outstanding()
    }

    /// Process messages until `close_process` arrives.
    pub async fn run(mut self) {
        tracing::info!("Command bridge running");
        while let Some(message) = self.next_message().await {
            if self.process(message).is_break() {
                break;
            }
        }
        tracing::info!(
            "Command bridge stopped with {} queries outstanding",
            self.workers.outstanding()
        );
    }

    /// Wait for the next inbound message, worker completion, or teardown tick.
    pub async fn next_message(&mut self) -> Option<BridgeMessage> {
        tokio::select! {
            Some(message) = self.inbound.recv() => Some(BridgeMessage::Inbound(message)),
            Some(completion) = self.completions.recv() => Some(BridgeMessage::Worker(completion)),
            Some(tick) = self.ticks.recv() => Some(BridgeMessage::Teardown(tick)),
            else => None,
        }
    }

    pub fn process(&mut self, message: BridgeMessage) -> ControlFlow<()> {
        match message {
            BridgeMessage::Inbound(Inbound::Command { name, payload }) => {
                return self.dispatch(&name, payload);
            }
            BridgeMessage::Inbound(Inbound::Attach { id, kind, events }) => {
                self.bus.attach_as(id, kind, events);
            }
            BridgeMessage::Inbound(Inbound::Detach(id)) => {
                self.bus.detach(id);
            }
            BridgeMessage::Worker(completion) => self.on_worker_completion(completion),
            BridgeMessage::Teardown(tick) => match self.host.as_deref_mut() {
                Some(host) => self.panels.advance(host, &mut self.bus, tick),
                None => tracing::warn!("Teardown tick without a panel host: {:?}", tick),
            },
        }
        ControlFlow::Continue(())
    }

    /// Decode and run one command. Undecodable commands are logged and
    /// dropped.
    pub fn dispatch(&mut self, name: &str, payload: impl Into<Payload>) -> ControlFlow<()> {
        match Command::parse(name, payload) {
            Ok(command) => self.execute(command),
            Err(e) => {
                tracing::warn!("Dropping command: {}", e);
                ControlFlow::Continue(())
            }
        }
    }

    pub fn execute(&mut self, command: Command) -> ControlFlow<()> {
        let name = command.name();
        tracing::debug!("Executing {}", name);

        let result = match command {
            Command::AddDockWidget(request) => self.add_dock_widget(request),
            Command::RemoveDockWidget(request) => self.remove_dock_widget(&request.routename),
            Command::CreateActor(request) => self
                .scenes
                .create_actor(&request.scene_name, &request.path)
                .map(|_| ()),
            Command::RemoveActor => {
                self.scenes.reset_scene(MAIN_SCENE);
                Ok(())
            }
            Command::CreateScene(request) => {
                self.scenes.create_scene(&request.scene_name).map(|_| ())
            }
            Command::ActorDelete(request) => {
                self.actor_delete(&request.scene_name, &request.actor_name)
            }
            Command::ActorOperation(operation) => self.actor_operation(&operation),
            Command::CameraMove(camera) => {
                self.camera_move(&camera);
                Ok(())
            }
            Command::SunDirection(sun) => {
                self.sun_direction(&sun);
                Ok(())
            }
            Command::ExecutePythonCode(script) => {
                self.execute_code(&script);
                Ok(())
            }
            Command::SceneSave(document) => {
                self.scene_save(&document);
                Ok(())
            }
            Command::SendMessageToAi(query) => {
                self.send_message_to_ai(query);
                Ok(())
            }
            Command::SendMessageToMain(message) => {
                self.send_message_to_main(message);
                Ok(())
            }
            Command::ForwardDockEvent(event) => {
                self.forward_dock_event(event);
                Ok(())
            }
            Command::SendMessageToDock(message) => self.send_message_to_dock(message),
            Command::OpenFileDialog(request) => self.open_file_dialog(&request),
            Command::CloseProcess => {
                tracing::info!("close_process received");
                return ControlFlow::Break(());
            }
        };

        if let Err(e) = result {
            tracing::warn!("{} failed: {}", name, e);
        }
        ControlFlow::Continue(())
    }

    /// Delete an actor, reporting a missing scene or actor to the caller.
    pub fn actor_delete(&mut self, scene: &str, actor: &str) -> Result<(), BridgeError> {
        self.scenes.delete_actor(scene, actor)
    }

    fn add_dock_widget(&mut self, request: AddDockWidget) -> Result<(), BridgeError> {
        let host = self.host.as_deref_mut().ok_or(BridgeError::NoPanelHost)?;
        let outcome = self.panels.create(host, &mut self.bus, request)?;
        tracing::debug!("add_dock_widget: {:?}", outcome);
        Ok(())
    }

    fn remove_dock_widget(&mut self, name: &str) -> Result<(), BridgeError> {
        match self.panels.begin_teardown(name) {
            Err(BridgeError::PanelNotFound(_)) => {
                tracing::debug!("remove_dock_widget: no panel named '{}'", name);
                Ok(())
            }
            other => other.map(|_| ()),
        }
    }

    fn actor_operation(&mut self, operation: &ActorOperation) -> Result<(), BridgeError> {
        let Some(kind) = operation.kind() else {
            tracing::debug!("Ignoring unknown actor operation {:?}", operation.operation);
            return Ok(());
        };
        self.scenes.transform(
            &operation.scene_name,
            &operation.actor_name,
            kind,
            operation.vector(),
        )
    }

    fn camera_move(&mut self, camera: &CameraMove) {
        if let Err(e) = self
            .scenes
            .set_camera(&camera.scene_name, &CameraParams::from(camera))
        {
            tracing::debug!("camera_move skipped: {}", e);
        }
    }

    fn sun_direction(&mut self, sun: &SunDirection) {
        let direction = match sun.direction() {
            Ok(direction) => direction,
            Err(component) => {
                tracing::warn!("sun_direction: {} is not a number", component);
                self.publish(DockEvent::SunDirectionError {
                    message: format!("could not convert {component} to float"),
                });
                return;
            }
        };
        if let Err(e) = self.scenes.set_sun_direction(&sun.scene_name, direction) {
            tracing::warn!("sun_direction failed: {}", e);
            self.publish(DockEvent::SunDirectionError {
                message: e.to_string(),
            });
        }
    }

    fn execute_code(&mut self, script: &ExecuteCode) {
        match self.scripts.write_script(&script.code, script.index) {
            Ok(path) => tracing::info!("Script {} written to {}", script.index, path.display()),
            Err(e) => {
                tracing::warn!("Failed to write script {}: {}", script.index, e);
                self.publish(DockEvent::ScriptError {
                    message: e.to_string(),
                    stacktrace: error_chain(&e),
                });
            }
        }
    }

    fn scene_save(&mut self, document: &Value) {
        let event = match pretty_json(document) {
            Ok(content) => match self.dialogs.save_scene(&content) {
                Ok(Some(path)) => {
                    tracing::info!("Scene saved to {}", path);
                    DockEvent::SceneSaved {
                        status: SaveStatus::Success,
                        filepath: Some(path),
                    }
                }
                Ok(None) => DockEvent::SceneSaved {
                    status: SaveStatus::Error,
                    filepath: None,
                },
                Err(e) => DockEvent::SceneError {
                    message: e.to_string(),
                },
            },
            Err(e) => DockEvent::SceneError {
                message: e.to_string(),
            },
        };
        self.publish(event);
    }

    fn send_message_to_ai(&mut self, query: AiQuery) {
        let assistant = Arc::clone(&self.assistant);
        let message = query.message.clone();
        let id = self.workers.submit(
            AiRequest {
                query: query.message,
            },
            move || match assistant.ask(&message) {
                Ok(reply) => AiResponse::success(reply, unix_timestamp()),
                Err(e) => AiResponse::failure(e.to_string(), unix_timestamp()),
            },
        );
        tracing::debug!("Assistant query submitted as {:?}", id);
    }

    fn on_worker_completion(&mut self, completion: WorkerCompletion<AiResponse>) {
        let Some((request, outcome)) = self.workers.complete(completion) else {
            return;
        };
        let response =
            outcome.unwrap_or_else(|e| AiResponse::failure(e.to_string(), unix_timestamp()));
        tracing::debug!(
            "Answering {}-byte query with {:?}",
            request.query.len(),
            response.status
        );
        self.bus.publish(BridgeEvent::AiResponse(response));
    }

    fn send_message_to_main(&mut self, message: MainMessage) {
        let key = extract_key_text(&message.command_name, &message.command_data);
        let command_data = message.data_text();
        self.bus.publish(BridgeEvent::CommandToMain {
            command_name: message.command_name,
            command_data,
        });
        if let Some(key) = key {
            self.bus.publish(BridgeEvent::KeyEvent { key });
        }
    }

    fn forward_dock_event(&mut self, event: ForwardDockEvent) {
        self.publish(DockEvent::Forwarded {
            event_type: event.event_type.clone(),
            event_data: event.event_data.clone(),
        });
        if let Some(host) = self.host.as_deref_mut() {
            self.panels
                .apply_dock_event(host, &event.event_type, &event.event_data);
        }
    }

    /// Hand JSON text to the one panel mounted under `routename`.
    fn send_message_to_dock(&mut self, message: SendMessageToDock) -> Result<(), BridgeError> {
        serde_json::from_str::<Value>(&message.json_data).map_err(|source| {
            BridgeError::InvalidDockMessage {
                panel: message.routename.clone(),
                source,
            }
        })?;
        let event = BridgeEvent::Dock(DockEvent::DockData {
            data: message.json_data,
        });
        match self.bus.publish_to_panel(&message.routename, event) {
            0 => Err(BridgeError::PanelNotFound(message.routename)),
            delivered => {
                tracing::debug!(
                    "dockData delivered to {} '{}' surface(s)",
                    delivered,
                    message.routename
                );
                Ok(())
            }
        }
    }

    fn open_file_dialog(&mut self, request: &OpenFileDialog) -> Result<(), BridgeError> {
        match request.file_type {
            FileKind::Model => {
                let Some(path) = self.dialogs.pick_model()? else {
                    tracing::debug!("Model dialog cancelled");
                    return Ok(());
                };
                let actor = self.scenes.create_actor(&request.scene_name, &path)?;
                self.publish(DockEvent::ActorCreated(actor));
            }
            FileKind::Scene => match self.load_scene_file(&request.scene_name) {
                Ok(Some(actors)) => self.publish(DockEvent::SceneLoaded { actors }),
                Ok(None) => tracing::debug!("Scene dialog cancelled"),
                Err(e) => {
                    tracing::warn!("Failed to load scene: {}", e);
                    self.publish(DockEvent::SceneError {
                        message: e.to_string(),
                    });
                }
            },
        }
        Ok(())
    }

    fn load_scene_file(
        &mut self,
        scene: &str,
    ) -> Result<Option<Vec<dockyard_ipc::ActorSummary>>, BridgeError> {
        let Some(file) = self.dialogs.open_scene()? else {
            return Ok(None);
        };
        let document: SceneDocument =
            serde_json::from_str(&file.content).map_err(BridgeError::SceneDocument)?;
        let actors = self.scenes.load_document(scene, &document)?;
        tracing::info!("Loaded scene '{}' from {}", scene, file.path);
        Ok(Some(actors))
    }

    fn publish(&mut self, event: DockEvent) {
        self.bus.publish(event.into());
    }
}

/// Scene documents are written with four-space indentation.
fn pretty_json(value: &Value) -> Result<String, serde_json::Error> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SceneHandle;
    use crate::testing::{
        EchoAssistant, HostCall, MemoryDialogs, MemoryScripts, RecordingEngine, RecordingHost,
    };
    use dockyard_ipc::{ActorSummary, AiStatus, CommandName, TransformKind};
    use serde_json::json;

    struct Fixture {
        bridge: CommandBridge,
        engine: RecordingEngine,
        dialogs: MemoryDialogs,
        events: EventReceiver,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_scripts(MemoryScripts::default())
        }

        fn with_scripts(scripts: MemoryScripts) -> Self {
            let engine = RecordingEngine::default();
            let dialogs = MemoryDialogs::default();
            let mut config = DockyardConfig::default();
            config.teardown.phase_delay_ms = 0;
            let mut bridge = CommandBridge::new(
                &config,
                BridgeServices {
                    engine: Box::new(engine.clone()),
                    dialogs: Box::new(dialogs.clone()),
                    scripts: Box::new(scripts),
                    assistant: Arc::new(EchoAssistant),
                },
                Handle::current(),
            );
            let (tx, events) = mpsc::unbounded_channel();
            bridge.bus.attach(SurfaceKind::Observer, tx);
            Self {
                bridge,
                engine,
                dialogs,
                events,
            }
        }

        fn with_host(self) -> (Self, RecordingHost) {
            let mut fixture = self;
            let host = RecordingHost::default();
            assert!(fixture.bridge.install_panel_host(Box::new(host.clone())));
            (fixture, host)
        }

        fn send(&mut self, name: &str, payload: Value) -> ControlFlow<()> {
            self.bridge.dispatch(name, payload)
        }

        fn drain(&mut self) -> Vec<BridgeEvent> {
            let mut events = Vec::new();
            while let Ok(event) = self.events.try_recv() {
                events.push(event);
            }
            events
        }

        /// Process queued messages until `done` holds
        async fn pump_until(&mut self, done: impl Fn(&CommandBridge) -> bool) {
            while !done(&self.bridge) {
                let message = self.bridge.next_message().await.unwrap();
                assert!(self.bridge.process(message).is_continue());
            }
        }

        fn scene_with_cube(&mut self) {
            self.send("create_scene", json!({"sceneName": "scene1"}));
            self.send(
                "create_actor",
                json!({"sceneName": "scene1", "path": "models/cube.obj"}),
            );
        }
    }

    fn dock_events(events: &[BridgeEvent]) -> Vec<(String, Value)> {
        events
            .iter()
            .filter_map(|event| match event {
                BridgeEvent::Dock(dock) => Some((
                    dock.event_type().to_string(),
                    serde_json::from_str(&dock.event_data()).unwrap_or(Value::Null),
                )),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_actor_operation_issues_one_transform() {
        let mut fx = Fixture::new();
        fx.scene_with_cube();

        fx.send(
            "actor_operation",
            json!({"sceneName": "scene1", "actorName": "cube.obj", "Operation": "Rotate",
                   "x": 90, "y": "2.5", "z": "sideways"}),
        );
        assert_eq!(
            fx.engine.transforms(),
            vec![(TransformKind::Rotate, [90.0, 2.5, 0.0])]
        );

        fx.send(
            "actor_operation",
            json!({"sceneName": "scene1", "actorName": "cube.obj", "Operation": "Twist"}),
        );
        assert_eq!(fx.engine.transforms().len(), 1);
        assert!(fx.drain().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_payloads_are_dropped() {
        let (mut fx, host) = Fixture::new().with_host();
        for name in CommandName::ALL {
            let flow = fx.bridge.dispatch(name.as_str(), "{not json");
            assert!(flow.is_continue(), "{name} stopped the bridge");
        }
        fx.send("actor_operation", json!({"sceneName": 5, "actorName": "a"}));
        fx.send("add_dock_widget", json!({"routename": "console"}));

        assert!(fx.drain().is_empty());
        assert!(fx.engine.calls().is_empty());
        assert!(host.calls().is_empty());
        assert_eq!(fx.bridge.outstanding_queries(), 0);
    }

    #[tokio::test]
    async fn test_every_ai_query_is_answered_once() {
        let mut fx = Fixture::new();
        let queries = ["hello", "fail please", "panic now", "where is the sun", "bye"];
        for query in queries {
            fx.send("send_message_to_ai", json!({ "message": query }));
        }
        assert_eq!(fx.bridge.outstanding_queries(), queries.len());

        fx.pump_until(|bridge| bridge.outstanding_queries() == 0).await;

        let responses: Vec<AiResponse> = fx
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                BridgeEvent::AiResponse(response) => Some(response),
                _ => None,
            })
            .collect();
        assert_eq!(responses.len(), queries.len());
        let failures = responses
            .iter()
            .filter(|r| r.status == AiStatus::Error)
            .count();
        assert_eq!(failures, 2);
        assert!(responses
            .iter()
            .any(|r| r.status == AiStatus::Success && r.content == "echo: bye"));
        assert!(responses.iter().all(|r| r.timestamp > 0));
    }

    #[tokio::test]
    async fn test_inspector_toggles_off() {
        let (mut fx, host) = Fixture::new().with_host();
        let request = json!({"routename": "inspector", "routepath": "/inspector"});
        fx.send("add_dock_widget", request.clone());
        assert!(fx.bridge.panels().contains("inspector"));
        assert_eq!(fx.bridge.panels().len(), 1);

        fx.send("add_dock_widget", request);
        fx.pump_until(|bridge| bridge.panels().is_empty()).await;
        assert_eq!(host.mounts(), vec!["inspector".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_dock_widget_runs_teardown() {
        let (mut fx, host) = Fixture::new().with_host();
        fx.send(
            "add_dock_widget",
            json!({"routename": "console", "routepath": "/console"}),
        );
        fx.send("remove_dock_widget", json!({"routename": "console"}));
        fx.send("remove_dock_widget", json!({"routename": "nothing"}));
        fx.pump_until(|bridge| bridge.panels().is_empty()).await;

        let calls = host.calls();
        let detach = calls
            .iter()
            .position(|c| matches!(c, HostCall::DetachContent(_)))
            .unwrap();
        let dispose = calls
            .iter()
            .position(|c| matches!(c, HostCall::DisposePanel(_)))
            .unwrap();
        assert!(detach < dispose);
    }

    #[tokio::test]
    async fn test_deleting_ghost_actor() {
        let mut fx = Fixture::new();
        fx.scene_with_cube();

        let err = fx.bridge.actor_delete("scene1", "ghost.obj").unwrap_err();
        assert!(matches!(err, BridgeError::ActorNotFound { .. }));
        assert_eq!(
            fx.bridge.scenes().actor_names("scene1").unwrap(),
            vec!["cube.obj"]
        );

        fx.send(
            "actor_delete",
            json!({"sceneName": "scene1", "actorName": "cube.obj"}),
        );
        assert!(fx.bridge.scenes().actor_names("scene1").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_scene() {
        let mut fx = Fixture::new();
        fx.send("create_scene", json!({"sceneName": "scene1"}));
        fx.dialogs.save_next_to("saves/scene.json");
        fx.send("scene_save", json!({"actors": [{"path": "a.obj"}]}));

        let saved = fx.dialogs.file("saves/scene.json").unwrap();
        assert!(saved.contains("\n    \"actors\""));
        assert_eq!(
            dock_events(&fx.drain()),
            vec![(
                "sceneSaved".to_string(),
                json!({"status": "success", "filepath": "saves/scene.json"})
            )]
        );

        fx.dialogs.open_next("saves/scene.json");
        fx.send(
            "open_file_dialog",
            json!({"sceneName": "scene1", "file_type": "scene"}),
        );
        let scene = fx.bridge.scenes().scene("scene1").unwrap();
        assert_eq!(scene.actor("a.obj").unwrap().path, "a.obj");
        assert_eq!(scene.actor_count(), 1);
        assert_eq!(
            dock_events(&fx.drain()),
            vec![(
                "sceneLoaded".to_string(),
                json!({"actors": [ActorSummary { name: "a.obj".into(), path: "a.obj".into() }]})
            )]
        );
    }

    #[tokio::test]
    async fn test_cancelled_and_failed_saves() {
        let mut fx = Fixture::new();
        fx.send("scene_save", json!({"actors": []}));
        fx.dialogs.fail_saves();
        fx.send("scene_save", json!({"actors": []}));

        let events = dock_events(&fx.drain());
        assert_eq!(
            events[0],
            (
                "sceneSaved".to_string(),
                json!({"status": "error", "filepath": null})
            )
        );
        assert_eq!(events[1].0, "sceneError");
        assert_eq!(events[1].1["message"], "disk full");
    }

    #[tokio::test]
    async fn test_unreadable_scene_reports_error() {
        let mut fx = Fixture::new();
        fx.send("create_scene", json!({"sceneName": "scene1"}));
        fx.dialogs.put_file("bad.json", "{\"actors\": 7}");
        fx.dialogs.open_next("bad.json");
        fx.send(
            "open_file_dialog",
            json!({"sceneName": "scene1", "file_type": "scene"}),
        );
        let events = dock_events(&fx.drain());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "sceneError");
        assert_eq!(events[0].1["type"], "error");
    }

    #[tokio::test]
    async fn test_model_dialog_creates_actor() {
        let mut fx = Fixture::new();
        fx.send("create_scene", json!({"sceneName": "scene1"}));
        fx.send("open_file_dialog", json!({"sceneName": "scene1"}));
        assert!(fx.drain().is_empty());

        fx.dialogs.pick_model_next("/assets/lamp.fbx");
        fx.send("open_file_dialog", json!({"sceneName": "scene1", "fileType": "model"}));
        assert_eq!(
            dock_events(&fx.drain()),
            vec![(
                "actorCreated".to_string(),
                json!({"name": "lamp.fbx", "path": "/assets/lamp.fbx"})
            )]
        );
    }

    #[tokio::test]
    async fn test_sun_direction_reports_missing_scene() {
        let mut fx = Fixture::new();
        fx.send("sun_direction", json!({"sceneName": "nowhere", "px": 0.5}));
        let events = dock_events(&fx.drain());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "sunDirectionError");
        assert_eq!(events[0].1["message"], "Scene 'nowhere' does not exist");

        fx.bridge.scenes_mut().register_scene("scene1", SceneHandle(1));
        fx.send("sun_direction", Value::Null);
        assert!(fx.drain().is_empty());
        assert_eq!(fx.engine.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_sun_direction_reports_non_numeric_component() {
        let mut fx = Fixture::new();
        fx.bridge.scenes_mut().register_scene("scene1", SceneHandle(1));
        fx.send("sun_direction", json!({"px": 0.5, "py": "noon"}));

        let events = dock_events(&fx.drain());
        assert_eq!(
            events,
            vec![(
                "sunDirectionError".to_string(),
                json!({"type": "error", "message": "could not convert py to float"})
            )]
        );
        assert!(fx.engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_camera_move_defaults() {
        let mut fx = Fixture::new();
        fx.send("camera_move", json!({}));
        assert!(fx.engine.calls().is_empty());

        fx.bridge.scenes_mut().register_scene("scene1", SceneHandle(4));
        fx.send("camera_move", json!({"fov": 60}));
        assert_eq!(
            fx.engine.calls(),
            vec![crate::testing::EngineCall::SetCamera {
                scene: SceneHandle(4),
                camera: CameraParams {
                    position: [0.0, 5.0, 10.0],
                    forward: [0.0, 1.5, 0.0],
                    up: [0.0, -1.0, 0.0],
                    fov: 60.0,
                },
            }]
        );
        assert!(fx.drain().is_empty());
    }

    #[tokio::test]
    async fn test_remove_actor_resets_main_scene() {
        let mut fx = Fixture::new();
        fx.bridge.scenes_mut().register_scene(MAIN_SCENE, SceneHandle(1));
        fx.send(
            "create_actor",
            json!({"sceneName": MAIN_SCENE, "path": "cube.obj"}),
        );
        fx.send("remove_actor", Value::Null);
        let scene = fx.bridge.scenes().scene(MAIN_SCENE).unwrap();
        assert_eq!(scene.handle(), None);
        assert_eq!(scene.actor_count(), 0);
    }

    #[tokio::test]
    async fn test_script_failure_reports_stacktrace() {
        let mut fx = Fixture::with_scripts(MemoryScripts::read_only());
        fx.send("execute_python_code", json!({"code": "print(1)", "index": 3}));
        let events = dock_events(&fx.drain());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "scriptError");
        assert_eq!(events[0].1["status"], "error");
        assert!(
            events[0].1["stacktrace"]
                .as_str()
                .unwrap()
                .ends_with("caused by: read-only")
        );
    }

    #[tokio::test]
    async fn test_scripts_are_written() {
        let scripts = MemoryScripts::default();
        let mut fx = Fixture::with_scripts(scripts.clone());
        fx.send("execute_python_code", json!({"code": "print(1)", "index": 2}));
        assert_eq!(scripts.scripts(), vec![(2, "print(1)".to_string())]);
        assert!(fx.drain().is_empty());
    }

    #[tokio::test]
    async fn test_negative_script_index_writes_nothing() {
        let scripts = MemoryScripts::default();
        let mut fx = Fixture::with_scripts(scripts.clone());
        let flow = fx.send("execute_python_code", json!({"code": "print(1)", "index": -1}));
        assert!(flow.is_continue());
        assert!(scripts.scripts().is_empty());
        assert!(fx.drain().is_empty());
    }

    #[tokio::test]
    async fn test_message_to_dock_reaches_named_panel() {
        let mut fx = Fixture::new();
        let (chat_tx, mut chat) = mpsc::unbounded_channel();
        let (console_tx, mut console) = mpsc::unbounded_channel();
        fx.bridge.bus.attach(SurfaceKind::Panel("chat".into()), chat_tx);
        fx.bridge.bus.attach(SurfaceKind::Panel("console".into()), console_tx);

        fx.send(
            "send_message_to_dock",
            json!({"routename": "chat", "jsonData": "{\"mode\": \"edit\"}"}),
        );
        let expected = BridgeEvent::Dock(DockEvent::DockData {
            data: "{\"mode\": \"edit\"}".to_string(),
        });
        assert_eq!(chat.try_recv().unwrap(), expected);
        assert!(console.try_recv().is_err());
        assert_eq!(fx.drain(), vec![expected]);

        // Unknown panels and bad JSON are logged and dropped
        let flow = fx.send(
            "send_message_to_dock",
            json!({"routename": "settings", "jsonData": "{}"}),
        );
        assert!(flow.is_continue());
        fx.send(
            "send_message_to_dock",
            json!({"routename": "chat", "jsonData": "{mode"}),
        );
        assert!(chat.try_recv().is_err());
        assert!(console.try_recv().is_err());
        assert!(fx.drain().is_empty());
    }

    #[tokio::test]
    async fn test_message_to_main_derives_key() {
        let mut fx = Fixture::new();
        fx.send(
            "send_message_to_main",
            json!({"commandName": "shortcut", "commandData": {"key": "Ctrl+S"}}),
        );
        fx.send(
            "send_message_to_main",
            json!({"commandName": "go_home", "commandData": ""}),
        );
        assert_eq!(
            fx.drain(),
            vec![
                BridgeEvent::CommandToMain {
                    command_name: "shortcut".into(),
                    command_data: "{\"key\":\"Ctrl+S\"}".into(),
                },
                BridgeEvent::KeyEvent {
                    key: "Ctrl+S".into()
                },
                BridgeEvent::CommandToMain {
                    command_name: "go_home".into(),
                    command_data: String::new(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_forwarded_drag_moves_floating_panel() {
        let (mut fx, host) = Fixture::new().with_host();
        fx.send(
            "add_dock_widget",
            json!({"routename": "chat", "routepath": "/chat", "position": "float",
                   "floatposition": "center"}),
        );
        fx.send(
            "forward_dock_event",
            json!({"eventType": "drag", "eventData": "{\"routename\":\"chat\",\"deltaX\":5,\"deltaY\":-5}"}),
        );

        assert!(host.calls().iter().any(|c| matches!(c, HostCall::Move(_, 964, 534))));
        let events = dock_events(&fx.drain());
        assert_eq!(events[0].0, "drag");
        assert_eq!(events[0].1["deltaX"], 5);
    }

    #[tokio::test]
    async fn test_oversized_drag_keeps_bridge_running() {
        let (mut fx, host) = Fixture::new().with_host();
        fx.send(
            "add_dock_widget",
            json!({"routename": "chat", "routepath": "/chat", "position": "float",
                   "floatposition": "center"}),
        );
        let flow = fx.send(
            "forward_dock_event",
            json!({"eventType": "drag",
                   "eventData": "{\"routename\":\"chat\",\"deltaX\":3000000000,\"deltaY\":0}"}),
        );

        assert!(flow.is_continue());
        assert!(host.calls().iter().any(|c| matches!(c, HostCall::Move(_, i32::MAX, 539))));
        assert!(fx.bridge.panels().get("chat").unwrap().is_live());
    }

    #[tokio::test]
    async fn test_panel_commands_need_a_host() {
        let mut fx = Fixture::new();
        fx.send(
            "add_dock_widget",
            json!({"routename": "console", "routepath": "/console"}),
        );
        assert!(fx.bridge.panels().is_empty());

        assert!(fx.bridge.install_panel_host(Box::new(RecordingHost::default())));
        assert!(!fx.bridge.install_panel_host(Box::new(RecordingHost::default())));
        assert!(fx.bridge.has_panel_host());
    }

    #[tokio::test]
    async fn test_handle_round_trip_until_close() {
        let fx = Fixture::new();
        let handle = fx.bridge.handle();
        let mut surface = handle.attach(SurfaceKind::Panel("console".into()));
        handle.dispatch("sun_direction", r#"{"sceneName": "scene9"}"#);
        handle.dispatch("close_process", "");
        handle.dispatch("sun_direction", r#"{"sceneName": "scene9"}"#);

        fx.bridge.run().await;

        let Some(BridgeEvent::Dock(event)) = surface.events.recv().await else {
            panic!("expected a dock event");
        };
        assert_eq!(event.event_type(), "sunDirectionError");
        // The bridge is gone, so the channel closes without a second event
        assert!(surface.events.recv().await.is_none());
    }
}

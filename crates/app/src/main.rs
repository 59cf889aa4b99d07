//! Dockyard - headless command bridge host
//!
//! Reads commands from stdin, one JSON object per line, and writes bridge
//! events to stdout. Logs go to stderr, filtered by `DOCKYARD_LOG`.

use std::sync::Arc;

use dockyard_assistant::{AssistantBackend, RemoteAssistant, UnconfiguredAssistant};
use dockyard_bridge::{
    BridgeServices, CommandBridge, EngineError, MAIN_SCENE, SceneEngine, SurfaceKind,
};
use dockyard_config::DockyardConfig;
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;

mod config;
mod headless;
mod stdio;
mod storage;

use config::AppConfig;
use headless::{HeadlessEngine, HeadlessPanelHost};
use storage::{DirectoryDialogs, ScriptDirectory};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("Failed to create the main scene: {0}")]
    MainScene(#[from] EngineError),

    #[error("Failed to start the input thread: {0}")]
    InputThread(#[source] std::io::Error),
}

/// Wire the headless services into a bridge with the main scene registered
/// and the panel host installed.
fn build_bridge(config: &DockyardConfig, runtime: Handle) -> Result<CommandBridge, StartupError> {
    let mut engine = HeadlessEngine::default();
    let main_scene = engine.create_scene()?;

    let assistant: Arc<dyn AssistantBackend> = match &config.assistant.server_url {
        Some(url) => {
            tracing::info!("Assistant server: {}", url);
            Arc::new(RemoteAssistant::new(url.clone(), runtime.clone()))
        }
        None => {
            tracing::info!("No assistant server configured");
            Arc::new(UnconfiguredAssistant)
        }
    };

    let services = BridgeServices {
        engine: Box::new(engine),
        dialogs: Box::new(DirectoryDialogs::new(&config.storage.saves_dir)),
        scripts: Box::new(ScriptDirectory::new(&config.storage.script_dir)),
        assistant,
    };

    let mut bridge = CommandBridge::new(config, services, runtime.clone());
    bridge.scenes_mut().register_scene(MAIN_SCENE, main_scene);
    bridge.install_panel_host(Box::new(HeadlessPanelHost::new(&config.display, runtime)));
    Ok(bridge)
}

async fn run(config: DockyardConfig, app: AppConfig) -> Result<(), StartupError> {
    let bridge = build_bridge(&config, Handle::current())?;
    let handle = bridge.handle();

    let main_surface = handle.attach(SurfaceKind::Main);
    tokio::spawn(stdio::run_main_surface(main_surface.events));

    let echo = handle.attach(app.echo.surface_kind());
    let writer = tokio::spawn(stdio::write_events(echo.events, tokio::io::stdout()));

    // Blocking stdin reads stay off the runtime so they cannot hold up shutdown
    let feed = handle.clone();
    std::thread::Builder::new()
        .name("dockyard-stdin".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            stdio::feed_commands(stdin.lock(), &feed);
        })
        .map_err(StartupError::InputThread)?;

    bridge.run().await;

    match writer.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("Event output failed: {}", e),
        Err(e) => tracing::warn!("Event writer task failed: {}", e),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_env("DOCKYARD_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = DockyardConfig::from_env();
    let app = AppConfig::default();
    tracing::info!(
        "Starting Dockyard ({:?} events on stdout, {:?} duplicate panels)",
        app.echo,
        config.panels.duplicate_policy
    );

    if let Err(e) = run(config, app).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

mod action;
mod app;
mod app_state;
mod component;
mod components;
mod controller;
mod core;
mod error;
mod intent;
mod media;
mod mpv;
mod theme;
mod widgets;

use radio_model::catalog::list_stations;
use radio_model::config::Config;
use tokio::sync::broadcast;

/// What the PlaybackCore broadcasts to the UI.
#[derive(Debug, Clone)]
pub enum BroadcastMessage {
    /// The PlaybackState has changed; receivers should fetch from StateManager.
    StateUpdated,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Load config ──────────────────────────────────────────────────────────
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    // ── Logging ──────────────────────────────────────────────────────────────
    let log_path = config.logging.log_file.clone();
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override of the configured filter.
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.filter.clone());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("basic-radio log: {}", log_path.display());

    tracing::info!("basic-radio starting…");
    if let Some(e) = config_error {
        tracing::warn!("config unreadable, using defaults: {:#}", e);
    }

    // ── Broadcast channel (PlaybackCore → TUI) ───────────────────────────────
    let (broadcast_tx, broadcast_rx) = broadcast::channel::<BroadcastMessage>(1024);

    // ── Command queue (TUI → PlaybackCore) ───────────────────────────────────
    let (core_handle, event_rx) = core::CoreHandle::channel();

    // ── Build PlaybackCore ───────────────────────────────────────────────────
    let backend = mpv::MpvBackend::new(&config.player);
    let controller = controller::PlaybackController::new(backend, config.player.initial_volume());
    let initial = controller.state();
    let playback_core = core::PlaybackCore::new(controller, broadcast_tx);
    let state_manager = playback_core.state_manager();

    let core_task = tokio::spawn(playback_core.run(event_rx));

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(
        list_stations(),
        initial,
        config.ui.volume_step,
        core_handle.clone(),
        state_manager,
    );
    let result = app.run(broadcast_rx).await;

    // The app already asked for shutdown; this covers an early error exit.
    core_handle.shutdown().await;
    drop(core_handle);
    if let Err(e) = core_task.await {
        tracing::error!("PlaybackCore task failed: {}", e);
    }
    tracing::info!("basic-radio stopped");

    result
}

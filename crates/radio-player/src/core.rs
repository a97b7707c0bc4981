/// PlaybackCore — single-owner event loop for the playback controller.
///
/// Every playback transition is sent here as a `PlaybackEvent` and applied
/// one at a time, in arrival order.  The core owns the `PlaybackController`
/// (and through it the only player handle); no other task touches them.
///
/// After each event the controller snapshot is written to the shared
/// `StateManager` and a `BroadcastMessage::StateUpdated` is sent so the UI
/// can redraw.  There is no cancellation: a slow stream open simply holds
/// back the commands queued behind it.
use std::sync::Arc;

use radio_model::protocol::Command;
use radio_model::state::StateManager;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info};

use crate::controller::PlaybackController;
use crate::error::PlaybackError;
use crate::media::MediaBackend;
use crate::BroadcastMessage;

const QUEUE_DEPTH: usize = 256;

// ── PlaybackEvent ─────────────────────────────────────────────────────────────

/// All inputs into the PlaybackCore loop.
#[derive(Debug)]
pub enum PlaybackEvent {
    /// A command from the UI.
    Command(Command),
    /// Release the player and stop the loop.
    Shutdown,
}

// ── CoreHandle ────────────────────────────────────────────────────────────────

/// Cloneable sending side of the core's queue.
#[derive(Clone)]
pub struct CoreHandle {
    tx: mpsc::Sender<PlaybackEvent>,
}

impl CoreHandle {
    pub fn channel() -> (Self, mpsc::Receiver<PlaybackEvent>) {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        (Self { tx }, rx)
    }

    pub async fn send(&self, cmd: Command) -> anyhow::Result<()> {
        self.tx
            .send(PlaybackEvent::Command(cmd))
            .await
            .map_err(|_| anyhow::anyhow!("playback core has stopped"))
    }

    pub async fn select_station(&self, url: impl Into<String>) -> anyhow::Result<()> {
        self.send(Command::SelectStation { url: url.into() }).await
    }

    pub async fn set_volume(&self, value: f32) -> anyhow::Result<()> {
        self.send(Command::Volume { value }).await
    }

    /// Ask the core to release the player and exit.  Already stopped is fine.
    pub async fn shutdown(&self) {
        if self.tx.send(PlaybackEvent::Shutdown).await.is_err() {
            debug!("shutdown: playback core already stopped");
        }
    }
}

// ── PlaybackCore ──────────────────────────────────────────────────────────────

pub struct PlaybackCore<B: MediaBackend> {
    controller: PlaybackController<B>,
    state_manager: Arc<StateManager>,
    broadcast_tx: broadcast::Sender<BroadcastMessage>,
}

impl<B: MediaBackend> PlaybackCore<B> {
    pub fn new(
        controller: PlaybackController<B>,
        broadcast_tx: broadcast::Sender<BroadcastMessage>,
    ) -> Self {
        let state_manager = Arc::new(StateManager::new(controller.state()));
        Self {
            controller,
            state_manager,
            broadcast_tx,
        }
    }

    /// Borrow the state manager (for the UI).
    pub fn state_manager(&self) -> Arc<StateManager> {
        Arc::clone(&self.state_manager)
    }

    /// Run the loop until `Shutdown` arrives or every `CoreHandle` is
    /// dropped.  The player is released either way.
    pub async fn run(mut self, mut event_rx: mpsc::Receiver<PlaybackEvent>) {
        info!("PlaybackCore: starting event loop");

        loop {
            match event_rx.recv().await {
                None => {
                    info!("PlaybackCore: event channel closed, shutting down");
                    break;
                }

                Some(PlaybackEvent::Shutdown) => {
                    info!("PlaybackCore: shutdown requested");
                    break;
                }

                Some(PlaybackEvent::Command(cmd)) => {
                    debug!("PlaybackCore: command {:?}", cmd);
                    match self.controller.apply(cmd).await {
                        Ok(status) => debug!(
                            "PlaybackCore: now {:?}, volume {}%",
                            status,
                            self.controller.volume().percent()
                        ),
                        Err(PlaybackError::Disposed) => debug!("PlaybackCore: disposed"),
                        Err(e) => error!("PlaybackCore: {}", e),
                    }
                    self.publish().await;
                }
            }
        }

        self.controller.shutdown().await;
        self.publish().await;
        info!("PlaybackCore: stopped");
    }

    async fn publish(&self) {
        let rev = self.state_manager.publish(self.controller.state()).await;
        debug!("PlaybackCore: published rev {}", rev);
        // no receivers (UI gone) is fine
        let _ = self.broadcast_tx.send(BroadcastMessage::StateUpdated);
    }
}

//! PlaybackController — the select/pause/switch state machine.
//!
//! ```text
//!   Idle ──select(u)──▶ Playing(u) ──select(u)──▶ Paused(u)
//!                          ▲   │                     │
//!                          │   └──select(v)──▶ Playing(v)
//!                          └──────select(u)──────────┘
//!   any ──shutdown──▶ Disposed
//! ```
//!
//! The player handle lives inside `Playing`/`Paused`, so a handle exists
//! exactly when a station is selected.  A previous handle is always stopped
//! and released before the next `open`.

use radio_model::protocol::{Command, PlaybackState, PlaybackStatus, Volume};
use tracing::{debug, info, warn};

use crate::error::PlaybackError;
use crate::media::{MediaBackend, PlayerHandle};

enum Slot<H> {
    Idle,
    Playing { url: String, handle: H },
    Paused { url: String, handle: H },
    Disposed,
}

pub struct PlaybackController<B: MediaBackend> {
    backend: B,
    slot: Slot<B::Handle>,
    volume: Volume,
}

impl<B: MediaBackend> PlaybackController<B> {
    pub fn new(backend: B, volume: Volume) -> Self {
        Self {
            backend,
            slot: Slot::Idle,
            volume,
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        match self.slot {
            Slot::Idle => PlaybackStatus::Idle,
            Slot::Playing { .. } => PlaybackStatus::Playing,
            Slot::Paused { .. } => PlaybackStatus::Paused,
            Slot::Disposed => PlaybackStatus::Disposed,
        }
    }

    pub fn current_url(&self) -> Option<&str> {
        match &self.slot {
            Slot::Playing { url, .. } | Slot::Paused { url, .. } => Some(url),
            Slot::Idle | Slot::Disposed => None,
        }
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self.slot, Slot::Disposed)
    }

    /// Snapshot for publishing.  `rev` is left at 0; the state manager
    /// assigns it.
    pub fn state(&self) -> PlaybackState {
        let status = self.status();
        PlaybackState {
            rev: 0,
            current_url: self.current_url().map(str::to_string),
            is_playing: status == PlaybackStatus::Playing,
            volume: self.volume,
            status,
        }
    }

    pub async fn apply(&mut self, cmd: Command) -> Result<PlaybackStatus, PlaybackError> {
        match cmd {
            Command::SelectStation { url } => self.select_station(&url).await,
            Command::Volume { value } => {
                self.set_volume(value).await?;
                Ok(self.status())
            }
        }
    }

    /// Tap on a station: toggle pause on the selected one, otherwise switch.
    pub async fn select_station(&mut self, url: &str) -> Result<PlaybackStatus, PlaybackError> {
        // Slot is Idle while a transition is in flight; a dropped transition
        // therefore never leaves a stale Playing/Paused behind.
        match std::mem::replace(&mut self.slot, Slot::Idle) {
            Slot::Disposed => {
                self.slot = Slot::Disposed;
                debug!("select {} ignored: controller disposed", url);
                Err(PlaybackError::Disposed)
            }

            Slot::Playing { url: current, mut handle } if current == url => {
                match handle.pause().await {
                    Ok(()) => {
                        info!("paused {}", current);
                        self.slot = Slot::Paused {
                            url: current,
                            handle,
                        };
                        Ok(PlaybackStatus::Paused)
                    }
                    Err(e) => {
                        warn!("pause failed for {}: {}; releasing player", current, e);
                        handle.release().await;
                        Ok(PlaybackStatus::Idle)
                    }
                }
            }

            Slot::Paused { url: current, mut handle } if current == url => {
                match handle.start().await {
                    Ok(()) => {
                        info!("resumed {}", current);
                        self.slot = Slot::Playing {
                            url: current,
                            handle,
                        };
                        Ok(PlaybackStatus::Playing)
                    }
                    Err(e) => {
                        handle.release().await;
                        Err(PlaybackError::acquisition(url, e))
                    }
                }
            }

            Slot::Playing { url: current, handle } | Slot::Paused { url: current, handle } => {
                info!("switching {} → {}", current, url);
                retire(&current, handle).await;
                self.acquire(url).await
            }

            Slot::Idle => self.acquire(url).await,
        }
    }

    /// Open, apply the current volume, start.  On any failure the partially
    /// created handle is released and the controller stays `Idle`.
    async fn acquire(&mut self, url: &str) -> Result<PlaybackStatus, PlaybackError> {
        debug!("acquiring player for {}", url);
        let mut handle = self
            .backend
            .open(url)
            .await
            .map_err(|e| PlaybackError::acquisition(url, e))?;

        let gain = self.volume.get();
        if let Err(e) = handle.set_volume(gain, gain).await {
            warn!("initial volume for {} not applied: {}", url, e);
        }

        if let Err(e) = handle.start().await {
            handle.release().await;
            return Err(PlaybackError::acquisition(url, e));
        }

        info!("playing {}", url);
        self.slot = Slot::Playing {
            url: url.to_string(),
            handle,
        };
        Ok(PlaybackStatus::Playing)
    }

    /// Clamp and store `value`, then push it to the live handle if any.
    pub async fn set_volume(&mut self, value: f32) -> Result<Volume, PlaybackError> {
        if self.is_disposed() {
            return Err(PlaybackError::Disposed);
        }
        self.volume = Volume::new(value);
        let gain = self.volume.get();
        if let Slot::Playing { url, handle } | Slot::Paused { url, handle } = &mut self.slot {
            if let Err(e) = handle.set_volume(gain, gain).await {
                warn!("volume for {} not applied: {}", url, e);
            }
        }
        debug!("volume {}", gain);
        Ok(self.volume)
    }

    /// Release the handle and refuse everything afterwards.  Idempotent.
    pub async fn shutdown(&mut self) {
        match std::mem::replace(&mut self.slot, Slot::Disposed) {
            Slot::Playing { url, handle } | Slot::Paused { url, handle } => {
                info!("shutdown: releasing player for {}", url);
                retire(&url, handle).await;
            }
            Slot::Idle => info!("shutdown: no player"),
            Slot::Disposed => {}
        }
    }
}

async fn retire<H: PlayerHandle>(url: &str, mut handle: H) {
    if let Err(e) = handle.stop().await {
        debug!("stop {} before release: {}", url, e);
    }
    handle.release().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::fake::{FakeBackend, Probe};
    use radio_model::catalog::list_stations;

    const A: &str = "http://a.example/stream";
    const B: &str = "http://b.example/stream";

    fn controller() -> (PlaybackController<FakeBackend>, Probe) {
        let (backend, probe) = FakeBackend::new();
        (PlaybackController::new(backend, Volume::MAX), probe)
    }

    #[tokio::test]
    async fn test_initial_state() {
        let (ctl, probe) = controller();
        let state = ctl.state();
        assert_eq!(state.current_url, None);
        assert!(!state.is_playing);
        assert_eq!(state.volume, Volume::MAX);
        assert_eq!(state.status, PlaybackStatus::Idle);
        assert_eq!(probe.live(), 0);
    }

    #[tokio::test]
    async fn test_select_toggles_pause() {
        let (mut ctl, probe) = controller();

        assert_eq!(ctl.select_station(A).await.unwrap(), PlaybackStatus::Playing);
        assert_eq!(ctl.state().current_url.as_deref(), Some(A));
        assert!(ctl.state().is_playing);

        assert_eq!(ctl.select_station(A).await.unwrap(), PlaybackStatus::Paused);
        assert_eq!(ctl.state().current_url.as_deref(), Some(A));
        assert!(!ctl.state().is_playing);

        assert_eq!(ctl.select_station(A).await.unwrap(), PlaybackStatus::Playing);
        assert_eq!(probe.live(), 1);
        // toggling never reopens the stream
        assert_eq!(probe.with(|s| s.opened.len()), 1);
    }

    #[tokio::test]
    async fn test_switch_releases_before_open() {
        let (mut ctl, probe) = controller();
        ctl.select_station(A).await.unwrap();
        ctl.select_station(B).await.unwrap();

        assert_eq!(ctl.state().current_url.as_deref(), Some(B));
        assert_eq!(ctl.status(), PlaybackStatus::Playing);
        assert_eq!(probe.live(), 1);
        assert_eq!(probe.max_live(), 1);

        let calls = probe.calls();
        let released = calls.iter().position(|c| c == &format!("release {A}")).unwrap();
        let opened = calls.iter().position(|c| c == &format!("open {B}")).unwrap();
        assert!(released < opened, "calls: {calls:?}");
    }

    #[tokio::test]
    async fn test_switch_from_paused_plays_new_station() {
        let (mut ctl, probe) = controller();
        ctl.select_station(A).await.unwrap();
        ctl.select_station(A).await.unwrap();
        assert_eq!(ctl.select_station(B).await.unwrap(), PlaybackStatus::Playing);
        assert_eq!(ctl.state().label_for(A), None);
        assert_eq!(ctl.state().label_for(B), Some("Playing"));
        assert_eq!(probe.with(|s| s.released.clone()), vec![A.to_string()]);
    }

    #[tokio::test]
    async fn test_at_most_one_live_handle() {
        let (mut ctl, probe) = controller();
        let urls = [A, B, B, A, A, B, A, B, B, B, A];
        for url in urls {
            ctl.select_station(url).await.unwrap();
            assert!(probe.live() <= 1);
        }
        assert_eq!(probe.max_live(), 1);
        ctl.shutdown().await;
        assert_eq!(probe.live(), 0);
    }

    #[tokio::test]
    async fn test_volume_is_clamped_and_applied() {
        let (mut ctl, probe) = controller();
        assert_eq!(ctl.set_volume(1.4).await.unwrap().get(), 1.0);
        assert_eq!(ctl.set_volume(-0.2).await.unwrap().get(), 0.0);
        assert_eq!(ctl.state().volume.get(), 0.0);
        // no handle yet, nothing applied
        assert!(probe.with(|s| s.volumes.is_empty()));

        ctl.set_volume(0.4).await.unwrap();
        ctl.select_station(A).await.unwrap();
        ctl.select_station(A).await.unwrap();
        ctl.set_volume(3.0).await.unwrap();

        let volumes = probe.with(|s| s.volumes.clone());
        assert_eq!(volumes, vec![(A.to_string(), 0.4), (A.to_string(), 1.0)]);
        // volume does not change play/pause
        assert_eq!(ctl.status(), PlaybackStatus::Paused);
    }

    #[tokio::test]
    async fn test_initial_volume_applied_before_start() {
        let (backend, probe) = FakeBackend::new();
        let mut ctl = PlaybackController::new(backend, Volume::new(0.3));
        ctl.select_station(A).await.unwrap();
        assert_eq!(
            probe.calls(),
            vec![format!("open {A}"), format!("volume {A}"), format!("start {A}")]
        );
    }

    #[tokio::test]
    async fn test_acquisition_failure_reverts_to_idle_then_retries() {
        let (mut ctl, probe) = controller();
        ctl.select_station(A).await.unwrap();
        probe.fail_open(B);

        let err = ctl.select_station(B).await.unwrap_err();
        assert!(matches!(&err, PlaybackError::AcquisitionFailed { url, .. } if url == B));
        assert_eq!(ctl.status(), PlaybackStatus::Idle);
        assert_eq!(ctl.state().current_url, None);
        assert_eq!(probe.live(), 0);

        probe.heal(B);
        assert_eq!(ctl.select_station(B).await.unwrap(), PlaybackStatus::Playing);
        assert_eq!(probe.with(|s| s.calls.iter().filter(|c| *c == &format!("open {B}")).count()), 2);
    }

    #[tokio::test]
    async fn test_start_failure_releases_handle() {
        let (mut ctl, probe) = controller();
        probe.with(|s| s.fail_start.insert(A.to_string()));
        assert!(ctl.select_station(A).await.is_err());
        assert_eq!(ctl.status(), PlaybackStatus::Idle);
        assert_eq!(probe.live(), 0);
        assert_eq!(probe.with(|s| s.released.clone()), vec![A.to_string()]);
    }

    #[tokio::test]
    async fn test_resume_failure_reverts_to_idle() {
        let (mut ctl, probe) = controller();
        ctl.select_station(A).await.unwrap();
        ctl.select_station(A).await.unwrap();
        probe.with(|s| s.fail_start.insert(A.to_string()));
        assert!(ctl.select_station(A).await.is_err());
        assert_eq!(ctl.status(), PlaybackStatus::Idle);
        assert_eq!(probe.live(), 0);
    }

    #[tokio::test]
    async fn test_pause_failure_releases_handle() {
        let (mut ctl, probe) = controller();
        ctl.select_station(A).await.unwrap();
        probe.with(|s| s.fail_pause.insert(A.to_string()));
        assert_eq!(ctl.select_station(A).await.unwrap(), PlaybackStatus::Idle);
        assert_eq!(probe.live(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_while_playing() {
        let (mut ctl, probe) = controller();
        ctl.select_station(A).await.unwrap();
        ctl.shutdown().await;

        assert_eq!(probe.live(), 0);
        assert_eq!(ctl.status(), PlaybackStatus::Disposed);
        assert!(matches!(ctl.select_station(B).await, Err(PlaybackError::Disposed)));
        assert!(matches!(ctl.set_volume(0.5).await, Err(PlaybackError::Disposed)));
        assert_eq!(ctl.volume(), Volume::MAX);
        assert_eq!(probe.with(|s| s.opened.len()), 1);

        // second shutdown is a no-op
        ctl.shutdown().await;
        assert_eq!(probe.live(), 0);
    }

    #[tokio::test]
    async fn test_catalog_rows_scenario() {
        let (mut ctl, probe) = controller();
        let stations = list_stations();
        assert_eq!(stations.len(), 10);
        let row2 = &stations[1].url;
        let row5 = &stations[4].url;

        ctl.select_station(row2).await.unwrap();
        assert_eq!(ctl.state().current_url.as_ref(), Some(row2));
        assert_eq!(ctl.status(), PlaybackStatus::Playing);

        ctl.select_station(row2).await.unwrap();
        assert_eq!(ctl.status(), PlaybackStatus::Paused);
        assert_eq!(ctl.state().label_for(row2), Some("Paused"));

        ctl.select_station(row5).await.unwrap();
        let state = ctl.state();
        assert_eq!(state.current_url.as_ref(), Some(row5));
        assert!(state.is_playing);
        assert_eq!(state.label_for(row2), None);
        assert_eq!(state.label_for(row5), Some("Playing"));
        assert_eq!(probe.live(), 1);
    }

    #[tokio::test]
    async fn test_apply_commands() {
        let (mut ctl, _probe) = controller();
        let status = ctl
            .apply(Command::SelectStation { url: A.into() })
            .await
            .unwrap();
        assert_eq!(status, PlaybackStatus::Playing);
        let status = ctl.apply(Command::Volume { value: 0.5 }).await.unwrap();
        assert_eq!(status, PlaybackStatus::Playing);
        assert_eq!(ctl.volume().get(), 0.5);
    }
}

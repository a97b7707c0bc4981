//! AppState — shared read-only data passed to all components during render/event.
//!
//! Components read this for playback state, but never mutate it.
//! The App event-loop is the only thing that writes to AppState.

use radio_model::protocol::{PlaybackState, Station, Volume};

use crate::intent::{IntentState, RenderHint};

pub struct AppState {
    // ── Playback ────────────────────────────────────────────────────────────
    /// Latest snapshot read from the StateManager.
    pub playback: PlaybackState,
    pub stations: &'static [Station],

    // ── Pending tap ─────────────────────────────────────────────────────────
    /// Commands handed to the core so far.  The core publishes exactly one
    /// snapshot per command, so command N is reflected at rev >= N.
    pub commands_sent: u64,
    /// Revision the most recent tap is waiting for.
    pub tap: IntentState<u64>,
    pub tapped_url: Option<String>,
    /// How to render the tapped row, refreshed every tick.
    pub station_hint: RenderHint,

    // ── Volume ──────────────────────────────────────────────────────────────
    /// Last volume asked for.  Steps build on this so repeated key presses
    /// add up before the core catches up.
    pub requested_volume: Volume,
    pub volume_step: f32,
}

impl AppState {
    pub fn new(stations: &'static [Station], playback: PlaybackState, volume_step: f32) -> Self {
        let rev = playback.rev;
        let requested_volume = playback.volume;
        Self {
            playback,
            stations,
            commands_sent: rev,
            tap: IntentState::new(rev),
            tapped_url: None,
            station_hint: RenderHint::Normal,
            requested_volume,
            volume_step,
        }
    }

    /// Record that a command was queued.  Returns the revision that will
    /// carry its result.
    pub fn command_sent(&mut self) -> u64 {
        self.commands_sent += 1;
        self.commands_sent
    }

    /// Record a queued volume change.
    pub fn volume_sent(&mut self, volume: Volume) {
        self.command_sent();
        self.requested_volume = volume;
    }

    /// Record a queued tap on `url`.
    pub fn tap_sent(&mut self, url: &str) {
        let target = self.command_sent();
        self.tap.set_intent(target);
        self.tapped_url = Some(url.to_string());
        self.station_hint = self.tap.render_state();
    }

    /// Take a fresh snapshot from the core.
    pub fn on_snapshot(&mut self, snapshot: PlaybackState) {
        if snapshot.rev < self.playback.rev {
            return;
        }
        self.tap.on_confirmed(snapshot.rev);
        if snapshot.rev >= self.commands_sent {
            self.requested_volume = snapshot.volume;
        }
        self.playback = snapshot;
        self.station_hint = self.tap.render_state();
    }

    /// Advance the pending-tap timeout.  Returns `true` if a redraw is due.
    pub fn tick(&mut self) -> bool {
        self.tap.tick();
        let hint = self.tap.render_state();
        let changed = hint != self.station_hint;
        self.station_hint = hint;
        changed
    }

    /// Pending marker for the row showing `url`.
    pub fn hint_for(&self, url: &str) -> RenderHint {
        if self.tapped_url.as_deref() == Some(url) {
            self.station_hint
        } else {
            RenderHint::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radio_model::catalog::list_stations;
    use radio_model::protocol::PlaybackStatus;

    fn playing(rev: u64, url: &str) -> PlaybackState {
        PlaybackState {
            rev,
            current_url: Some(url.to_string()),
            is_playing: true,
            volume: Volume::MAX,
            status: PlaybackStatus::Playing,
        }
    }

    #[test]
    fn test_tap_pending_until_its_revision() {
        let stations = list_stations();
        let url = stations[1].url.as_str();
        let mut state = AppState::new(stations, PlaybackState::default(), 0.05);

        state.command_sent(); // volume change queued first
        state.tap_sent(url);
        assert!(state.hint_for(url).is_pending());
        assert_eq!(state.hint_for(&stations[0].url), RenderHint::Normal);

        state.on_snapshot(PlaybackState {
            rev: 1,
            ..PlaybackState::default()
        });
        assert!(state.hint_for(url).is_pending());

        state.on_snapshot(playing(2, url));
        assert_eq!(state.hint_for(url), RenderHint::Normal);
        assert_eq!(state.playback.label_for(url), Some("Playing"));
    }

    #[test]
    fn test_volume_steps_accumulate_until_caught_up() {
        let mut state = AppState::new(list_stations(), PlaybackState::default(), 0.1);
        let first = state.requested_volume.offset(-0.1);
        state.volume_sent(first);
        let second = state.requested_volume.offset(-0.1);
        state.volume_sent(second);
        assert!((state.requested_volume.get() - 0.8).abs() < 1e-6);

        // first command published, second still queued
        state.on_snapshot(PlaybackState {
            rev: 1,
            volume: first,
            ..PlaybackState::default()
        });
        assert_eq!(state.requested_volume, second);

        state.on_snapshot(PlaybackState {
            rev: 2,
            volume: Volume::new(0.8),
            ..PlaybackState::default()
        });
        assert!((state.requested_volume.get() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_stale_snapshot_ignored() {
        let stations = list_stations();
        let url = stations[0].url.as_str();
        let mut state = AppState::new(stations, PlaybackState::default(), 0.05);

        state.on_snapshot(playing(3, url));
        state.on_snapshot(PlaybackState {
            rev: 2,
            ..PlaybackState::default()
        });
        assert_eq!(state.playback.rev, 3);
        assert!(state.playback.is_selected(url));
    }
}

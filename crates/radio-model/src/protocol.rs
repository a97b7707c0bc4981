/// Commands accepted by the playback core.  Applied strictly in the order
/// they were queued.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Tap on a station row: toggles pause when `url` is already selected,
    /// otherwise switches to it and starts playing.
    SelectStation { url: String },
    Volume { value: f32 },
}

/// Coarse playback status as shown by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Idle, // nothing selected, no player handle
    Playing,
    Paused,
    Disposed, // shut down, no further commands accepted
}

impl PlaybackStatus {
    /// Row label for the selected station, `None` when nothing is selected.
    pub fn label(self) -> Option<&'static str> {
        match self {
            PlaybackStatus::Playing => Some("Playing"),
            PlaybackStatus::Paused => Some("Paused"),
            PlaybackStatus::Idle | PlaybackStatus::Disposed => None,
        }
    }
}

/// Playback volume, always within `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Volume(f32);

impl Volume {
    pub const MAX: Volume = Volume(1.0);
    pub const MIN: Volume = Volume(0.0);

    /// Clamp `value` into range.  NaN is treated as silence.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::MIN;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn get(self) -> f32 {
        self.0
    }

    /// Step up or down by `delta`, clamped.
    pub fn offset(self, delta: f32) -> Self {
        Self::new(self.0 + delta)
    }

    /// Integer percentage (0..=100) for display and for players that take
    /// percentages.
    pub fn percent(self) -> u16 {
        (self.0 * 100.0).round() as u16
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::MAX
    }
}

/// Snapshot of the playback controller.  `rev` is a monotonically increasing
/// counter bumped every time a new snapshot is published.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackState {
    pub rev: u64,
    pub current_url: Option<String>,
    /// True only while a started player handle exists for `current_url`.
    pub is_playing: bool,
    pub volume: Volume,
    pub status: PlaybackStatus,
}

impl PlaybackState {
    pub fn with_volume(volume: Volume) -> Self {
        Self {
            volume,
            ..Self::default()
        }
    }

    pub fn is_selected(&self, url: &str) -> bool {
        self.current_url.as_deref() == Some(url)
    }

    /// "Playing" / "Paused" for the selected station, nothing for the rest.
    pub fn label_for(&self, url: &str) -> Option<&'static str> {
        if self.is_selected(url) {
            self.status.label()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Station {
    pub name: String,
    pub url: String,
    /// Artwork is never fetched; kept for display metadata only.
    pub artwork_url: String,
}

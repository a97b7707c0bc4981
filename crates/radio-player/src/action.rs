//! Action enum — all user-initiated intents and internal events.

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    StationList,
    VolumeSlider,
}

impl ComponentId {
    pub fn next(self) -> Self {
        match self {
            Self::StationList => Self::VolumeSlider,
            Self::VolumeSlider => Self::StationList,
        }
    }
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Playback ─────────────────────────────────────────────────────────────
    /// Tap on a station row, by catalog index.
    Tap(usize),
    /// Absolute volume from the slider; clamped by the controller.
    SetVolume(f32),
    /// Relative volume change (sign gives direction).
    NudgeVolume(f32),

    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    FocusPane(ComponentId),

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
}

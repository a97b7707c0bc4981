//! Pending-intent tracking for taps with confirmation latency.
//!
//! A tap is queued behind whatever the playback core is doing, so the UI
//! cannot flip a row to "Playing" straight away.  Instead it remembers the
//! state revision that will carry the tap's result and shows a pending marker
//! until a snapshot at or past that revision arrives.
//!
//! # States
//! ```text
//!  Confirmed(T)          — caught up; render normally
//!  Pending { ... }       — waiting for `intended`; render the marker
//!  TimedOut { ... }      — waited too long; render "?"
//! ```
//!
//! `T` must be monotonic (state revisions are), so any confirmation at or
//! past the intended value settles the intent.

use std::time::{Duration, Instant};

/// Timeout before a pending intent becomes `TimedOut`.
pub const INTENT_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone)]
pub enum IntentState<T: Copy + Ord> {
    Confirmed(T),
    Pending {
        intended: T,
        confirmed: T,
        since: Instant,
    },
    TimedOut { intended: T, confirmed: T },
}

impl<T: Copy + Ord> IntentState<T> {
    pub fn new(value: T) -> Self {
        Self::Confirmed(value)
    }

    /// The last confirmed value.
    pub fn confirmed(&self) -> T {
        match *self {
            Self::Confirmed(v) => v,
            Self::Pending { confirmed, .. } | Self::TimedOut { confirmed, .. } => confirmed,
        }
    }

    /// Register a command whose result will be visible at `intended`.
    /// Already reached means nothing to wait for.
    pub fn set_intent(&mut self, intended: T) {
        let confirmed = self.confirmed();
        *self = if intended <= confirmed {
            Self::Confirmed(confirmed)
        } else {
            Self::Pending {
                intended,
                confirmed,
                since: Instant::now(),
            }
        };
    }

    /// Called every tick to check for timeout.  Returns `true` if state changed.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> bool {
        if let Self::Pending {
            intended,
            confirmed,
            since,
        } = *self
        {
            if now.duration_since(since) >= INTENT_TIMEOUT {
                *self = Self::TimedOut {
                    intended,
                    confirmed,
                };
                return true;
            }
        }
        false
    }

    /// Feed a newly published value.  Returns `true` if the intent settled.
    pub fn on_confirmed(&mut self, value: T) -> bool {
        match *self {
            Self::Pending { intended, .. } | Self::TimedOut { intended, .. } => {
                if value >= intended {
                    *self = Self::Confirmed(value);
                    return true;
                }
                if let Self::Pending { confirmed, .. } | Self::TimedOut { confirmed, .. } = self {
                    *confirmed = value;
                }
                false
            }
            Self::Confirmed(v) => {
                if value > v {
                    *self = Self::Confirmed(value);
                }
                false
            }
        }
    }

    pub fn render_state(&self) -> RenderHint {
        match self {
            Self::Confirmed(_) => RenderHint::Normal,
            Self::Pending { since, .. } => {
                // Pulse on/off every 400ms
                let pulsing = (since.elapsed().as_millis() / 400) % 2 == 0;
                if pulsing {
                    RenderHint::PendingVisible
                } else {
                    RenderHint::PendingHidden
                }
            }
            Self::TimedOut { .. } => RenderHint::TimedOut,
        }
    }
}

/// How to render a row that may be pending confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderHint {
    Normal,
    /// Pending, show marker (pulse-on frame).
    PendingVisible,
    /// Pending, hide marker (pulse-off frame).
    PendingHidden,
    /// Timed out — warning colour and "?".
    TimedOut,
}

impl RenderHint {
    pub fn is_pending(self) -> bool {
        matches!(self, Self::PendingVisible | Self::PendingHidden)
    }
}

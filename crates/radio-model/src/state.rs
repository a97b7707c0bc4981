use crate::protocol::PlaybackState;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared, read-mostly view of the playback state.
///
/// Only the playback core writes (via `publish`); the UI reads snapshots
/// after a `StateUpdated` broadcast.  Nothing is persisted.
pub struct StateManager {
    state: Arc<RwLock<PlaybackState>>,
}

impl StateManager {
    pub fn new(initial: PlaybackState) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial)),
        }
    }

    pub async fn get_state(&self) -> PlaybackState {
        self.state.read().await.clone()
    }

    /// Replace the stored snapshot.  The stored `rev` is always one past the
    /// previous one, whatever `rev` the caller passed in.  Returns it.
    pub async fn publish(&self, snapshot: PlaybackState) -> u64 {
        let mut state = self.state.write().await;
        let rev = state.rev + 1;
        *state = PlaybackState { rev, ..snapshot };
        rev
    }
}

//! Error types for the playback path.

use thiserror::Error;

/// Failures reported by a media backend or one of its player handles.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("mpv binary not found (install mpv or set player.mpv_binary)")]
    BinaryNotFound,

    #[error("failed to spawn player process: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("player IPC endpoint did not appear")]
    SocketTimeout,

    #[error("player IPC error: {0}")]
    Ipc(String),

    #[error("stream could not be opened: {reason}")]
    Stream { reason: String },

    #[error("stream did not open within {0}s")]
    OpenTimeout(u64),
}

/// Errors surfaced by the playback controller.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Opening, preparing or starting the stream for `url` failed.  The
    /// controller is back in `Idle` and holds no handle.
    #[error("playback acquisition failed for {url}: {cause}")]
    AcquisitionFailed {
        url: String,
        #[source]
        cause: BackendError,
    },

    #[error("playback controller is shut down")]
    Disposed,
}

impl PlaybackError {
    pub fn acquisition(url: &str, cause: BackendError) -> Self {
        Self::AcquisitionFailed {
            url: url.to_string(),
            cause,
        }
    }
}

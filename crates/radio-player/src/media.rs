//! Media backend abstraction — the six operations the controller relies on.
//!
//! `open` returns a prepared handle that is not yet audible.  `start` makes it
//! audible (and resumes after `pause`).  `release` consumes the handle, so a
//! released handle cannot be used again.

use std::future::Future;

use crate::error::BackendError;

pub trait MediaBackend: Send {
    type Handle: PlayerHandle;

    /// Acquire a player bound to `url` and prepare it for playback.
    fn open(&mut self, url: &str) -> impl Future<Output = Result<Self::Handle, BackendError>> + Send;
}

pub trait PlayerHandle: Send {
    fn start(&mut self) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn pause(&mut self) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn stop(&mut self) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Per-channel gain, each in `[0.0, 1.0]`.
    fn set_volume(
        &mut self,
        left: f32,
        right: f32,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Free the underlying resource.  Never fails from the caller's point of
    /// view; problems are logged by the implementation.
    fn release(self) -> impl Future<Output = ()> + Send;
}

#[cfg(test)]
pub mod fake;

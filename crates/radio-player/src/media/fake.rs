//! In-memory backend for tests.  Counts live handles so leaks show up as a
//! non-zero `live` after the handles should have been released.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::BackendError;
use crate::media::{MediaBackend, PlayerHandle};

#[derive(Debug, Default)]
pub struct ProbeState {
    pub live: usize,
    pub max_live: usize,
    pub opened: Vec<String>,
    pub released: Vec<String>,
    /// Every handle call, in order: "open url", "start url", "pause url", ...
    pub calls: Vec<String>,
    /// Last volume applied per handle, as (url, left).
    pub volumes: Vec<(String, f32)>,
    pub fail_open: HashSet<String>,
    pub fail_start: HashSet<String>,
    pub fail_pause: HashSet<String>,
    pub open_delay: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct Probe(Arc<Mutex<ProbeState>>);

impl Probe {
    pub fn with<R>(&self, f: impl FnOnce(&mut ProbeState) -> R) -> R {
        let mut guard = self.0.lock().unwrap();
        f(&mut guard)
    }

    pub fn live(&self) -> usize {
        self.with(|s| s.live)
    }

    pub fn max_live(&self) -> usize {
        self.with(|s| s.max_live)
    }

    pub fn calls(&self) -> Vec<String> {
        self.with(|s| s.calls.clone())
    }

    pub fn fail_open(&self, url: &str) {
        self.with(|s| s.fail_open.insert(url.to_string()));
    }

    pub fn heal(&self, url: &str) {
        self.with(|s| {
            s.fail_open.remove(url);
            s.fail_start.remove(url);
            s.fail_pause.remove(url);
        });
    }

    fn record(&self, call: String) {
        self.with(|s| s.calls.push(call));
    }
}

pub struct FakeBackend {
    pub probe: Probe,
}

impl FakeBackend {
    pub fn new() -> (Self, Probe) {
        let probe = Probe::default();
        (
            Self {
                probe: probe.clone(),
            },
            probe,
        )
    }
}

pub struct FakeHandle {
    url: String,
    probe: Probe,
}

impl MediaBackend for FakeBackend {
    type Handle = FakeHandle;

    async fn open(&mut self, url: &str) -> Result<FakeHandle, BackendError> {
        let delay = self.probe.with(|s| s.open_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.probe.record(format!("open {url}"));
        let fails = self.probe.with(|s| s.fail_open.contains(url));
        if fails {
            return Err(BackendError::Stream {
                reason: "error".into(),
            });
        }
        self.probe.with(|s| {
            s.live += 1;
            s.max_live = s.max_live.max(s.live);
            s.opened.push(url.to_string());
        });
        Ok(FakeHandle {
            url: url.to_string(),
            probe: self.probe.clone(),
        })
    }
}

impl PlayerHandle for FakeHandle {
    async fn start(&mut self) -> Result<(), BackendError> {
        self.probe.record(format!("start {}", self.url));
        if self.probe.with(|s| s.fail_start.contains(&self.url)) {
            return Err(BackendError::Ipc("start refused".into()));
        }
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), BackendError> {
        self.probe.record(format!("pause {}", self.url));
        if self.probe.with(|s| s.fail_pause.contains(&self.url)) {
            return Err(BackendError::Ipc("pause refused".into()));
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), BackendError> {
        self.probe.record(format!("stop {}", self.url));
        Ok(())
    }

    async fn set_volume(&mut self, left: f32, _right: f32) -> Result<(), BackendError> {
        self.probe.record(format!("volume {}", self.url));
        let url = self.url.clone();
        self.probe.with(|s| s.volumes.push((url, left)));
        Ok(())
    }

    async fn release(self) {
        self.probe.record(format!("release {}", self.url));
        self.probe.with(|s| {
            s.live -= 1;
            s.released.push(self.url.clone());
        });
    }
}

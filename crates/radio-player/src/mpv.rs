/// mpv backend: one mpv process per player handle, driven over JSON IPC.
///
/// ```text
///   MpvBackend::open(url)
///         │  spawn `mpv --idle=yes --pause` with a per-session IPC socket
///         ├── writer_task   ← receives PendingRequest via mpsc, serialises → socket
///         ├── reader_task   ← reads JSON lines from socket
///         │                      ├── response (has request_id) → matched oneshot::Sender
///         │                      └── event                     → event channel
///         └── loadfile url, wait for file-loaded / end-file(error)
/// ```
///
/// The returned `MpvSession` is prepared but paused; `start()` unpauses it.
/// Releasing the session quits and kills the process.
///
/// Platform notes:
/// - Unix:   Unix domain sockets
/// - Windows: Named pipes  \\.\pipe\<name>
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

#[cfg(unix)]
use tokio::net::UnixStream;

#[cfg(windows)]
use tokio::net::windows::named_pipe::ClientOptions;

use radio_model::config::PlayerConfig;
use radio_model::platform;

use crate::error::BackendError;
use crate::media::{MediaBackend, PlayerHandle};

// ── global counters ───────────────────────────────────────────────────────────

static NEXT_REQ_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

const IPC_REPLY_TIMEOUT: Duration = Duration::from_secs(5);

type Reply = oneshot::Sender<Result<Value, BackendError>>;
type PendingMap = Arc<Mutex<HashMap<u64, Reply>>>;

// ── internal channel types ────────────────────────────────────────────────────

struct PendingRequest {
    req_id: u64,
    payload: String, // serialised JSON line (already has '\n')
    reply: Reply,
}

/// An mpv event that arrived unsolicited (no request_id).
#[derive(Debug, Clone)]
pub struct MpvEvent {
    pub raw: Value,
}

impl MpvEvent {
    /// Returns the event name, e.g. "end-file", "start-file", "file-loaded".
    pub fn event_name(&self) -> Option<&str> {
        self.raw.get("event")?.as_str()
    }

    /// `reason` of an `end-file` event ("eof", "stop", "error", ...).
    pub fn end_file_reason(&self) -> Option<&str> {
        if self.event_name()? != "end-file" {
            return None;
        }
        self.raw.get("reason")?.as_str()
    }

    /// True for an `end-file` that means the stream could not be played.
    /// Redirects (playlist URLs) end one entry and load the next, so they are
    /// not failures.
    pub fn is_open_failure(&self) -> bool {
        matches!(self.end_file_reason(), Some("error") | Some("quit"))
    }

    fn failure_reason(&self) -> String {
        let reason = self.end_file_reason().unwrap_or("unknown");
        match self.raw.get("file_error").and_then(|v| v.as_str()) {
            Some(detail) => format!("{reason}: {detail}"),
            None => reason.to_string(),
        }
    }
}

fn encode_request(req_id: u64, command: &Value) -> Result<String, BackendError> {
    let msg = json!({ "command": command, "request_id": req_id });
    let mut raw = serde_json::to_string(&msg).map_err(|e| BackendError::Ipc(e.to_string()))?;
    raw.push('\n');
    Ok(raw)
}

// ── IPC handle ────────────────────────────────────────────────────────────────

/// Cloneable handle to the mpv writer task.  Use `send()` to fire a command
/// and await the response.
#[derive(Clone)]
pub struct MpvHandle {
    tx: mpsc::Sender<PendingRequest>,
}

impl MpvHandle {
    pub async fn send(&self, command: Value) -> Result<Value, BackendError> {
        let req_id = NEXT_REQ_ID.fetch_add(1, Ordering::Relaxed);
        let payload = encode_request(req_id, &command)?;

        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(PendingRequest {
                req_id,
                payload,
                reply: reply_tx,
            })
            .await
            .map_err(|_| BackendError::Ipc("mpv writer task gone".into()))?;

        tokio::time::timeout(IPC_REPLY_TIMEOUT, reply_rx)
            .await
            .map_err(|_| BackendError::Ipc(format!("mpv IPC timeout for req={}", req_id)))?
            .map_err(|_| BackendError::Ipc(format!("mpv reply channel dropped req={}", req_id)))?
    }

    pub async fn load_stream(&self, url: &str) -> Result<(), BackendError> {
        self.send(json!(["loadfile", url])).await?;
        Ok(())
    }

    pub async fn set_pause(&self, paused: bool) -> Result<(), BackendError> {
        self.send(json!(["set_property", "pause", paused])).await?;
        Ok(())
    }

    pub async fn stop(&self) -> Result<(), BackendError> {
        self.send(json!(["stop"])).await?;
        Ok(())
    }

    /// `percent` in 0..=100.
    pub async fn set_volume(&self, percent: f32) -> Result<(), BackendError> {
        let vol_pct = percent.clamp(0.0, 100.0);
        self.send(json!(["set_property", "volume", vol_pct])).await?;
        Ok(())
    }

    pub async fn quit(&self) -> Result<(), BackendError> {
        self.send(json!(["quit"])).await?;
        Ok(())
    }
}

// ── socket file ───────────────────────────────────────────────────────────────

/// The IPC endpoint of one session.  On Unix the socket file is unlinked on
/// drop, whether the session was released or its open failed.
struct SocketFile {
    name: String,
}

impl SocketFile {
    fn new(name: String) -> Self {
        #[cfg(unix)]
        let _ = std::fs::remove_file(&name);
        Self { name }
    }
}

impl Drop for SocketFile {
    fn drop(&mut self) {
        // named pipes vanish with the process
        if !cfg!(unix) {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.name) {
            if e.kind() != std::io::ErrorKind::NotFound {
                debug!("mpv: remove socket {}: {}", self.name, e);
            }
        }
    }
}

// ── backend ───────────────────────────────────────────────────────────────────

/// Spawns a fresh mpv process for every `open`.
pub struct MpvBackend {
    binary: Option<PathBuf>,
    use_system_deps: bool,
    open_timeout: Duration,
}

impl MpvBackend {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            binary: config.mpv_binary.clone(),
            use_system_deps: config.use_system_deps,
            open_timeout: config.open_timeout(),
        }
    }

    async fn spawn_session(&self, url: &str) -> Result<MpvSession, BackendError> {
        let mpv_binary = platform::find_mpv_binary(self.binary.as_deref(), self.use_system_deps)
            .ok_or(BackendError::BinaryNotFound)?;

        let session_id = NEXT_SESSION.fetch_add(1, Ordering::Relaxed);
        let socket = SocketFile::new(platform::mpv_socket_name(session_id));

        info!("mpv: spawning session {} for {}", session_id, url);
        let child = tokio::process::Command::new(mpv_binary)
            .arg("--no-video")
            .arg("--idle=yes")
            .arg("--pause")
            .arg("--quiet")
            .arg(platform::mpv_socket_arg(&socket.name))
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let (event_tx, mut event_rx) = mpsc::channel::<MpvEvent>(64);
        let handle = connect(&socket.name, event_tx).await?;

        handle.load_stream(url).await?;
        wait_until_loaded(&mut event_rx).await?;
        info!("mpv: session {} loaded {}", session_id, url);

        let watched_url = url.to_string();
        let watcher = tokio::spawn(async move {
            while let Some(evt) = event_rx.recv().await {
                match evt.end_file_reason() {
                    Some("stop") => debug!("mpv: stopped {}", watched_url),
                    Some(reason) => warn!("mpv: stream {} ended ({})", watched_url, reason),
                    None => debug!("mpv event: {:?}", evt.raw),
                }
            }
        });

        Ok(MpvSession {
            session_id,
            socket,
            process: child,
            handle,
            watcher,
        })
    }
}

impl MediaBackend for MpvBackend {
    type Handle = MpvSession;

    async fn open(&mut self, url: &str) -> Result<MpvSession, BackendError> {
        // Dropping the in-flight future on timeout kills the child
        // (kill_on_drop) and unlinks its socket.
        match tokio::time::timeout(self.open_timeout, self.spawn_session(url)).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::OpenTimeout(self.open_timeout.as_secs())),
        }
    }
}

/// Wait for mpv to report the outcome of `loadfile`.
async fn wait_until_loaded(events: &mut mpsc::Receiver<MpvEvent>) -> Result<(), BackendError> {
    while let Some(evt) = events.recv().await {
        match evt.event_name() {
            Some("file-loaded") => return Ok(()),
            Some("end-file") if evt.is_open_failure() => {
                return Err(BackendError::Stream {
                    reason: evt.failure_reason(),
                });
            }
            _ => debug!("mpv: while loading: {:?}", evt.raw),
        }
    }
    Err(BackendError::Ipc("mpv connection closed while loading".into()))
}

// ── session (player handle) ───────────────────────────────────────────────────

pub struct MpvSession {
    session_id: u64,
    socket: SocketFile,
    process: tokio::process::Child,
    handle: MpvHandle,
    watcher: tokio::task::JoinHandle<()>,
}

impl PlayerHandle for MpvSession {
    async fn start(&mut self) -> Result<(), BackendError> {
        self.handle.set_pause(false).await
    }

    async fn pause(&mut self) -> Result<(), BackendError> {
        self.handle.set_pause(true).await
    }

    async fn stop(&mut self) -> Result<(), BackendError> {
        self.handle.stop().await
    }

    async fn set_volume(&mut self, left: f32, right: f32) -> Result<(), BackendError> {
        // mpv has a single master volume
        let gain = (left.clamp(0.0, 1.0) + right.clamp(0.0, 1.0)) / 2.0;
        self.handle.set_volume(gain * 100.0).await
    }

    async fn release(mut self) {
        debug!("mpv: releasing session {}", self.session_id);
        self.watcher.abort();
        if let Err(e) = self.handle.quit().await {
            debug!("mpv: quit session {}: {}", self.session_id, e);
        }
        if let Err(e) = self.process.kill().await {
            debug!("mpv: kill session {}: {}", self.session_id, e);
        }
        debug!("mpv: session {} closed ({})", self.session_id, self.socket.name);
    }
}

// ── connect ───────────────────────────────────────────────────────────────────

#[cfg(unix)]
async fn connect(
    socket_name: &str,
    event_tx: mpsc::Sender<MpvEvent>,
) -> Result<MpvHandle, BackendError> {
    let socket_path = PathBuf::from(socket_name);
    for _ in 0..50 {
        if socket_path.exists() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    if !socket_path.exists() {
        return Err(BackendError::SocketTimeout);
    }

    let stream = UnixStream::connect(&socket_path)
        .await
        .map_err(|e| BackendError::Ipc(format!("connect {}: {}", socket_name, e)))?;
    debug!("mpv: connected to IPC socket {}", socket_name);
    let (read_half, write_half) = stream.into_split();
    Ok(start_io_tasks(BufReader::new(read_half), write_half, event_tx))
}

#[cfg(windows)]
async fn connect(
    socket_name: &str,
    event_tx: mpsc::Sender<MpvEvent>,
) -> Result<MpvHandle, BackendError> {
    let pipe_path = format!(r"\\.\pipe\{}", socket_name);
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if let Ok(client) = ClientOptions::new().open(&pipe_path) {
            debug!("mpv: connected to named pipe {}", pipe_path);
            let (read_half, write_half) = tokio::io::split(client);
            return Ok(start_io_tasks(BufReader::new(read_half), write_half, event_tx));
        }
    }
    Err(BackendError::SocketTimeout)
}

fn start_io_tasks<R, W>(
    reader: BufReader<R>,
    writer: W,
    event_tx: mpsc::Sender<MpvEvent>,
) -> MpvHandle
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
    W: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    // req_id → reply channel.  Writer inserts, reader resolves.
    let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
    let (cmd_tx, cmd_rx) = mpsc::channel::<PendingRequest>(64);

    tokio::spawn(writer_task(writer, cmd_rx, pending.clone()));
    tokio::spawn(reader_task(reader, pending, event_tx));

    MpvHandle { tx: cmd_tx }
}

// ── reader task ───────────────────────────────────────────────────────────────

async fn reader_task<R>(
    mut reader: BufReader<R>,
    pending: PendingMap,
    event_tx: mpsc::Sender<MpvEvent>,
) where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!("mpv reader: connection closed");
                fail_all(&pending, "mpv IPC connection closed").await;
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let val: Value = match serde_json::from_str(trimmed) {
                    Ok(v) => v,
                    Err(e) => {
                        debug!("mpv reader: invalid json '{}': {}", trimmed, e);
                        continue;
                    }
                };

                if let Some(req_id) = val.get("request_id").and_then(|v| v.as_u64()) {
                    let mut map = pending.lock().await;
                    if let Some(tx) = map.remove(&req_id) {
                        let _ = tx.send(reply_result(val));
                    } else {
                        debug!("mpv reader: response for unknown req={}", req_id);
                    }
                } else {
                    // receiver gone just means nobody is watching events
                    let _ = event_tx.send(MpvEvent { raw: val }).await;
                }
            }
            Err(e) => {
                warn!("mpv reader: read error: {}", e);
                fail_all(&pending, &format!("mpv IPC read error: {}", e)).await;
                break;
            }
        }
    }
}

fn reply_result(val: Value) -> Result<Value, BackendError> {
    match val.get("error").and_then(|e| e.as_str()) {
        Some("success") => Ok(val),
        other => Err(BackendError::Ipc(format!(
            "mpv error: {}",
            other.unwrap_or("unknown error")
        ))),
    }
}

async fn fail_all(pending: &PendingMap, message: &str) {
    let mut map = pending.lock().await;
    for (_, tx) in map.drain() {
        let _ = tx.send(Err(BackendError::Ipc(message.to_string())));
    }
}

// ── writer task ───────────────────────────────────────────────────────────────

async fn writer_task<W>(mut writer: W, mut rx: mpsc::Receiver<PendingRequest>, pending: PendingMap)
where
    W: tokio::io::AsyncWrite + Unpin,
{
    while let Some(req) = rx.recv().await {
        // Register before writing so the reader can always match the reply
        pending.lock().await.insert(req.req_id, req.reply);
        debug!("mpv writer: send req={} payload={}", req.req_id, req.payload.trim());
        if let Err(e) = writer.write_all(req.payload.as_bytes()).await {
            warn!("mpv writer: write error: {}", e);
            if let Some(tx) = pending.lock().await.remove(&req.req_id) {
                let _ = tx.send(Err(BackendError::Ipc(format!("mpv write error: {}", e))));
            }
            break;
        }
    }
    debug!("mpv writer: task exiting");
}

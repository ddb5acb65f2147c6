//! Local file system server connector.
//!
//! Owns the OS watcher and the task that forwards its events to a sink.
//!
//! ```text
//! notify thread ──► FileSystemEvent ──► mpsc ──► dispatch task ──► EventSink
//! ```

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{ConnectorError, ConnectorResult};
use crate::event::{EventKind, FileSystemEvent, is_within};
use crate::params::WatchParams;

/// Receiver of events produced by a connector.
#[async_trait]
pub trait EventSink: Send + Sync + 'static {
    /// Called once per event, in the order the OS reported them.
    async fn on_event(&self, event: FileSystemEvent);
}

/// A running connector watching one directory.
pub struct ServerConnector {
    /// Connector identifier, for logs.
    id: String,

    /// Directory being watched.
    path: PathBuf,

    /// The OS watcher; `None` once stopped.
    watcher: Mutex<Option<RecommendedWatcher>>,

    /// Cancels the dispatch task.
    shutdown: CancellationToken,

    /// Whether the connector is running.
    running: AtomicBool,
}

impl ServerConnector {
    /// Create and start a connector from a watch parameter map.
    ///
    /// Must be called from within a tokio runtime; the dispatch task is
    /// spawned onto it.
    pub fn start(
        id: impl Into<String>,
        params: &HashMap<String, String>,
        sink: Arc<dyn EventSink>,
        channel_capacity: usize,
    ) -> ConnectorResult<Self> {
        let id = id.into();
        let params = WatchParams::from_map(params)?;
        let path = params.watch_path();
        let recursive = params.is_recursive()?;
        let kinds: BTreeSet<EventKind> = params.event_kinds()?.into_iter().collect();

        validate_directory(&path)?;

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ConnectorError::NoRuntime(e.to_string()))?;

        let (event_tx, event_rx) = mpsc::channel(channel_capacity.max(1));

        let canonical_root = path.canonicalize().unwrap_or_else(|_| path.clone());
        let root = path.clone();
        let watcher_id = id.clone();
        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    for file_event in FileSystemEvent::from_notify(&event) {
                        if !kinds.contains(&file_event.operation)
                            || !(is_within(&root, &file_event.path, recursive)
                                || is_within(&canonical_root, &file_event.path, recursive))
                        {
                            continue;
                        }

                        if event_tx.blocking_send(file_event).is_err() {
                            debug!("[{watcher_id}] dispatcher gone, dropping event");
                            return;
                        }
                    }
                }
                Err(e) => {
                    error!("[{watcher_id}] watch error: {e}");
                }
            },
        )?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(&path, mode)
            .map_err(|e| map_watch_error(&path, e))?;

        let shutdown = CancellationToken::new();
        runtime.spawn(dispatch(id.clone(), event_rx, sink, shutdown.clone()));

        info!(
            "[{id}] watching {} (events: {}, recursive: {recursive})",
            path.display(),
            params.events
        );

        Ok(Self {
            id,
            path,
            watcher: Mutex::new(Some(watcher)),
            shutdown,
            running: AtomicBool::new(true),
        })
    }

    /// Stop watching. Safe to call more than once.
    ///
    /// Returns without waiting for a handler that is currently running.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        // Dropping the watcher signals its thread without waiting on it;
        // `unwatch` would block while that thread is stuck on a full queue.
        drop(
            self.watcher
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        );

        self.shutdown.cancel();
        info!("[{}] stopped", self.id);
    }

    /// Whether the connector is still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Connector identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Directory being watched.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ServerConnector {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for ServerConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConnector")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("running", &self.is_running())
            .finish()
    }
}

async fn dispatch(
    id: String,
    mut event_rx: mpsc::Receiver<FileSystemEvent>,
    sink: Arc<dyn EventSink>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            next = event_rx.recv() => match next {
                Some(event) => sink.on_event(event).await,
                None => break,
            },
        }
    }
    debug!("[{id}] dispatch task finished");
}

fn validate_directory(path: &Path) -> ConnectorResult<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ConnectorError::NotADirectory(path.display().to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ConnectorError::DirectoryNotFound(path.display().to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(ConnectorError::PermissionDenied(path.display().to_string()))
        }
        Err(e) => Err(ConnectorError::Notify(notify::Error::io(e))),
    }
}

fn map_watch_error(path: &Path, err: notify::Error) -> ConnectorError {
    let permission_denied = matches!(
        &err.kind,
        notify::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::PermissionDenied
    );

    if permission_denied {
        ConnectorError::PermissionDenied(path.display().to_string())
    } else if matches!(err.kind, notify::ErrorKind::PathNotFound) {
        ConnectorError::DirectoryNotFound(path.display().to_string())
    } else {
        if matches!(err.kind, notify::ErrorKind::MaxFilesWatch) {
            warn!("Watch limit reached while adding {}", path.display());
        }
        ConnectorError::Notify(err)
    }
}

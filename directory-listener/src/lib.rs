//! # Directory Listener
//!
//! Binds user services to a watched directory. A service declares which of
//! the `on_create`, `on_delete` and `on_modify` resources it implements; the
//! listener watches the directory and calls the matching resource for every
//! file system event.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Directory Listener                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  DirectoryService ──► ResourceRegistry ──► WatchParams          │
//! │                              │                  │               │
//! │                              ▼                  ▼               │
//! │  ListenerHandle ◄── ServerConnector ──► ServiceDispatcher       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use codex_directory_listener::{DirectoryListener, DirectoryService, ListenerConfig, handler_fn};
//!
//! # async fn run() -> codex_directory_listener::Result<()> {
//! let service = DirectoryService::new("inbox").on_create(handler_fn(|event| async move {
//!     println!("created {}", event.path.display());
//!     Ok(())
//! }));
//!
//! let listener = DirectoryListener::new(ListenerConfig::new("/tmp/watch").recursive(true));
//! let handle = listener.register(service)?;
//! // ...
//! handle.stop();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connector;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod listener;
pub mod params;
pub mod registry;
pub mod service;

pub use config::ListenerConfig;
pub use connector::{EventSink, ServerConnector};
pub use dispatcher::ServiceDispatcher;
pub use error::{ConnectorError, ListenerError, Result};
pub use event::{EventKind, FileSystemEvent};
pub use listener::{DirectoryListener, ListenerHandle};
pub use params::WatchParams;
pub use registry::ResourceRegistry;
pub use service::{DirectoryService, EventHandler, ResourceSlot, handler_fn};

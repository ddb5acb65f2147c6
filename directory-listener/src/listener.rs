//! Directory listener: registers services against a watched directory.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{info, warn};

use crate::config::ListenerConfig;
use crate::connector::ServerConnector;
use crate::dispatcher::ServiceDispatcher;
use crate::error::{ListenerError, Result};
use crate::params::WatchParams;
use crate::registry::ResourceRegistry;
use crate::service::DirectoryService;

static NEXT_CONNECTOR: AtomicU64 = AtomicU64::new(1);

/// Listener bound to one directory configuration.
#[derive(Debug, Clone)]
pub struct DirectoryListener {
    config: ListenerConfig,
}

impl DirectoryListener {
    /// Create a listener for the given configuration.
    pub fn new(config: ListenerConfig) -> Self {
        Self { config }
    }

    /// Listener configuration.
    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Register a service and start watching.
    ///
    /// Validates the service's resources, builds the watch parameters and
    /// starts a connector dispatching to the service. Each call yields an
    /// independent handle; nothing is retained by the listener itself.
    pub fn register(&self, service: DirectoryService) -> Result<ListenerHandle> {
        let registry = ResourceRegistry::from_service(&service)?;
        let params = WatchParams::build(&self.config.path, self.config.recursive, registry.kinds());

        let id = format!(
            "{}-{}",
            service.name(),
            NEXT_CONNECTOR.fetch_add(1, Ordering::Relaxed)
        );
        let sink = Arc::new(ServiceDispatcher::new(service.name(), Arc::new(registry)));

        let connector = ServerConnector::start(
            id,
            &params.to_map(),
            sink,
            self.config.channel_capacity,
        )
        .map_err(|e| {
            warn!("Failed to register service {}: {e}", service.name());
            ListenerError::connector(e)
        })?;

        info!("Registered service {} as {}", service.name(), connector.id());
        Ok(ListenerHandle { connector, params })
    }
}

/// Caller-owned handle to a registered service.
///
/// Dropping the handle stops the watcher.
#[derive(Debug)]
pub struct ListenerHandle {
    connector: ServerConnector,
    params: WatchParams,
}

impl ListenerHandle {
    /// Stop watching. Idempotent; does not wait for running handlers.
    pub fn stop(&self) {
        self.connector.stop();
    }

    /// Whether the watcher is still running.
    pub fn is_running(&self) -> bool {
        self.connector.is_running()
    }

    /// Connector identifier.
    pub fn id(&self) -> &str {
        self.connector.id()
    }

    /// Parameters the watcher was started with.
    pub fn params(&self) -> &WatchParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::handler_fn;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn service() -> DirectoryService {
        DirectoryService::new("svc").on_create(handler_fn(|_ev| async { Ok(()) }))
    }

    #[tokio::test]
    async fn test_register_builds_params() {
        let temp_dir = TempDir::new().unwrap();
        let listener = DirectoryListener::new(ListenerConfig::new(temp_dir.path()).recursive(true));

        let handle = listener.register(service()).unwrap();
        assert_eq!(
            handle.params(),
            &WatchParams::build(temp_dir.path(), true, [crate::event::EventKind::Create])
        );
        assert!(handle.id().starts_with("svc-"));
        assert!(handle.is_running());
    }

    #[tokio::test]
    async fn test_register_empty_service_fails_before_watching() {
        let listener = DirectoryListener::new(ListenerConfig::new("/nonexistent/path/12345"));
        let err = listener
            .register(DirectoryService::new("empty"))
            .unwrap_err();

        assert!(matches!(err, ListenerError::Config(_)));
    }

    #[tokio::test]
    async fn test_register_missing_path_is_system_error() {
        let listener = DirectoryListener::new(ListenerConfig::new("/nonexistent/path/12345"));
        let err = listener.register(service()).unwrap_err();

        assert!(matches!(err, ListenerError::System(_)));
        let msg = err.to_string();
        assert!(msg.contains("Unable to initialize server connector"));
        assert!(msg.contains("directory not found: /nonexistent/path/12345"));
    }
}

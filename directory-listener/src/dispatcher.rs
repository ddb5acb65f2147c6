//! Routes connector events to the service resource bound to their kind.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::connector::EventSink;
use crate::event::FileSystemEvent;
use crate::registry::ResourceRegistry;

/// Event sink that invokes a service's resources.
pub struct ServiceDispatcher {
    service: String,
    registry: Arc<ResourceRegistry>,
}

impl ServiceDispatcher {
    pub fn new(service: impl Into<String>, registry: Arc<ResourceRegistry>) -> Self {
        Self {
            service: service.into(),
            registry,
        }
    }
}

#[async_trait]
impl EventSink for ServiceDispatcher {
    async fn on_event(&self, event: FileSystemEvent) {
        let kind = event.operation;
        let Some(handler) = self.registry.get(kind) else {
            debug!("[{}] no resource for {kind} event", self.service);
            return;
        };

        let path = event.path.clone();
        debug!("[{}] {kind} {}", self.service, path.display());

        // Handler errors are reported, never propagated back to the watcher.
        if let Err(e) = handler.handle(event).await {
            error!(
                "[{}] resource for {kind} failed on {}: {e:#}",
                self.service,
                path.display()
            );
        }
    }
}

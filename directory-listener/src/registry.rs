//! Mapping from event kinds to the resources that handle them.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{ListenerError, Result};
use crate::event::EventKind;
use crate::service::{DirectoryService, EventHandler};

/// Immutable kind→handler mapping built from a service.
#[derive(Clone)]
pub struct ResourceRegistry {
    handlers: BTreeMap<EventKind, Arc<dyn EventHandler>>,
}

impl ResourceRegistry {
    /// Build the registry from the resources a service implements.
    ///
    /// Fails if the service binds none of `on_create`, `on_delete` or
    /// `on_modify`. A slot bound more than once keeps its last handler.
    pub fn from_service(service: &DirectoryService) -> Result<Self> {
        let mut handlers = BTreeMap::new();
        for (slot, handler) in service.resources() {
            if handlers.insert(slot.event_kind(), handler.clone()).is_some() {
                debug!("Resource {slot} rebound on service {}", service.name());
            }
        }

        if handlers.is_empty() {
            return Err(ListenerError::no_resources());
        }

        Ok(Self { handlers })
    }

    /// Handler for an event kind, if the service subscribed to it.
    pub fn get(&self, kind: EventKind) -> Option<&Arc<dyn EventHandler>> {
        self.handlers.get(&kind)
    }

    /// Subscribed kinds, in canonical order.
    pub fn kinds(&self) -> impl Iterator<Item = EventKind> + '_ {
        self.handlers.keys().copied()
    }

    /// Number of bound kinds.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no kinds are bound.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.kinds()).finish()
    }
}

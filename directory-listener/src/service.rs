//! Services and the resources they expose.
//!
//! A [`DirectoryService`] is an explicit capability set: each resource it
//! binds is tagged with a [`ResourceSlot`], and the slot decides which event
//! kind the resource receives.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::event::{EventKind, FileSystemEvent};

/// A callable resource that reacts to file system events.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle a single event.
    async fn handle(&self, event: FileSystemEvent) -> anyhow::Result<()>;
}

/// Adapter turning an async closure into an [`EventHandler`].
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(FileSystemEvent) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn handle(&self, event: FileSystemEvent) -> anyhow::Result<()> {
        (self.0)(event).await
    }
}

/// Wrap an async closure as a shareable handler.
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn EventHandler>
where
    F: Fn(FileSystemEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// The fixed set of resources a service may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceSlot {
    OnCreate,
    OnDelete,
    OnModify,
}

impl ResourceSlot {
    /// Every slot, in canonical order.
    pub const ALL: [ResourceSlot; 3] = [Self::OnCreate, Self::OnDelete, Self::OnModify];

    /// Identifier of the slot.
    pub fn name(self) -> &'static str {
        match self {
            Self::OnCreate => "on_create",
            Self::OnDelete => "on_delete",
            Self::OnModify => "on_modify",
        }
    }

    /// The event kind delivered to this slot.
    pub fn event_kind(self) -> EventKind {
        match self {
            Self::OnCreate => EventKind::Create,
            Self::OnDelete => EventKind::Delete,
            Self::OnModify => EventKind::Modify,
        }
    }
}

impl fmt::Display for ResourceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.name() == s)
            .ok_or_else(|| format!("unknown resource: {s}"))
    }
}

/// A user service: a name plus the resources it implements.
#[derive(Clone)]
pub struct DirectoryService {
    name: String,
    resources: Vec<(ResourceSlot, Arc<dyn EventHandler>)>,
}

impl DirectoryService {
    /// Create a service with no resources.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: Vec::new(),
        }
    }

    /// Bind a handler to a slot.
    pub fn with_slot(mut self, slot: ResourceSlot, handler: Arc<dyn EventHandler>) -> Self {
        self.resources.push((slot, handler));
        self
    }

    /// Bind a handler to `on_create`.
    pub fn on_create(self, handler: Arc<dyn EventHandler>) -> Self {
        self.with_slot(ResourceSlot::OnCreate, handler)
    }

    /// Bind a handler to `on_delete`.
    pub fn on_delete(self, handler: Arc<dyn EventHandler>) -> Self {
        self.with_slot(ResourceSlot::OnDelete, handler)
    }

    /// Bind a handler to `on_modify`.
    pub fn on_modify(self, handler: Arc<dyn EventHandler>) -> Self {
        self.with_slot(ResourceSlot::OnModify, handler)
    }

    /// Bind a handler by resource name.
    ///
    /// Names that are not a known slot are skipped.
    pub fn resource(self, name: &str, handler: Arc<dyn EventHandler>) -> Self {
        match name.parse::<ResourceSlot>() {
            Ok(slot) => self.with_slot(slot, handler),
            Err(e) => {
                warn!("Ignoring resource on service {}: {e}", self.name);
                self
            }
        }
    }

    /// Service name, used to identify its connector.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resources in the order they were bound.
    pub fn resources(&self) -> impl Iterator<Item = (ResourceSlot, &Arc<dyn EventHandler>)> {
        self.resources.iter().map(|(slot, h)| (*slot, h))
    }
}

impl fmt::Debug for DirectoryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots: Vec<ResourceSlot> = self.resources.iter().map(|(s, _)| *s).collect();
        f.debug_struct("DirectoryService")
            .field("name", &self.name)
            .field("resources", &slots)
            .finish()
    }
}

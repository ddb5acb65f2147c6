//! File system events delivered to services.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use notify::event::{ModifyKind, RenameMode};
use serde::{Deserialize, Serialize};

/// Logical kind of a file system event.
///
/// Declaration order is the order event names appear in watch parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A file or directory was created.
    Create,

    /// A file or directory was deleted.
    Delete,

    /// A file or directory was modified.
    Modify,
}

impl EventKind {
    /// Every event kind, in canonical order.
    pub const ALL: [EventKind; 3] = [Self::Create, Self::Delete, Self::Modify];

    /// The event name used in watch parameters.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Modify => "modify",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "delete" => Ok(Self::Delete),
            "modify" => Ok(Self::Modify),
            other => Err(format!("unknown event kind: {other}")),
        }
    }
}

/// A file system event handed to a service resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemEvent {
    /// Absolute path of the affected file or directory.
    pub path: PathBuf,

    /// What happened to it.
    pub operation: EventKind,

    /// When the event was observed.
    pub timestamp: DateTime<Utc>,
}

impl FileSystemEvent {
    /// Create a new event stamped with the current time.
    pub fn new(operation: EventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            operation,
            timestamp: Utc::now(),
        }
    }

    /// Translate a raw notify event into zero or more logical events.
    ///
    /// A rename becomes a delete of the old path and a create of the new
    /// one. Backends that report both halves and a combined `Both` event
    /// (inotify) are only counted once: the halves are used and `Both` is
    /// dropped. Renames of unknown direction are resolved by whether the
    /// path still exists. Access notifications and unclassified events are
    /// dropped.
    pub fn from_notify(event: &notify::Event) -> Vec<Self> {
        use notify::EventKind as Raw;

        let single = |kind: EventKind| -> Vec<Self> {
            event.paths.iter().map(|p| Self::new(kind, p)).collect()
        };

        match event.kind {
            Raw::Create(_) => single(EventKind::Create),
            Raw::Remove(_) => single(EventKind::Delete),
            Raw::Modify(ModifyKind::Name(RenameMode::From)) => single(EventKind::Delete),
            Raw::Modify(ModifyKind::Name(RenameMode::To)) => single(EventKind::Create),
            Raw::Modify(ModifyKind::Name(RenameMode::Both)) => Vec::new(),
            Raw::Modify(ModifyKind::Name(_)) => event
                .paths
                .iter()
                .map(|p| Self::new(rename_direction(p), p))
                .collect(),
            Raw::Modify(_) => single(EventKind::Modify),
            Raw::Access(_) | Raw::Any | Raw::Other => Vec::new(),
        }
    }
}

fn rename_direction(path: &Path) -> EventKind {
    if path.exists() {
        EventKind::Create
    } else {
        EventKind::Delete
    }
}

/// Whether `path` lies under `root`, either directly or (when `recursive`)
/// at any depth.
pub(crate) fn is_within(root: &Path, path: &Path, recursive: bool) -> bool {
    if recursive {
        path.starts_with(root)
    } else {
        path.parent() == Some(root) || path == root
    }
}

//! Error types for the directory listener.

use thiserror::Error;

use crate::service::ResourceSlot;

/// Result type alias for listener operations.
pub type Result<T> = std::result::Result<T, ListenerError>;

/// Errors surfaced to callers registering a service.
#[derive(Error, Debug)]
pub enum ListenerError {
    /// The service is not usable as given (e.g. no resources bound).
    #[error("configuration error: {0}")]
    Config(String),

    /// The underlying connector could not be created or started.
    #[error("file system error: {0}")]
    System(String),

    /// Listener configuration could not be parsed.
    #[error("invalid listener configuration: {0}")]
    InvalidConfig(#[from] toml::de::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ListenerError {
    /// Error for a service that binds none of the known resources.
    pub(crate) fn no_resources() -> Self {
        let names: Vec<&str> = ResourceSlot::ALL.into_iter().map(ResourceSlot::name).collect();
        Self::Config(format!(
            "At least a single resource required from following: {}. \
             Parameter should be of type - file:FileEvent",
            names.join(", ")
        ))
    }

    /// Wrap a connector failure.
    pub(crate) fn connector(err: ConnectorError) -> Self {
        Self::System(format!("Unable to initialize server connector: {err}"))
    }
}

/// Result type alias for connector operations.
pub type ConnectorResult<T> = std::result::Result<T, ConnectorError>;

/// Errors raised while creating or running a file system connector.
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// Directory not found.
    #[error("directory not found: {0}")]
    DirectoryNotFound(String),

    /// Path exists but is not a directory.
    #[error("path is not a directory: {0}")]
    NotADirectory(String),

    /// Permission denied.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// A watch parameter is missing or malformed.
    #[error("invalid watch parameter `{key}`: {reason}")]
    InvalidParam { key: String, reason: String },

    /// Connectors spawn their dispatcher onto the current tokio runtime.
    #[error("no tokio runtime available: {0}")]
    NoRuntime(String),

    /// Notify error.
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_resources_names_every_slot() {
        let msg = ListenerError::no_resources().to_string();
        assert!(msg.starts_with("configuration error: "));
        for slot in ["on_create", "on_delete", "on_modify"] {
            assert!(msg.contains(slot), "missing {slot} in {msg}");
        }
    }

    #[test]
    fn test_connector_error_is_wrapped() {
        let err = ListenerError::connector(ConnectorError::DirectoryNotFound("/nope".to_string()));
        assert_eq!(
            err.to_string(),
            "file system error: Unable to initialize server connector: directory not found: /nope"
        );
    }
}

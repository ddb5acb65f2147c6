//! Watch parameters handed to a connector as a string map.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{ConnectorError, ConnectorResult};
use crate::event::EventKind;

/// Key holding the directory to watch.
pub const PARAM_PATH: &str = "path";

/// Key holding the comma-joined event names.
pub const PARAM_EVENTS: &str = "events";

/// Key holding the recursive flag as text.
pub const PARAM_RECURSIVE: &str = "recursive";

/// The option set a connector is configured with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchParams {
    pub path: String,
    pub events: String,
    pub recursive: String,
}

impl WatchParams {
    /// Build parameters from a path, a recursive flag and subscribed kinds.
    pub fn build(
        path: &std::path::Path,
        recursive: bool,
        kinds: impl IntoIterator<Item = EventKind>,
    ) -> Self {
        let mut kinds: Vec<EventKind> = kinds.into_iter().collect();
        kinds.sort();
        kinds.dedup();

        Self {
            path: path.to_string_lossy().into_owned(),
            events: kinds
                .into_iter()
                .map(EventKind::as_str)
                .collect::<Vec<_>>()
                .join(","),
            recursive: recursive.to_string(),
        }
    }

    /// The parameters as a string map.
    pub fn to_map(&self) -> HashMap<String, String> {
        HashMap::from([
            (PARAM_PATH.to_string(), self.path.clone()),
            (PARAM_EVENTS.to_string(), self.events.clone()),
            (PARAM_RECURSIVE.to_string(), self.recursive.clone()),
        ])
    }

    /// Read parameters back from a string map.
    pub fn from_map(map: &HashMap<String, String>) -> ConnectorResult<Self> {
        let get = |key: &str| {
            map.get(key)
                .cloned()
                .ok_or_else(|| ConnectorError::InvalidParam {
                    key: key.to_string(),
                    reason: "missing".to_string(),
                })
        };

        Ok(Self {
            path: get(PARAM_PATH)?,
            events: get(PARAM_EVENTS)?,
            recursive: get(PARAM_RECURSIVE)?,
        })
    }

    /// Watched directory.
    pub fn watch_path(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }

    /// Parsed recursive flag.
    pub fn is_recursive(&self) -> ConnectorResult<bool> {
        self.recursive
            .parse()
            .map_err(|_| ConnectorError::InvalidParam {
                key: PARAM_RECURSIVE.to_string(),
                reason: format!("expected true or false, got {:?}", self.recursive),
            })
    }

    /// Parsed event kinds. At least one is required.
    pub fn event_kinds(&self) -> ConnectorResult<Vec<EventKind>> {
        let kinds = self
            .events
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse().map_err(|reason| ConnectorError::InvalidParam {
                    key: PARAM_EVENTS.to_string(),
                    reason,
                })
            })
            .collect::<ConnectorResult<Vec<EventKind>>>()?;

        if kinds.is_empty() {
            return Err(ConnectorError::InvalidParam {
                key: PARAM_EVENTS.to_string(),
                reason: "no events".to_string(),
            });
        }

        Ok(kinds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn test_build_single_event() {
        let params = WatchParams::build(Path::new("/tmp/watch"), true, [EventKind::Create]);

        assert_eq!(
            params.to_map(),
            HashMap::from([
                ("path".to_string(), "/tmp/watch".to_string()),
                ("events".to_string(), "create".to_string()),
                ("recursive".to_string(), "true".to_string()),
            ])
        );
    }

    #[test]
    fn test_build_orders_and_dedups_events() {
        let params = WatchParams::build(
            Path::new("/w"),
            false,
            [EventKind::Modify, EventKind::Create, EventKind::Modify],
        );
        assert_eq!(params.events, "create,modify");
        assert_eq!(params.recursive, "false");
    }

    #[test]
    fn test_parse_back_from_map() {
        let params = WatchParams::build(Path::new("/w"), true, EventKind::ALL);
        let parsed = WatchParams::from_map(&params.to_map()).unwrap();

        assert_eq!(parsed.watch_path(), PathBuf::from("/w"));
        assert!(parsed.is_recursive().unwrap());
        assert_eq!(parsed.event_kinds().unwrap(), EventKind::ALL.to_vec());
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let mut map = WatchParams::build(Path::new("/w"), true, [EventKind::Delete]).to_map();
        map.remove(PARAM_EVENTS);

        let err = WatchParams::from_map(&map).unwrap_err();
        assert!(err.to_string().contains("events"));
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        let params = WatchParams {
            path: "/w".to_string(),
            events: "create,rename".to_string(),
            recursive: "yes".to_string(),
        };
        assert!(params.is_recursive().is_err());
        assert!(params.event_kinds().is_err());

        let empty = WatchParams {
            events: String::new(),
            ..params
        };
        assert!(empty.event_kinds().is_err());
    }
}

//! Error types for the runtime.

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the runtime.
///
/// Only [`Error::MountNotFound`] is fatal. Everything else is confined to the
/// job or effect that produced it and logged at the queue boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// The mount element named by [`Page::id`](crate::Page::id) does not exist.
    #[error("could not find element with id '{0}'")]
    MountNotFound(String),
    /// An effect tag has no handler.
    #[error("unknown effect type '{0}'")]
    UnknownEffect(String),
    /// The effect kind cannot be used to capture a value.
    #[error("effect '{0}' cannot be used as a value capture")]
    NotCapturable(&'static str),
    /// JSON parsing, stringifying or message decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// A job panicked while running.
    #[error("job '{0}' panicked")]
    JobPanicked(String),
    /// The controller owning a job was dropped before the job ran.
    #[error("runtime was dropped")]
    RuntimeDropped,
}

/// Failures reported by a [`Storage`](crate::browser::Storage) adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum StorageError {
    #[error("storage quota exceeded")]
    QuotaExceeded,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_not_found_names_the_element() {
        let err = Error::MountNotFound("app".to_string());
        assert_eq!(err.to_string(), "could not find element with id 'app'");
    }

    #[test]
    fn json_errors_convert() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn storage_error_serializes_with_kind() {
        let value = serde_json::to_value(StorageError::QuotaExceeded).unwrap();
        assert_eq!(value, serde_json::json!({ "kind": "QuotaExceeded" }));
    }
}

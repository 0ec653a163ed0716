//! Error types shared by every loader operation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for the prepare/upload/clean passes and the query tooling.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Missing directory, permission denied, unreadable or unwritable file.
    #[error("filesystem error at '{}': {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed JSON, or a field with the wrong JSON type.
    #[error("parse error: {source}")]
    Parse {
        #[from]
        source: serde_json::Error,
    },

    /// A required source document attribute is absent.
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    /// Network or service failure while talking to a remote store or index.
    #[error("remote transfer failed for '{key}': {message}")]
    RemoteTransfer { key: String, message: String },

    /// Credentials could not be resolved or were rejected.
    #[error("credential error: {0}")]
    Credential(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// A pool worker panicked or was cancelled.
    #[error("worker failure: {0}")]
    Worker(String),
}

impl LoaderError {
    pub fn fs(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LoaderError::FileSystem {
            path: path.into(),
            source,
        }
    }

    pub fn remote(key: impl Into<String>, message: impl Into<String>) -> Self {
        LoaderError::RemoteTransfer {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// A single batch item that failed while the rest of its pass continued.
#[derive(Debug)]
pub struct FileFailure {
    pub file: String,
    pub error: LoaderError,
}

impl From<csv::Error> for LoaderError {
    fn from(err: csv::Error) -> Self {
        match err.into_kind() {
            csv::ErrorKind::Io(e) => LoaderError::fs("<csv>", e),
            other => LoaderError::Config(format!("CSV error: {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_message_names_the_field() {
        let err = LoaderError::MissingField { field: "uuid" };
        assert_eq!(err.to_string(), "missing required field 'uuid'");
    }

    #[test]
    fn filesystem_error_mentions_path() {
        let err = LoaderError::fs(
            "content/a.txt",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("content/a.txt"), "got: {msg}");
        assert!(msg.contains("denied"), "got: {msg}");
    }
}

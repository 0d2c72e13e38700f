//! Error types for relsync-sfera.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise talking to the tracker or reading its payload.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The login endpoint refused the configured credentials.
    #[error("tracker login rejected for user '{user}' (HTTP {status})")]
    Auth { user: String, status: u16 },

    /// Non-success HTTP status from a tracker endpoint.
    #[error("tracker {operation} failed with HTTP {status}: {body}")]
    Http {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// Connection, TLS or DNS failure.
    #[error("tracker {operation} request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: Box<ureq::Error>,
    },

    /// The response body was not the expected JSON shape.
    #[error("tracker {operation} returned malformed JSON: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A saved search payload could not be read.
    #[error("failed to read task payload at {path}: {source}")]
    Payload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A saved search payload was not valid JSON.
    #[error("task payload at {path} is not valid JSON: {source}")]
    PayloadJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The search matched nothing; syncing would only produce an empty table.
    #[error("tracker returned no tasks for release '{release}'")]
    EmptyRelease { release: String },
}

/// Map a `ureq` failure for `operation` onto [`TrackerError`].
pub(crate) fn request_err(operation: &'static str, err: ureq::Error) -> TrackerError {
    match err {
        ureq::Error::Status(status, response) => TrackerError::Http {
            operation,
            status,
            body: response.into_string().unwrap_or_default(),
        },
        other => TrackerError::Transport {
            operation,
            source: Box::new(other),
        },
    }
}

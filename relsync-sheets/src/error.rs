//! Error types for relsync-sheets.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while authenticating to or operating on a sheet.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// The service-account key file could not be read.
    #[error("failed to read service-account key at {path}: {source}")]
    Credentials {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The service-account key file is not the expected JSON.
    #[error("invalid service-account key at {path}: {source}")]
    CredentialsJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JWT signing or token exchange failed.
    #[error("Google authentication failed: {0}")]
    Auth(String),

    /// Non-success HTTP status from the Sheets API.
    #[error("Google API error during {operation} (HTTP {status}): {body}")]
    Http {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// Connection, TLS or DNS failure.
    #[error("Google API request for {operation} failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: Box<ureq::Error>,
    },

    /// The response body was not the expected JSON shape.
    #[error("Google API returned malformed JSON during {operation}: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// No spreadsheet id could be extracted from the configured URL.
    #[error("not a Google Sheets URL: {url}")]
    InvalidUrl { url: String },

    #[error("spreadsheet {id} not found; check the URL and sharing settings")]
    SpreadsheetNotFound { id: String },

    #[error("worksheet '{title}' not found; check the sheet name")]
    WorksheetNotFound { title: String },

    /// The sheet has no header row to align values against.
    #[error("worksheet '{title}' is empty")]
    EmptySheet { title: String },

    /// A cell reference that is not `<letters><row>`.
    #[error("invalid A1 cell reference '{reference}'")]
    InvalidRange { reference: String },
}

/// Map a `ureq` failure for `operation` onto [`SheetsError`].
pub(crate) fn request_err(operation: &'static str, err: ureq::Error) -> SheetsError {
    match err {
        ureq::Error::Status(status, response) => SheetsError::Http {
            operation,
            status,
            body: response.into_string().unwrap_or_default(),
        },
        other => SheetsError::Transport {
            operation,
            source: Box::new(other),
        },
    }
}

pub(crate) fn decode_err(operation: &'static str, source: std::io::Error) -> SheetsError {
    SheetsError::Decode { operation, source }
}

//! Error types for relsync-sync.

use std::fmt;

use thiserror::Error;

use relsync_sfera::TrackerError;
use relsync_sheets::SheetsError;

/// Which table a structural problem was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSide {
    Tracker,
    Sheet,
}

impl fmt::Display for TableSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSide::Tracker => write!(f, "tracker"),
            TableSide::Sheet => write!(f, "sheet"),
        }
    }
}

/// All errors that can abort a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Fetching or normalizing tracker tasks failed.
    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),

    /// A join column is absent. Distinct from an empty result.
    #[error("{side} table has no '{column}' column")]
    MissingColumn { side: TableSide, column: String },

    /// A sheet read or write failed.
    #[error("failed to {operation} on worksheet '{sheet}': {source}")]
    Sheet {
        operation: &'static str,
        sheet: String,
        #[source]
        source: SheetsError,
    },
}

/// Convenience constructor for [`SyncError::Sheet`].
pub(crate) fn sheet_err(operation: &'static str, sheet: &str, source: SheetsError) -> SyncError {
    SyncError::Sheet {
        operation,
        sheet: sheet.to_owned(),
        source,
    }
}

/// Convenience constructor for [`SyncError::MissingColumn`].
pub(crate) fn missing(side: TableSide, column: &str) -> SyncError {
    SyncError::MissingColumn {
        side,
        column: column.to_owned(),
    }
}

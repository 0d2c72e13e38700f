//! The seam between the sync procedures and a concrete spreadsheet.

use serde::Serialize;

use crate::error::SheetsError;

/// How the backend interprets written text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInputOption {
    /// Store strings verbatim.
    Raw,
    /// Parse dates and numbers as if typed by a user.
    UserEntered,
}

/// One `{range, values}` pair of a batched write. `range` is a cell in A1
/// notation local to the worksheet (`E5`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub range: String,
    pub values: Vec<Vec<String>>,
}

impl CellUpdate {
    pub fn single(range: String, value: impl Into<String>) -> Self {
        Self {
            range,
            values: vec![vec![value.into()]],
        }
    }
}

/// One worksheet: read everything, insert a row, batch-write cells.
pub trait SheetBackend {
    /// Worksheet title, used in log lines and errors.
    fn title(&self) -> &str;

    /// All rows, header first. Trailing empty rows and cells may be omitted.
    fn read_values(&self) -> Result<Vec<Vec<String>>, SheetsError>;

    /// Insert `values` as a new row at 1-based `index`, shifting the row
    /// currently there down. Text is written in user-entered mode.
    fn insert_row(&self, values: &[String], index: usize) -> Result<(), SheetsError>;

    /// Apply every update in one call.
    fn batch_update(
        &self,
        updates: &[CellUpdate],
        input: ValueInputOption,
    ) -> Result<(), SheetsError>;
}

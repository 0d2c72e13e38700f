//! Point-in-time view of a worksheet, keyed by its header row.

use std::collections::{BTreeMap, HashMap};

use relsync_core::RowMapping;

use crate::backend::SheetBackend;
use crate::error::SheetsError;

/// One data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    /// 1-based sheet row number (the header is row 1).
    pub position: usize,
    /// Header name → cell text. Short rows are padded with empty strings.
    pub cells: BTreeMap<String, String>,
}

impl SheetRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }
}

/// Header row plus every data row below it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetSnapshot {
    pub header: Vec<String>,
    pub rows: Vec<SheetRow>,
    /// Number of rows the backend returned, header included.
    pub total_rows: usize,
}

impl SheetSnapshot {
    /// Build from raw row values, header first.
    ///
    /// Blank header cells are ignored; a repeated header name keeps its
    /// leftmost column.
    pub fn from_values(values: Vec<Vec<String>>) -> Self {
        let total_rows = values.len();
        let mut iter = values.into_iter();
        let Some(header) = iter.next() else {
            return Self::default();
        };

        let mut columns: Vec<(usize, &str)> = Vec::new();
        for (idx, name) in header.iter().enumerate() {
            if name.is_empty() || columns.iter().any(|(_, seen)| *seen == name.as_str()) {
                continue;
            }
            columns.push((idx, name.as_str()));
        }

        let rows = iter
            .enumerate()
            .map(|(offset, values)| {
                let cells = columns
                    .iter()
                    .map(|(idx, name)| {
                        let value = values.get(*idx).cloned().unwrap_or_default();
                        ((*name).to_owned(), value)
                    })
                    .collect();
                SheetRow {
                    position: offset + 2,
                    cells,
                }
            })
            .collect();

        Self {
            header,
            rows,
            total_rows,
        }
    }

    /// Read the whole worksheet through `backend`.
    pub fn read<B: SheetBackend + ?Sized>(backend: &B) -> Result<Self, SheetsError> {
        let snapshot = Self::from_values(backend.read_values()?);
        tracing::debug!(
            sheet = backend.title(),
            rows = snapshot.rows.len(),
            "read worksheet snapshot"
        );
        Ok(snapshot)
    }

    /// `true` when there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Zero-based index of the first header cell named `column`.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.header.iter().position(|h| h == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// `value of column` → sheet row position, first occurrence wins.
    ///
    /// Rows with an empty key are skipped.
    pub fn position_index(&self, column: &str) -> HashMap<&str, usize> {
        let mut index = HashMap::new();
        for row in &self.rows {
            match row.get(column) {
                Some(key) if !key.is_empty() => {
                    index.entry(key).or_insert(row.position);
                }
                _ => {}
            }
        }
        index
    }

    /// 1-based row index a new row should be inserted at.
    ///
    /// New rows go in front of the last row so they inherit its formatting
    /// and validation; with only a header present they go directly below it.
    pub fn insert_position(&self) -> usize {
        self.total_rows.max(2)
    }

    /// Order `row` by the header: unknown keys are dropped, missing columns
    /// become empty strings.
    pub fn align(&self, row: &RowMapping) -> Vec<String> {
        self.header
            .iter()
            .map(|name| row.get(name).map(ToString::to_string).unwrap_or_default())
            .collect()
    }
}

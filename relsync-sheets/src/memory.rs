//! In-memory [`SheetBackend`].
//!
//! Mirrors what the Sheets API returns on read (trailing empty cells and rows
//! trimmed). Failures can be injected for reads, for batched updates, and for
//! inserts of rows carrying a given value.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use crate::a1;
use crate::backend::{CellUpdate, SheetBackend, ValueInputOption};
use crate::error::SheetsError;

#[derive(Debug, Default)]
pub struct MemorySheet {
    title: String,
    values: RefCell<Vec<Vec<String>>>,
    failing_values: RefCell<HashSet<String>>,
    fail_reads: Cell<bool>,
    fail_batches: Cell<bool>,
    insert_calls: Cell<usize>,
    batch_calls: Cell<usize>,
}

impl MemorySheet {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sheet pre-filled with `rows`, header first.
    pub fn with_rows<R, S>(title: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sheet = Self::new(title);
        *sheet.values.borrow_mut() = rows
            .into_iter()
            .map(|r| r.into_iter().map(Into::into).collect())
            .collect();
        sheet
    }

    /// Every later insert of a row containing `value` fails.
    pub fn fail_inserts_containing(&self, value: impl Into<String>) {
        self.failing_values.borrow_mut().insert(value.into());
    }

    /// Every later read fails.
    pub fn fail_reads(&self) {
        self.fail_reads.set(true);
    }

    /// Every later batched update fails without writing.
    pub fn fail_batch_updates(&self) {
        self.fail_batches.set(true);
    }

    /// Current contents, untrimmed.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.values.borrow().clone()
    }

    /// Cell text at zero-based `column` and 1-based `row`, if present.
    pub fn cell(&self, column: usize, row: usize) -> Option<String> {
        let values = self.values.borrow();
        values.get(row.checked_sub(1)?)?.get(column).cloned()
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.get()
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.get()
    }
}

impl SheetBackend for MemorySheet {
    fn title(&self) -> &str {
        &self.title
    }

    fn read_values(&self) -> Result<Vec<Vec<String>>, SheetsError> {
        if self.fail_reads.get() {
            return Err(injected("read values"));
        }
        let mut rows: Vec<Vec<String>> = self
            .values
            .borrow()
            .iter()
            .map(|row| {
                let keep = row.iter().rposition(|v| !v.is_empty()).map_or(0, |i| i + 1);
                row[..keep].to_vec()
            })
            .collect();
        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }
        Ok(rows)
    }

    fn insert_row(&self, values: &[String], index: usize) -> Result<(), SheetsError> {
        self.insert_calls.set(self.insert_calls.get() + 1);
        let failing = self.failing_values.borrow();
        if let Some(hit) = values.iter().find(|v| failing.contains(*v)) {
            return Err(SheetsError::Http {
                operation: "insert row",
                status: 500,
                body: format!("injected failure for '{hit}'"),
            });
        }
        if index == 0 {
            return Err(SheetsError::InvalidRange {
                reference: index.to_string(),
            });
        }

        let mut rows = self.values.borrow_mut();
        let at = (index - 1).min(rows.len());
        rows.insert(at, values.to_vec());
        Ok(())
    }

    fn batch_update(
        &self,
        updates: &[CellUpdate],
        _input: ValueInputOption,
    ) -> Result<(), SheetsError> {
        self.batch_calls.set(self.batch_calls.get() + 1);
        if self.fail_batches.get() {
            return Err(injected("batch update"));
        }
        let parsed = updates
            .iter()
            .map(|u| a1::parse_cell(&u.range).map(|cell| (cell, u)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = self.values.borrow_mut();
        for ((column, row), update) in parsed {
            for (dr, line) in update.values.iter().enumerate() {
                let target_row = row - 1 + dr;
                if rows.len() <= target_row {
                    rows.resize(target_row + 1, Vec::new());
                }
                for (dc, value) in line.iter().enumerate() {
                    let target_col = column + dc;
                    let cells = &mut rows[target_row];
                    if cells.len() <= target_col {
                        cells.resize(target_col + 1, String::new());
                    }
                    cells[target_col] = value.clone();
                }
            }
        }
        Ok(())
    }
}

fn injected(operation: &'static str) -> SheetsError {
    SheetsError::Http {
        operation,
        status: 503,
        body: "injected failure".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn read_trims_trailing_blanks() {
        let sheet = MemorySheet::with_rows(
            "S",
            vec![vec!["a", "b", ""], vec!["c", "", ""], vec!["", "", ""]],
        );
        let values = sheet.read_values().expect("read");
        assert_eq!(values, vec![strings(&["a", "b"]), strings(&["c"])]);
    }

    #[test]
    fn insert_shifts_rows_down() {
        let sheet = MemorySheet::with_rows("S", vec![vec!["h"], vec!["footer"]]);
        sheet.insert_row(&strings(&["new"]), 2).expect("insert");
        assert_eq!(
            sheet.rows(),
            vec![strings(&["h"]), strings(&["new"]), strings(&["footer"])]
        );
    }

    #[test]
    fn injected_failure_leaves_sheet_untouched() {
        let sheet = MemorySheet::with_rows("S", vec![vec!["h"]]);
        sheet.fail_inserts_containing("T-13");
        let err = sheet.insert_row(&strings(&["T-13"]), 2).unwrap_err();
        assert!(err.to_string().contains("T-13"));
        assert_eq!(sheet.rows().len(), 1);
        assert_eq!(sheet.insert_calls(), 1);
    }

    #[test]
    fn batch_update_writes_cells_and_grows() {
        let sheet = MemorySheet::with_rows("S", vec![vec!["h"]]);
        sheet
            .batch_update(
                &[
                    CellUpdate::single("B3".to_owned(), "x"),
                    CellUpdate::single("A1".to_owned(), "H"),
                ],
                ValueInputOption::Raw,
            )
            .expect("update");
        assert_eq!(sheet.cell(1, 3).as_deref(), Some("x"));
        assert_eq!(sheet.cell(0, 1).as_deref(), Some("H"));
        assert_eq!(sheet.batch_calls(), 1);
    }

    #[test]
    fn injected_read_and_batch_failures() {
        let sheet = MemorySheet::with_rows("S", vec![vec!["h"]]);
        sheet.fail_batch_updates();
        let err = sheet
            .batch_update(&[CellUpdate::single("A1".to_owned(), "x")], ValueInputOption::Raw)
            .unwrap_err();
        assert!(matches!(err, SheetsError::Http { status: 503, .. }), "got: {err}");
        assert_eq!(sheet.cell(0, 1).as_deref(), Some("h"));

        sheet.fail_reads();
        assert!(sheet.read_values().is_err());
    }

    #[test]
    fn batch_update_rejects_bad_range_before_writing() {
        let sheet = MemorySheet::with_rows("S", vec![vec!["h"]]);
        let err = sheet
            .batch_update(
                &[
                    CellUpdate::single("A1".to_owned(), "changed"),
                    CellUpdate::single("??".to_owned(), "x"),
                ],
                ValueInputOption::Raw,
            )
            .unwrap_err();
        assert!(matches!(err, SheetsError::InvalidRange { .. }));
        assert_eq!(sheet.cell(0, 1).as_deref(), Some("h"));
    }
}

//! Best-effort row appends with fixed pacing.
//!
//! Rows are inserted in front of the sheet's last row so that they pick up
//! its formatting and validation rules. A failing row is logged and recorded
//! in the [`AppendReport`]; the remaining rows are still attempted.

use std::time::Duration;

use relsync_core::{ColumnNames, Pacing, TaskId, TaskRecord};
use relsync_sheets::{SheetBackend, SheetSnapshot, SheetsError};

use crate::error::{sheet_err, SyncError};

/// Blocks between append batches.
pub trait Throttle {
    fn pause(&mut self);
}

/// [`Throttle`] that sleeps the current thread.
#[derive(Debug, Clone)]
pub struct SleepThrottle {
    delay: Duration,
}

impl SleepThrottle {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_pacing(pacing: &Pacing) -> Self {
        Self::new(Duration::from_secs(pacing.pause_secs))
    }
}

impl Throttle for SleepThrottle {
    fn pause(&mut self) {
        tracing::info!(secs = self.delay.as_secs(), "pausing to stay within the sheet write quota");
        std::thread::sleep(self.delay);
    }
}

/// One row that could not be inserted.
#[derive(Debug)]
pub struct AppendFailure {
    pub task_id: TaskId,
    pub error: SheetsError,
}

/// Outcome of [`append_rows`].
#[derive(Debug, Default)]
pub struct AppendReport {
    /// Rows an insert was issued for.
    pub attempted: usize,
    /// Rows the backend confirmed.
    pub written: usize,
    pub pauses: usize,
    pub failures: Vec<AppendFailure>,
}

/// Insert every row of `rows` into `sheet`.
///
/// The sheet is read once to learn its header and length. After every
/// `every` confirmed inserts, `throttle` pauses before the next row.
pub fn append_rows<B, T>(
    sheet: &B,
    rows: &[TaskRecord],
    columns: &ColumnNames,
    every: usize,
    throttle: &mut T,
) -> Result<AppendReport, SyncError>
where
    B: SheetBackend + ?Sized,
    T: Throttle + ?Sized,
{
    let mut report = AppendReport::default();
    if rows.is_empty() {
        tracing::info!(sheet = sheet.title(), "no rows to append");
        return Ok(report);
    }

    let snapshot =
        SheetSnapshot::read(sheet).map_err(|e| sheet_err("read rows before append", sheet.title(), e))?;
    if snapshot.header.is_empty() {
        return Err(sheet_err(
            "append rows",
            sheet.title(),
            SheetsError::EmptySheet {
                title: sheet.title().to_owned(),
            },
        ));
    }

    let mut position = snapshot.insert_position();
    for (idx, row) in rows.iter().enumerate() {
        let values = snapshot.align(&row.to_mapping(columns));
        report.attempted += 1;

        match sheet.insert_row(&values, position) {
            Ok(()) => {
                report.written += 1;
                tracing::info!(
                    task = %row.task_id,
                    position,
                    progress = %format!("{}/{}", idx + 1, rows.len()),
                    "inserted row"
                );
                position += 1;

                let more_rows = idx + 1 < rows.len();
                if every > 0 && report.written % every == 0 && more_rows {
                    throttle.pause();
                    report.pauses += 1;
                }
            }
            Err(error) => {
                tracing::warn!(task = %row.task_id, error = %error, "skipping row: insert failed");
                report.failures.push(AppendFailure {
                    task_id: row.task_id.clone(),
                    error,
                });
            }
        }
    }

    tracing::info!(
        attempted = report.attempted,
        written = report.written,
        failed = report.failures.len(),
        "append finished"
    );
    Ok(report)
}

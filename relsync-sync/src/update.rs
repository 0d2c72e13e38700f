//! Batched status/assignee rewrite.

use relsync_core::{ColumnNames, TaskId, TaskRecord};
use relsync_sheets::{a1, CellUpdate, SheetBackend, SheetSnapshot, ValueInputOption};

use crate::error::{missing, sheet_err, SyncError, TableSide};
use crate::reconcile::filter_active;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Records whose two cells were sent.
    pub updated: usize,
    /// Task ids with no active row in the sheet.
    pub missing: Vec<TaskId>,
}

/// Write the status and assignee of every record in `updates` to its row.
///
/// Rows are located through a task-id index built once from a fresh read,
/// restricted to rows of `release` whose status is not in `excluded`. A task
/// id repeated in a closed or foreign row is never written through that row.
/// All writes go out in a single batch.
pub fn update_statuses<B>(
    sheet: &B,
    updates: &[TaskRecord],
    release: &str,
    excluded: &[String],
    columns: &ColumnNames,
) -> Result<UpdateReport, SyncError>
where
    B: SheetBackend + ?Sized,
{
    let mut report = UpdateReport::default();
    if updates.is_empty() {
        tracing::info!(sheet = sheet.title(), "no statuses to update");
        return Ok(report);
    }

    let snapshot =
        SheetSnapshot::read(sheet).map_err(|e| sheet_err("read rows before update", sheet.title(), e))?;
    let column = |name: &str| {
        snapshot
            .column_index(name)
            .ok_or_else(|| missing(TableSide::Sheet, name))
    };
    column(&columns.task)?;
    let status_col = column(&columns.status)?;
    let assignee_col = column(&columns.assignee)?;

    let active = filter_active(&snapshot, release, excluded, columns)?;
    let positions = active.position_index(&columns.task);
    let mut cells = Vec::with_capacity(updates.len() * 2);
    for record in updates {
        let Some(&row) = positions.get(record.task_id.as_str()) else {
            tracing::warn!(task = %record.task_id, "skipping status update: task has no active row in sheet");
            report.missing.push(record.task_id.clone());
            continue;
        };
        tracing::debug!(task = %record.task_id, row, status = %record.status, "queued status update");
        cells.push(CellUpdate::single(a1::cell(status_col, row), record.status.as_str()));
        cells.push(CellUpdate::single(a1::cell(assignee_col, row), record.assignee.as_str()));
    }

    if cells.is_empty() {
        return Ok(report);
    }
    sheet
        .batch_update(&cells, ValueInputOption::Raw)
        .map_err(|e| sheet_err("batch update statuses", sheet.title(), e))?;

    report.updated = cells.len() / 2;
    tracing::info!(updated = report.updated, skipped = report.missing.len(), "statuses updated");
    Ok(report)
}

//! Set-difference and status-join between the tracker table and the sheet.
//!
//! Tracker rows are typed [`TaskRecord`]s; sheet rows are header-keyed
//! strings. Both are keyed by task id.

use std::collections::{HashMap, HashSet};

use relsync_core::{ColumnNames, TaskRecord};
use relsync_sheets::SheetSnapshot;

use crate::error::{missing, SyncError, TableSide};

fn require_tracker_column(column: &str) -> Result<(), SyncError> {
    if column.is_empty() {
        return Err(missing(TableSide::Tracker, column));
    }
    Ok(())
}

fn require_sheet_column(sheet: &SheetSnapshot, column: &str) -> Result<(), SyncError> {
    if !sheet.has_column(column) {
        return Err(missing(TableSide::Sheet, column));
    }
    Ok(())
}

/// Tracker rows whose task id is not anywhere in the sheet, in tracker order.
///
/// A sheet without data rows leaves every tracker row unique.
pub fn unique_tasks(
    tracker: &[TaskRecord],
    sheet: &SheetSnapshot,
    columns: &ColumnNames,
) -> Result<Vec<TaskRecord>, SyncError> {
    require_tracker_column(&columns.task)?;
    if sheet.is_empty() {
        return Ok(tracker.to_vec());
    }
    require_sheet_column(sheet, &columns.task)?;

    let present: HashSet<&str> = sheet
        .rows
        .iter()
        .filter_map(|row| row.get(&columns.task))
        .collect();

    Ok(tracker
        .iter()
        .filter(|r| !present.contains(r.task_id.as_str()))
        .cloned()
        .collect())
}

/// Sheet rows of `release` whose status is not in `excluded`.
///
/// The result keeps the sheet's header and row positions. A sheet without a
/// header yields an empty snapshot.
pub fn filter_active(
    sheet: &SheetSnapshot,
    release: &str,
    excluded: &[String],
    columns: &ColumnNames,
) -> Result<SheetSnapshot, SyncError> {
    if sheet.header.is_empty() {
        return Ok(SheetSnapshot::default());
    }
    require_sheet_column(sheet, &columns.release)?;
    require_sheet_column(sheet, &columns.status)?;

    let rows = sheet
        .rows
        .iter()
        .filter(|row| row.get(&columns.release) == Some(release))
        .filter(|row| {
            let status = row.get(&columns.status).unwrap_or_default();
            !excluded.iter().any(|e| e == status)
        })
        .cloned()
        .collect();

    Ok(SheetSnapshot {
        header: sheet.header.clone(),
        rows,
        total_rows: sheet.total_rows,
    })
}

/// Tracker rows whose status differs from the matching row of `active`.
///
/// Inner join on task id: tracker rows missing from `active` never appear.
/// The tracker row is returned whole since the tracker is authoritative.
pub fn changed_statuses(
    active: &SheetSnapshot,
    tracker: &[TaskRecord],
    columns: &ColumnNames,
) -> Result<Vec<TaskRecord>, SyncError> {
    require_tracker_column(&columns.task)?;
    require_tracker_column(&columns.status)?;
    if active.header.is_empty() {
        return Ok(Vec::new());
    }
    require_sheet_column(active, &columns.task)?;
    require_sheet_column(active, &columns.status)?;

    let tracker_status: HashMap<&str, &str> = tracker
        .iter()
        .map(|r| (r.task_id.as_str(), r.status.as_str()))
        .collect();

    let mut changed: HashSet<&str> = HashSet::new();
    for row in &active.rows {
        let Some(task) = row.get(&columns.task) else {
            continue;
        };
        let sheet_status = row.get(&columns.status).unwrap_or_default();
        if let Some(&status) = tracker_status.get(task) {
            if status != sheet_status {
                tracing::debug!(task, from = sheet_status, to = status, "status changed");
                changed.insert(task);
            }
        }
    }

    Ok(tracker
        .iter()
        .filter(|r| changed.contains(r.task_id.as_str()))
        .cloned()
        .collect())
}

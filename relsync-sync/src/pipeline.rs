//! One full sync pass.
//!
//! ```text
//! fetch → normalize → read sheet → unique → append
//!                               → filter active → changed → update
//! ```
//!
//! [`plan`] computes both sets from a single sheet read; [`apply`] performs
//! the writes. [`run`] chains fetch, plan and apply for callers that already
//! hold both backends.
//!
//! `plan` and `apply` are public so a caller can fetch tracker rows before
//! opening the sheet, and stop after `plan` for a dry run. The `relsync`
//! binary drives them that way, so an empty release fails before any
//! spreadsheet call.

use relsync_core::{Config, TaskRecord};
use relsync_sfera::{fetch_tracker_table, TaskSource};
use relsync_sheets::{SheetBackend, SheetSnapshot};

use crate::append::{append_rows, AppendReport, Throttle};
use crate::error::{sheet_err, SyncError};
use crate::reconcile::{changed_statuses, filter_active, unique_tasks};
use crate::update::{update_statuses, UpdateReport};

/// Which mutation phases to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    pub append: bool,
    pub update: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            append: true,
            update: true,
        }
    }
}

/// Rows a pass would write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    pub release: String,
    pub tracker_rows: usize,
    /// Tracker rows absent from the sheet.
    pub to_append: Vec<TaskRecord>,
    /// Tracker rows whose active sheet row carries a different status.
    pub to_update: Vec<TaskRecord>,
}

impl SyncPlan {
    pub fn is_noop(&self) -> bool {
        self.to_append.is_empty() && self.to_update.is_empty()
    }
}

#[derive(Debug)]
pub struct SyncReport {
    pub plan: SyncPlan,
    /// `None` when the append phase was disabled.
    pub appended: Option<AppendReport>,
    /// `None` when the update phase was disabled.
    pub updated: Option<UpdateReport>,
}

/// Diff `tracker` against the current contents of `sheet`.
pub fn plan<B>(
    config: &Config,
    release: &str,
    tracker: Vec<TaskRecord>,
    sheet: &B,
) -> Result<SyncPlan, SyncError>
where
    B: SheetBackend + ?Sized,
{
    let columns = &config.columns;
    let snapshot = SheetSnapshot::read(sheet).map_err(|e| sheet_err("read rows", sheet.title(), e))?;

    let to_append = unique_tasks(&tracker, &snapshot, columns)?;
    let active = filter_active(&snapshot, release, &config.excluded_statuses, columns)?;
    let to_update = changed_statuses(&active, &tracker, columns)?;

    tracing::info!(
        release,
        tracker = tracker.len(),
        sheet = snapshot.rows.len(),
        active = active.rows.len(),
        to_append = to_append.len(),
        to_update = to_update.len(),
        "computed sync plan"
    );

    Ok(SyncPlan {
        release: release.to_owned(),
        tracker_rows: tracker.len(),
        to_append,
        to_update,
    })
}

/// Perform the writes of `plan`: appends first, then status updates.
pub fn apply<B, T>(
    config: &Config,
    plan: SyncPlan,
    sheet: &B,
    throttle: &mut T,
    options: SyncOptions,
) -> Result<SyncReport, SyncError>
where
    B: SheetBackend + ?Sized,
    T: Throttle + ?Sized,
{
    let appended = if options.append {
        Some(append_rows(
            sheet,
            &plan.to_append,
            &config.columns,
            config.pacing.every,
            throttle,
        )?)
    } else {
        tracing::info!(skipped = plan.to_append.len(), "append phase disabled");
        None
    };

    let updated = if options.update {
        Some(update_statuses(
            sheet,
            &plan.to_update,
            &plan.release,
            &config.excluded_statuses,
            &config.columns,
        )?)
    } else {
        tracing::info!(skipped = plan.to_update.len(), "update phase disabled");
        None
    };

    Ok(SyncReport {
        plan,
        appended,
        updated,
    })
}

/// Fetch `release` from `source` and reconcile it into `sheet`.
pub fn run<S, B, T>(
    config: &Config,
    release: &str,
    source: &S,
    sheet: &B,
    throttle: &mut T,
    options: SyncOptions,
) -> Result<SyncReport, SyncError>
where
    S: TaskSource + ?Sized,
    B: SheetBackend + ?Sized,
    T: Throttle + ?Sized,
{
    let tracker = fetch_tracker_table(source, release, &config.rules)?;
    let plan = plan(config, release, tracker, sheet)?;
    apply(config, plan, sheet, throttle, options)
}

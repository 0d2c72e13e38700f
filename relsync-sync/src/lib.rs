//! # relsync-sync
//!
//! Reconciliation between the tracker table and the release sheet.
//!
//! [`pipeline::run`] performs one full pass: fetch and normalize tracker
//! tasks, read the sheet, append missing tasks, then rewrite status and
//! assignee for tasks whose status moved on. [`pipeline::plan`] alone
//! computes the same two sets without writing.

pub mod append;
pub mod error;
pub mod pipeline;
pub mod reconcile;
pub mod update;

pub use append::{append_rows, AppendFailure, AppendReport, SleepThrottle, Throttle};
pub use error::{SyncError, TableSide};
pub use pipeline::{SyncOptions, SyncPlan, SyncReport};
pub use reconcile::{changed_statuses, filter_active, unique_tasks};
pub use update::{update_statuses, UpdateReport};

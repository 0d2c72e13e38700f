//! # relsync-sfera
//!
//! Sfera tracker access and row normalization.
//!
//! [`SferaClient`] logs in once and searches tasks by release label; any
//! [`TaskSource`] feeds [`normalize::fetch_tracker_table`], which turns the
//! raw payload into [`relsync_core::TaskRecord`]s.

pub mod client;
pub mod error;
pub mod model;
pub mod normalize;

pub use client::{SavedSearch, SferaClient, TaskSource};
pub use error::TrackerError;
pub use model::{RawTask, SearchPage};
pub use normalize::{fetch_tracker_table, normalize_page, normalize_task};

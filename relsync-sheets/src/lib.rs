//! # relsync-sheets
//!
//! Spreadsheet access behind the [`SheetBackend`] trait.
//!
//! [`GoogleSheets`] is the authenticated session (built once per run);
//! [`Worksheet`] borrows it and implements [`SheetBackend`] for one tab.
//! [`MemorySheet`] implements the same trait in memory.

pub mod a1;
pub mod auth;
pub mod backend;
pub mod client;
pub mod error;
pub mod memory;
pub mod snapshot;

pub use backend::{CellUpdate, SheetBackend, ValueInputOption};
pub use client::{GoogleSheets, Worksheet};
pub use error::SheetsError;
pub use memory::MemorySheet;
pub use snapshot::{SheetRow, SheetSnapshot};

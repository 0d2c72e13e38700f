//! relsync core library: domain types, configuration, errors.
//!
//! - [`types`]: task rows, cell values, column naming
//! - [`config`]: YAML configuration load / init
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, GoogleConfig, Pacing, RowRules, SferaConfig};
pub use error::ConfigError;
pub use types::{CellValue, ColumnNames, RowMapping, TaskId, TaskRecord, DATE_CELL_FORMAT};

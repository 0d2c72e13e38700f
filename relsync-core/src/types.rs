//! Domain types shared by the tracker, sheet and sync crates.
//!
//! A [`TaskRecord`] is the normalized, fixed-column shape of one tracker task.
//! It is converted into a [`RowMapping`] keyed by the configured sheet header
//! names before it is written anywhere.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// `strftime` pattern used for every date bound for a spreadsheet cell.
pub const DATE_CELL_FORMAT: &str = "%m/%d/%Y";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Tracker task number (e.g. `"ATM-1042"`). The natural join key between the
/// tracker and the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Cell values
// ---------------------------------------------------------------------------

/// A single value headed for a spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Integer(i64),
    Date(NaiveDate),
}

impl CellValue {
    /// Parse a tracker timestamp such as `2025-04-06T10:00:00.000+0300`.
    ///
    /// Everything from the first `T` onwards is dropped. A date portion that
    /// is not ISO `YYYY-MM-DD` is kept as plain text.
    pub fn from_date_portion(raw: &str) -> Self {
        let date_part = raw.split('T').next().unwrap_or_default().trim();
        if date_part.is_empty() {
            return CellValue::Empty;
        }
        match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            Ok(date) => CellValue::Date(date),
            Err(_) => CellValue::Text(date_part.to_owned()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Integer(_) | CellValue::Date(_) => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Integer(n) => write!(f, "{n}"),
            CellValue::Date(d) => write!(f, "{}", d.format(DATE_CELL_FORMAT)),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<Option<NaiveDate>> for CellValue {
    fn from(d: Option<NaiveDate>) -> Self {
        d.map_or(CellValue::Empty, CellValue::Date)
    }
}

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Sheet header names for every column relsync knows about.
///
/// Defaults match the release-tracking sheet the tool was built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub release: String,
    pub task: String,
    pub name: String,
    pub component: String,
    pub status: String,
    pub priority: String,
    pub estimation: String,
    pub planned_start: String,
    pub planned_end: String,
    pub due_date: String,
    pub assignee: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            release: "Релиз".to_owned(),
            task: "Задача".to_owned(),
            name: "Название".to_owned(),
            component: "Компонента".to_owned(),
            status: "Статус".to_owned(),
            priority: "Приоритет".to_owned(),
            estimation: "Оценка".to_owned(),
            planned_start: "Начало".to_owned(),
            planned_end: "Окончание".to_owned(),
            due_date: "Дата тестирования".to_owned(),
            assignee: "Исполнитель".to_owned(),
        }
    }
}

impl ColumnNames {
    /// Header names in canonical row order.
    pub fn ordered(&self) -> [&str; 11] {
        [
            &self.release,
            &self.task,
            &self.name,
            &self.component,
            &self.status,
            &self.priority,
            &self.estimation,
            &self.planned_start,
            &self.planned_end,
            &self.due_date,
            &self.assignee,
        ]
    }
}

// ---------------------------------------------------------------------------
// Task record
// ---------------------------------------------------------------------------

/// Header name → cell value for one row.
pub type RowMapping = BTreeMap<String, CellValue>;

/// One normalized tracker task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub release: String,
    pub task_id: TaskId,
    pub name: String,
    pub component: String,
    pub status: String,
    pub priority: Option<i64>,
    /// The tracker carries no estimate; kept so the column is written empty.
    pub estimation: String,
    pub planned_start: CellValue,
    pub planned_end: CellValue,
    pub due_date: CellValue,
    pub assignee: String,
}

impl TaskRecord {
    /// Key every field by its configured header name.
    pub fn to_mapping(&self, columns: &ColumnNames) -> RowMapping {
        let mut row = RowMapping::new();
        row.insert(columns.release.clone(), self.release.as_str().into());
        row.insert(columns.task.clone(), self.task_id.as_str().into());
        row.insert(columns.name.clone(), self.name.as_str().into());
        row.insert(columns.component.clone(), self.component.as_str().into());
        row.insert(columns.status.clone(), self.status.as_str().into());
        row.insert(
            columns.priority.clone(),
            self.priority.map_or(CellValue::Empty, CellValue::Integer),
        );
        row.insert(columns.estimation.clone(), self.estimation.as_str().into());
        row.insert(columns.planned_start.clone(), self.planned_start.clone());
        row.insert(columns.planned_end.clone(), self.planned_end.clone());
        row.insert(columns.due_date.clone(), self.due_date.clone());
        row.insert(columns.assignee.clone(), self.assignee.as_str().into());
        row
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

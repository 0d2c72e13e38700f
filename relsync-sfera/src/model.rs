//! Raw Sfera search payload.
//!
//! Only the attributes relsync reads are modelled; unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// Attribute projection requested from the search endpoint.
pub const ATTRIBUTES: &str = "checkbox,number,name,actualSprint,priority,status,assignee,owner,\
dueDate,label,parentNumber,component,gantStartDate,gantEndDate";

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub content: Vec<RawTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_elements: Option<u64>,
}

/// A task exactly as the tracker returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTask {
    pub number: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub component: Option<Vec<NamedRef>>,
    #[serde(default)]
    pub priority_id: Option<i64>,
    #[serde(default)]
    pub assignee: Option<Person>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub gant_start_date: Option<Vec<String>>,
    #[serde(default)]
    pub gant_end_date: Option<Vec<String>>,
    /// Tracker-side status. Never written; the assignee mapping decides.
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default)]
    pub first_name: String,
}

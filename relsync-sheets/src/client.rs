//! Google Sheets v4 REST session.
//!
//! One [`GoogleSheets`] is built per run and passed by reference; each
//! [`Worksheet`] borrows it for the operations on a single tab.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::a1;
use crate::auth::{self, ServiceAccountKey};
use crate::backend::{CellUpdate, SheetBackend, ValueInputOption};
use crate::error::{decode_err, request_err, SheetsError};

const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Extract the spreadsheet id from a `https://docs.google.com/spreadsheets/d/<id>/…` URL.
pub fn spreadsheet_id_from_url(url: &str) -> Result<String, SheetsError> {
    const MARKER: &str = "/spreadsheets/d/";
    let invalid = || SheetsError::InvalidUrl {
        url: url.to_owned(),
    };
    let start = url.find(MARKER).ok_or_else(invalid)? + MARKER.len();
    let id: String = url[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if id.is_empty() {
        return Err(invalid());
    }
    Ok(id)
}

/// Authenticated session for one spreadsheet.
pub struct GoogleSheets {
    agent: ureq::Agent,
    token: String,
    spreadsheet_id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchGetResponse {
    #[serde(default)]
    value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl GoogleSheets {
    /// Authenticate with the service-account key at `credentials_path`.
    pub fn connect(credentials_path: &Path, spreadsheet_url: &str) -> Result<Self, SheetsError> {
        let spreadsheet_id = spreadsheet_id_from_url(spreadsheet_url)?;
        let key = ServiceAccountKey::load(credentials_path)?;
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(60))
            .build();
        let token = auth::fetch_access_token(&agent, &key)?;
        Ok(Self {
            agent,
            token,
            spreadsheet_id,
        })
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// Open the tab titled `title`.
    pub fn worksheet(&self, title: &str) -> Result<Worksheet<'_>, SheetsError> {
        let url = format!("{API_BASE}/{}", self.spreadsheet_id);
        let response = self
            .authorized(self.agent.get(&url))
            .query("fields", "sheets.properties(sheetId,title)")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(404, _) => SheetsError::SpreadsheetNotFound {
                    id: self.spreadsheet_id.clone(),
                },
                other => request_err("open spreadsheet", other),
            })?;
        let meta: SpreadsheetMeta = response
            .into_json()
            .map_err(|e| decode_err("open spreadsheet", e))?;

        let sheet = meta
            .sheets
            .into_iter()
            .find(|s| s.properties.title == title)
            .ok_or_else(|| SheetsError::WorksheetNotFound {
                title: title.to_owned(),
            })?;
        tracing::debug!(title, sheet_id = sheet.properties.sheet_id, "opened worksheet");

        Ok(Worksheet {
            session: self,
            title: sheet.properties.title,
            sheet_id: sheet.properties.sheet_id,
        })
    }

    fn authorized(&self, request: ureq::Request) -> ureq::Request {
        request.set("Authorization", &format!("Bearer {}", self.token))
    }

    fn post_json(&self, url: &str, body: Value, operation: &'static str) -> Result<(), SheetsError> {
        self.authorized(self.agent.post(url))
            .send_json(body)
            .map_err(|e| request_err(operation, e))?;
        Ok(())
    }
}

/// One tab of a [`GoogleSheets`] spreadsheet.
pub struct Worksheet<'a> {
    session: &'a GoogleSheets,
    title: String,
    sheet_id: i64,
}

impl Worksheet<'_> {
    fn values_batch_update(
        &self,
        data: Vec<Value>,
        input: ValueInputOption,
        operation: &'static str,
    ) -> Result<(), SheetsError> {
        let url = format!("{API_BASE}/{}/values:batchUpdate", self.session.spreadsheet_id);
        self.session.post_json(
            &url,
            json!({ "valueInputOption": input, "data": data }),
            operation,
        )
    }
}

impl SheetBackend for Worksheet<'_> {
    fn title(&self) -> &str {
        &self.title
    }

    fn read_values(&self) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = format!("{API_BASE}/{}/values:batchGet", self.session.spreadsheet_id);
        let range = a1::quoted(&self.title);
        let response = self
            .session
            .authorized(self.session.agent.get(&url))
            .query("ranges", &range)
            .query("majorDimension", "ROWS")
            .call()
            .map_err(|e| request_err("read values", e))?;
        let body: BatchGetResponse = response
            .into_json()
            .map_err(|e| decode_err("read values", e))?;

        let values = body
            .value_ranges
            .into_iter()
            .next()
            .map(|r| r.values)
            .unwrap_or_default();
        Ok(values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    fn insert_row(&self, values: &[String], index: usize) -> Result<(), SheetsError> {
        if index == 0 {
            return Err(SheetsError::InvalidRange {
                reference: index.to_string(),
            });
        }
        let url = format!("{API_BASE}/{}:batchUpdate", self.session.spreadsheet_id);
        self.session.post_json(
            &url,
            json!({
                "requests": [{
                    "insertDimension": {
                        "range": {
                            "sheetId": self.sheet_id,
                            "dimension": "ROWS",
                            "startIndex": index - 1,
                            "endIndex": index,
                        },
                        "inheritFromBefore": false,
                    }
                }]
            }),
            "insert row",
        )?;

        let range = a1::qualified(&self.title, &a1::cell(0, index));
        self.values_batch_update(
            vec![json!({ "range": range, "majorDimension": "ROWS", "values": [values] })],
            ValueInputOption::UserEntered,
            "insert row",
        )
    }

    fn batch_update(
        &self,
        updates: &[CellUpdate],
        input: ValueInputOption,
    ) -> Result<(), SheetsError> {
        let data = updates
            .iter()
            .map(|u| {
                json!({
                    "range": a1::qualified(&self.title, &u.range),
                    "majorDimension": "ROWS",
                    "values": u.values,
                })
            })
            .collect();
        self.values_batch_update(data, input, "batch update")
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

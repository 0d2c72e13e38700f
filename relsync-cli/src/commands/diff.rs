//! `relsync diff [<release>]`: show what sync would append and update.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use relsync_core::TaskRecord;
use relsync_sync::{pipeline, SyncPlan};

use super::{fetch_tracker, load_config, open_spreadsheet, resolve_release};

/// Arguments for `relsync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Release label; defaults to `release` from the config.
    pub release: Option<String>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    /// Read tracker tasks from a saved search response instead of logging in.
    #[arg(long, value_name = "PATH")]
    pub tasks_json: Option<PathBuf>,
}

impl DiffArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?;
        let release = resolve_release(self.release, &config)?;
        let tracker = fetch_tracker(&config, &release, self.tasks_json.as_deref())?;

        let session = open_spreadsheet(&config)?;
        let sheet = session
            .worksheet(&config.google.sheet_name)
            .with_context(|| format!("cannot open worksheet '{}'", config.google.sheet_name))?;
        let plan = pipeline::plan(&config, &release, tracker, &sheet)
            .with_context(|| format!("diff failed for release '{release}'"))?;

        if self.json {
            print_json(&plan)?;
        } else {
            print_plan(&plan, "");
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct PlanJson<'a> {
    release: &'a str,
    tracker_rows: usize,
    append: Vec<RowJson<'a>>,
    update: Vec<RowJson<'a>>,
}

#[derive(Serialize)]
struct RowJson<'a> {
    task: &'a str,
    name: &'a str,
    status: &'a str,
    assignee: &'a str,
}

impl<'a> From<&'a TaskRecord> for RowJson<'a> {
    fn from(r: &'a TaskRecord) -> Self {
        Self {
            task: r.task_id.as_str(),
            name: &r.name,
            status: &r.status,
            assignee: &r.assignee,
        }
    }
}

#[derive(Tabled)]
struct PlanTableRow {
    #[tabled(rename = "task")]
    task: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "assignee")]
    assignee: String,
    #[tabled(rename = "priority")]
    priority: String,
    #[tabled(rename = "due")]
    due: String,
}

impl From<&TaskRecord> for PlanTableRow {
    fn from(r: &TaskRecord) -> Self {
        Self {
            task: r.task_id.to_string(),
            name: r.name.clone(),
            status: r.status.clone(),
            assignee: r.assignee.clone(),
            priority: r.priority.map(|p| p.to_string()).unwrap_or_default(),
            due: r.due_date.to_string(),
        }
    }
}

fn print_json(plan: &SyncPlan) -> Result<()> {
    let payload = PlanJson {
        release: &plan.release,
        tracker_rows: plan.tracker_rows,
        append: plan.to_append.iter().map(RowJson::from).collect(),
        update: plan.to_update.iter().map(RowJson::from).collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize diff JSON")?
    );
    Ok(())
}

/// Print both sets as tables. `prefix` marks dry runs.
pub(crate) fn print_plan(plan: &SyncPlan, prefix: &str) {
    println!(
        "{prefix}Release '{}' | {} tracker tasks | {} to append | {} to update",
        plan.release,
        plan.tracker_rows,
        plan.to_append.len(),
        plan.to_update.len(),
    );
    if plan.is_noop() {
        println!("{prefix}{} sheet is up to date", "✓".green().bold());
        return;
    }

    print_section(&format!("{prefix}To append"), &plan.to_append);
    print_section(&format!("{prefix}To update"), &plan.to_update);
}

fn print_section(title: &str, rows: &[TaskRecord]) {
    if rows.is_empty() {
        return;
    }
    println!("{}", title.bold());
    let mut table = Table::new(rows.iter().map(PlanTableRow::from));
    table.with(Style::rounded());
    println!("{table}");
}

//! `relsync sync [<release>]`: append missing tasks, rewrite changed statuses.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use relsync_sync::{
    pipeline::{self, SyncOptions},
    AppendReport, SleepThrottle, SyncReport, UpdateReport,
};

use super::diff::print_plan;
use super::{fetch_tracker, load_config, open_spreadsheet, resolve_release};

/// Arguments for `relsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Release label; defaults to `release` from the config.
    pub release: Option<String>,

    /// Skip appending tasks missing from the sheet.
    #[arg(long)]
    pub no_append: bool,

    /// Skip rewriting changed statuses.
    #[arg(long)]
    pub no_update: bool,

    /// Show what would be written without touching the sheet.
    #[arg(long)]
    pub dry_run: bool,

    /// Read tracker tasks from a saved search response instead of logging in.
    #[arg(long, value_name = "PATH")]
    pub tasks_json: Option<PathBuf>,
}

impl SyncArgs {
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

        if self.dry_run {
            print_plan(&plan, "[dry-run] ");
            return Ok(());
        }

        let options = SyncOptions {
            append: !self.no_append,
            update: !self.no_update,
        };
        let mut throttle = SleepThrottle::from_pacing(&config.pacing);
        let report = pipeline::apply(&config, plan, &sheet, &mut throttle, options)
            .with_context(|| format!("sync failed for release '{release}'"))?;

        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &SyncReport) {
    let plan = &report.plan;
    println!(
        "{} '{}' synced ({} tracker tasks)",
        "✓".green().bold(),
        plan.release,
        plan.tracker_rows
    );
    match &report.appended {
        Some(appended) => print_appended(appended),
        None => println!("  ·  append skipped ({} pending)", plan.to_append.len()),
    }
    match &report.updated {
        Some(updated) => print_updated(updated),
        None => println!("  ·  update skipped ({} pending)", plan.to_update.len()),
    }
}

fn print_appended(report: &AppendReport) {
    println!("  ✎  appended {}/{} rows", report.written, report.attempted);
    for failure in &report.failures {
        println!(
            "  {}  {}: {}",
            "✗".red().bold(),
            failure.task_id,
            failure.error
        );
    }
}

fn print_updated(report: &UpdateReport) {
    println!("  ✎  updated {} statuses", report.updated);
    for task in &report.missing {
        println!("  {}  {task}: not found in sheet", "!".yellow().bold());
    }
}

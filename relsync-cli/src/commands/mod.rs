//! Subcommands and the setup they share.

pub mod diff;
pub mod init;
pub mod sync;

use std::path::Path;

use anyhow::{Context, Result};

use relsync_core::{config, Config, TaskRecord};
use relsync_sfera::{fetch_tracker_table, SavedSearch, SferaClient, TaskSource};
use relsync_sheets::GoogleSheets;

/// Load the config from `path`, or from `~/.relsync/config.yaml`.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config> {
    let loaded = match path {
        Some(path) => config::load_from(path),
        None => config::load(),
    };
    loaded.context("failed to load config")
}

/// The release label from the command line, else the config default.
pub(crate) fn resolve_release(arg: Option<String>, config: &Config) -> Result<String> {
    arg.or_else(|| config.release.clone())
        .filter(|r| !r.trim().is_empty())
        .context("provide a release label or set `release` in the config")
}

/// Fetch and normalize the tracker tasks for `release`.
///
/// With `tasks_json` the saved search payload is replayed and no login
/// happens.
pub(crate) fn fetch_tracker(
    config: &Config,
    release: &str,
    tasks_json: Option<&Path>,
) -> Result<Vec<TaskRecord>> {
    let source: Box<dyn TaskSource> = match tasks_json {
        Some(path) => Box::new(SavedSearch::load(path)?),
        None => Box::new(SferaClient::login(&config.sfera).context("tracker login failed")?),
    };
    fetch_tracker_table(source.as_ref(), release, &config.rules)
        .with_context(|| format!("failed to fetch tasks for release '{release}'"))
}

/// Authenticate against Google Sheets for the configured spreadsheet.
pub(crate) fn open_spreadsheet(config: &Config) -> Result<GoogleSheets> {
    GoogleSheets::connect(&config.google.credentials_path, &config.google.spreadsheet_url)
        .with_context(|| {
            format!(
                "failed to open spreadsheet {}",
                config.google.spreadsheet_url
            )
        })
}

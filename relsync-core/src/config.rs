//! YAML configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.relsync/
//!   config.yaml   (mode 0600, holds tracker credentials)
//! ```
//!
//! # API pattern
//!
//! As with every path-bound function in relsync:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::types::ColumnNames;

/// Environment variable that overrides `sfera.password`.
pub const PASSWORD_ENV: &str = "RELSYNC_SFERA_PASSWORD";

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Tracker connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SferaConfig {
    pub login_url: String,
    pub search_url: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Spreadsheet location and service-account key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub spreadsheet_url: String,
    pub sheet_name: String,
    /// Path to the service-account JSON key. Relative paths resolve against
    /// the directory holding the config file.
    pub credentials_path: PathBuf,
}

/// Append throttling: pause `pause_secs` after every `every` written rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    pub every: usize,
    pub pause_secs: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            every: 10,
            pause_secs: 5,
        }
    }
}

/// Rules the row normalizer applies to every tracker task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRules {
    /// Assignee first name → status written to the sheet.
    #[serde(default)]
    pub status_mapping: BTreeMap<String, String>,
    #[serde(default = "default_backlog_status")]
    pub backlog_status: String,
    /// Subtracted from the tracker's `priorityId`.
    #[serde(default = "default_priority_offset")]
    pub priority_offset: i64,
}

impl Default for RowRules {
    fn default() -> Self {
        Self {
            status_mapping: BTreeMap::new(),
            backlog_status: default_backlog_status(),
            priority_offset: default_priority_offset(),
        }
    }
}

impl RowRules {
    /// Status for a task given its assignee first name.
    ///
    /// An empty assignee is always backlog; otherwise the mapping decides and
    /// a miss falls back to backlog.
    pub fn status_for(&self, assignee: &str) -> &str {
        if assignee.is_empty() {
            return &self.backlog_status;
        }
        self.status_mapping
            .get(assignee)
            .map(String::as_str)
            .unwrap_or(&self.backlog_status)
    }
}

/// Root of `config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub sfera: SferaConfig,
    pub google: GoogleConfig,
    /// Default release label when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(default)]
    pub columns: ColumnNames,
    #[serde(flatten)]
    pub rules: RowRules,
    /// Sheet statuses that take a row out of status reconciliation.
    #[serde(default = "default_excluded_statuses")]
    pub excluded_statuses: Vec<String>,
    #[serde(default)]
    pub pacing: Pacing,
}

fn default_backlog_status() -> String {
    "Бэклог".to_owned()
}

fn default_priority_offset() -> i64 {
    2
}

fn default_excluded_statuses() -> Vec<String> {
    ["Бэклог", "Отмена", "Блок", "Готово", "Поставка"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

impl Config {
    /// Skeleton written by `relsync init`.
    pub fn template() -> Self {
        Self {
            sfera: SferaConfig {
                login_url: "https://sfera.example.com/api/auth/login".to_owned(),
                search_url: "https://sfera.example.com/api/entities/search".to_owned(),
                username: "dev-user".to_owned(),
                password: String::new(),
            },
            google: GoogleConfig {
                spreadsheet_url: "https://docs.google.com/spreadsheets/d/<id>/edit".to_owned(),
                sheet_name: "Релизы".to_owned(),
                credentials_path: PathBuf::from("service-account.json"),
            },
            release: None,
            columns: ColumnNames::default(),
            rules: RowRules::default(),
            excluded_statuses: default_excluded_statuses(),
            pacing: Pacing::default(),
        }
    }

    /// Reject values the sync pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("columns.task", &self.columns.task),
            ("columns.status", &self.columns.status),
            ("columns.release", &self.columns.release),
            ("columns.assignee", &self.columns.assignee),
            ("google.sheet_name", &self.google.sheet_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must not be empty".to_owned(),
                });
            }
        }
        if self.pacing.every == 0 {
            return Err(ConfigError::Invalid {
                field: "pacing.every",
                reason: "must be greater than zero".to_owned(),
            });
        }
        Ok(())
    }

    /// Replace the tracker password when an override is present and non-empty.
    pub fn with_password_override(mut self, password: Option<String>) -> Self {
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            self.sfera.password = password;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.relsync/config.yaml`. Pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".relsync").join("config.yaml")
}

/// `config_path_at` convenience wrapper.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_path_at(&home()?))
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load and validate the config file at `path`.
///
/// `google.credentials_path` is resolved against the file's directory and
/// [`PASSWORD_ENV`] overrides the stored password.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let mut config: Config = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    if config.google.credentials_path.is_relative() {
        if let Some(dir) = path.parent() {
            config.google.credentials_path = dir.join(&config.google.credentials_path);
        }
    }

    let config = config.with_password_override(std::env::var(PASSWORD_ENV).ok());
    config.validate()?;
    Ok(config)
}

/// Load `<home>/.relsync/config.yaml`.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    load_from(&config_path_at(home))
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

/// Write [`Config::template`] to `path` unless a file already exists there.
///
/// Returns `true` when a new file was written. Write flow: serialize →
/// `.tmp` sibling → `chmod 0600` → `rename`.
pub fn init_file(path: &Path) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let yaml = serde_yaml::to_string(&Config::template())?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    set_file_permissions(&tmp)?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(true)
}

/// `init_file` at `<home>/.relsync/config.yaml`.
pub fn init_at(home: &Path) -> Result<bool, ConfigError> {
    init_file(&config_path_at(home))
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

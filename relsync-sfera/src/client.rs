//! Tracker session client.
//!
//! The Sfera API authenticates with a cookie set by the login endpoint, so a
//! [`SferaClient`] owns one `ureq::Agent` (with its cookie jar) for its whole
//! lifetime.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::json;

use relsync_core::SferaConfig;

use crate::error::{request_err, TrackerError};
use crate::model::{SearchPage, ATTRIBUTES};

/// Page size requested from the search endpoint. Releases are far smaller.
const PAGE_SIZE: &str = "1000";

/// Anything that can produce the raw task page for a release label.
pub trait TaskSource {
    fn search_release(&self, release: &str) -> Result<SearchPage, TrackerError>;
}

/// Authenticated Sfera session.
pub struct SferaClient {
    agent: ureq::Agent,
    search_url: String,
}

impl SferaClient {
    /// Log in with the configured username/password and keep the session.
    pub fn login(config: &SferaConfig) -> Result<Self, TrackerError> {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(60))
            .build();

        let response = agent.post(&config.login_url).send_json(json!({
            "username": config.username,
            "password": config.password,
        }));
        match response {
            Ok(_) => {
                tracing::info!(user = %config.username, "logged in to tracker");
            }
            Err(ureq::Error::Status(status, _)) if status == 401 || status == 403 => {
                return Err(TrackerError::Auth {
                    user: config.username.clone(),
                    status,
                });
            }
            Err(err) => return Err(request_err("login", err)),
        }

        Ok(Self {
            agent,
            search_url: config.search_url.clone(),
        })
    }
}

impl TaskSource for SferaClient {
    fn search_release(&self, release: &str) -> Result<SearchPage, TrackerError> {
        let label_filter = format!("label = '{release}'");
        tracing::debug!(url = %self.search_url, query = %label_filter, "searching tracker");

        let response = self
            .agent
            .get(&self.search_url)
            .query("query", &label_filter)
            .query("size", PAGE_SIZE)
            .query("page", "0")
            .query("attributesToReturn", ATTRIBUTES)
            .call()
            .map_err(|e| request_err("search", e))?;

        response
            .into_json::<SearchPage>()
            .map_err(|source| TrackerError::Decode {
                operation: "search",
                source,
            })
    }
}

/// A search page saved to disk, replayed instead of querying the tracker.
#[derive(Debug, Clone)]
pub struct SavedSearch {
    pub path: PathBuf,
    pub page: SearchPage,
}

impl SavedSearch {
    pub fn load(path: &Path) -> Result<Self, TrackerError> {
        let contents = std::fs::read_to_string(path).map_err(|source| TrackerError::Payload {
            path: path.to_path_buf(),
            source,
        })?;
        let page = serde_json::from_str(&contents).map_err(|source| TrackerError::PayloadJson {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            page,
        })
    }
}

impl TaskSource for SavedSearch {
    fn search_release(&self, release: &str) -> Result<SearchPage, TrackerError> {
        tracing::info!(path = %self.path.display(), release, "using saved task payload");
        Ok(self.page.clone())
    }
}

impl TaskSource for SearchPage {
    fn search_release(&self, _release: &str) -> Result<SearchPage, TrackerError> {
        Ok(self.clone())
    }
}

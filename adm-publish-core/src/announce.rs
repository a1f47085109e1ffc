//! Announcing a published version to a downstream API.
//!
//! The announcement is a single authenticated form POST:
//!
//! ```text
//! POST {API_URL}
//! X-API-KEY: {API_KEY}
//! Content-Type: application/x-www-form-urlencoded
//!
//! version={version}
//! ```
//!
//! If either the endpoint or the key is not configured the step is skipped
//! without touching the network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Request, StatusCode};
use tracing::{error, info};

use crate::contract::{Announcement, Announcer};
use crate::error::{PublishError, Result};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Upper bound on a single announcement request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Announcement endpoint settings, read once at start-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnounceConfig {
    pub endpoint_url: Option<String>,
    pub api_key: Option<String>,
}

impl AnnounceConfig {
    /// Both values present, or nothing to do.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.endpoint_url.as_deref(), self.api_key.as_deref()) {
            (Some(url), Some(key)) => Some((url, key)),
            _ => None,
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            endpoint_url = self.endpoint_url.as_deref().unwrap_or("<unset>"),
            api_key_set = self.api_key.is_some(),
            "Loaded announcement config"
        );
    }
}

/// [`Announcer`] backed by reqwest.
pub struct HttpAnnouncer {
    client: Client,
    config: AnnounceConfig,
}

impl HttpAnnouncer {
    pub fn new(config: AnnounceConfig) -> Result<Self> {
        Self::with_timeout(config, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(config: AnnounceConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            error!(error = ?e, "Failed to build HTTP client for announcements");
            PublishError::Announcement(format!("failed to build HTTP client: {e}"))
        })?;
        Ok(Self { client, config })
    }

    /// Builds the announcement request without sending it.
    /// Returns `None` when the endpoint or key is missing.
    pub fn build_request(&self, version: &str) -> Result<Option<Request>> {
        let Some((url, key)) = self.config.credentials() else {
            return Ok(None);
        };
        self.client
            .post(url)
            .header(API_KEY_HEADER, key)
            .form(&[("version", version)])
            .build()
            .map(Some)
            .map_err(|e| PublishError::Announcement(format!("invalid request to {url}: {e}")))
    }
}

#[async_trait]
impl Announcer for HttpAnnouncer {
    async fn announce(&self, version: &str) -> Result<Announcement> {
        let Some(request) = self.build_request(version)? else {
            info!("[PUBLISH][ANNOUNCE] API_URL or API_KEY not set, skipping announcement");
            return Ok(Announcement::Skipped);
        };
        let url = request.url().clone();
        info!(url = %url, version, "[PUBLISH][ANNOUNCE] Announcing version");

        let response = self.client.execute(request).await.map_err(|e| {
            error!(url = %url, error = ?e, "[PUBLISH][ERROR][ANNOUNCE] Request failed");
            PublishError::Announcement(format!("request to {url} failed: {e}"))
        })?;

        let status = response.status();
        check_status(status)?;
        info!(url = %url, status = status.as_u16(), "[PUBLISH][ANNOUNCE] Version announced");
        Ok(Announcement::Delivered {
            status: status.as_u16(),
        })
    }
}

fn check_status(status: StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        error!(status = status.as_u16(), "[PUBLISH][ERROR][ANNOUNCE] Remote rejected announcement");
        Err(PublishError::Announcement(format!(
            "remote responded with {status}"
        )))
    }
}

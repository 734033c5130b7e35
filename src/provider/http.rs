//! # HTTP Clients
//!
//! reqwest-based implementations of the provider traits that talk to plain HTTP endpoints:
//! release asset downloads and the notebook job API behind a presigned URL.

use crate::provider::{AssetFetcher, NotebookSession};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, info, warn};

/// Downloads release assets over HTTPS
#[derive(Debug, Clone)]
pub struct HttpAssetFetcher {
    client: reqwest::Client,
}

impl HttpAssetFetcher {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client for asset downloads")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to download {url}"))?
            .error_for_status()
            .with_context(|| format!("Download of {url} was rejected"))?;
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of {url}"))?;
        info!("Downloaded {} ({} bytes)", url, bytes.len());
        Ok(bytes.to_vec())
    }
}

/// Runs notes through the Zeppelin job API of a Studio application
///
/// Each run opens a fresh cookie-keeping session: the first GET against the authorized URL
/// exchanges the `auth` query token for a session cookie, the POST then runs the note.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeppelinSession;

/// Strip the `?auth...` query from an authorized job URL
#[must_use]
pub fn strip_auth_query(authorized_url: &str) -> &str {
    authorized_url
        .split_once("?auth")
        .map_or(authorized_url, |(base, _)| base)
}

#[async_trait]
impl NotebookSession for ZeppelinSession {
    async fn run_note(&self, authorized_job_url: &str) -> Result<serde_json::Value> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .context("Failed to build notebook session client")?;

        // Does not run the note, only authenticates the session
        let auth = client
            .get(authorized_job_url)
            .send()
            .await
            .context("Failed to authenticate notebook session")?;
        if auth.status().is_success() {
            debug!("Notebook session authenticated: {}", auth.status());
        } else {
            warn!("Notebook session authentication returned {}", auth.status());
        }

        let job_url = strip_auth_query(authorized_job_url);
        let response = client
            .post(job_url)
            .send()
            .await
            .with_context(|| format!("Failed to run note via {job_url}"))?;
        let body: serde_json::Value = response
            .json()
            .await
            .context("Notebook job API returned a non-JSON reply")?;

        if body.get("exception").is_some() {
            warn!("Notebook job API reported an exception: {}", body);
            return Ok(body.get("message").cloned().unwrap_or(body));
        }
        Ok(body)
    }
}

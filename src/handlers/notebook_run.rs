//! Runs the blueprint note of a Studio application once the application is up.

use crate::cfn::CustomResourceRequest;
use crate::config::{EnvLookup, NotebookRunConfig};
use crate::constants::{
    NOTEBOOK_NOTE_ID, PRESIGNED_URL_EXPIRY_SECS, ZEPPELIN_JOB_API_PATH, ZEPPELIN_UI_PATH,
};
use crate::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::{LifecycleHandler, Watchdog};
use crate::provider::{ApplicationClient, NotebookSession, PresignedUrlType};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Point a presigned Zeppelin UI URL at the job API of the blueprint note
#[must_use]
pub fn job_url(authorized_ui_url: &str) -> String {
    authorized_ui_url.replace(
        ZEPPELIN_UI_PATH,
        &format!("{ZEPPELIN_JOB_API_PATH}{NOTEBOOK_NOTE_ID}"),
    )
}

/// Text reported for the job API's reply
#[must_use]
pub fn render_note_result(result: &Value) -> String {
    match result {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    }
}

pub struct NotebookRunHandler {
    client: Arc<dyn ApplicationClient>,
    session: Arc<dyn NotebookSession>,
    env: EnvLookup,
}

impl std::fmt::Debug for NotebookRunHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotebookRunHandler").finish_non_exhaustive()
    }
}

impl NotebookRunHandler {
    pub fn new(
        client: Arc<dyn ApplicationClient>,
        session: Arc<dyn NotebookSession>,
        env: EnvLookup,
    ) -> Self {
        Self {
            client,
            session,
            env,
        }
    }
}

#[async_trait]
impl LifecycleHandler for NotebookRunHandler {
    fn name(&self) -> &'static str {
        "studio-notebook-run"
    }

    async fn provision(
        &self,
        _request: &CustomResourceRequest,
        _watchdog: &Watchdog,
    ) -> LifecycleResult<String> {
        let config = NotebookRunConfig::from_lookup(&*self.env)?;
        let authorized_url = self
            .client
            .create_presigned_url(
                &config.app_name,
                PresignedUrlType::ZeppelinUi,
                Duration::from_secs(PRESIGNED_URL_EXPIRY_SECS),
            )
            .await?
            .ok_or(LifecycleError::PresignedUrlUnavailable)?;

        let result = self.session.run_note(&job_url(&authorized_url)).await?;
        info!("Note run result: {}", result);
        Ok(render_note_result(&result))
    }

    async fn reconcile(
        &self,
        _request: &CustomResourceRequest,
        _watchdog: &Watchdog,
    ) -> LifecycleResult<String> {
        Ok("Resource updated".to_string())
    }

    async fn decommission(
        &self,
        _request: &CustomResourceRequest,
        _watchdog: &Watchdog,
    ) -> LifecycleResult<String> {
        Ok("Resource deleted".to_string())
    }
}

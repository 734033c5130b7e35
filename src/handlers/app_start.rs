//! Starts an application that was created elsewhere in the stack and waits until it runs.

use crate::cfn::CustomResourceRequest;
use crate::error::LifecycleResult;
use crate::lifecycle::guard::{self, ApplicationOperation};
use crate::lifecycle::{LifecycleHandler, StatusPoller, Watchdog};
use crate::properties::required_str;
use crate::provider::ApplicationClient;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct AppStartHandler {
    client: Arc<dyn ApplicationClient>,
    poll_interval: Duration,
}

impl std::fmt::Debug for AppStartHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStartHandler")
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl AppStartHandler {
    pub fn new(client: Arc<dyn ApplicationClient>, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
        }
    }

    async fn execute(
        &self,
        operation: ApplicationOperation,
        watchdog: &Watchdog,
    ) -> LifecycleResult<()> {
        let poller = StatusPoller::new(self.poll_interval).bounded_by(watchdog);
        let outcome = guard::execute(self.client.as_ref(), &poller, operation).await?;
        info!("Finished: {:?}", outcome);
        Ok(())
    }

    async fn start(
        &self,
        request: &CustomResourceRequest,
        watchdog: &Watchdog,
    ) -> LifecycleResult<()> {
        let name = required_str(&request.resource_properties, "AppName")?;
        self.execute(ApplicationOperation::Start { name }, watchdog)
            .await
    }
}

#[async_trait]
impl LifecycleHandler for AppStartHandler {
    fn name(&self) -> &'static str {
        "app-start"
    }

    async fn provision(
        &self,
        request: &CustomResourceRequest,
        watchdog: &Watchdog,
    ) -> LifecycleResult<String> {
        self.start(request, watchdog).await?;
        Ok("Resource created".to_string())
    }

    async fn reconcile(
        &self,
        request: &CustomResourceRequest,
        watchdog: &Watchdog,
    ) -> LifecycleResult<String> {
        self.start(request, watchdog).await?;
        Ok("Resource updated".to_string())
    }

    /// The application is deleted by its own resource, nothing to stop here
    async fn decommission(
        &self,
        _request: &CustomResourceRequest,
        watchdog: &Watchdog,
    ) -> LifecycleResult<String> {
        self.execute(ApplicationOperation::Skip, watchdog).await?;
        Ok("Resource deleted".to_string())
    }
}

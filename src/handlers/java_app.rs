//! Packaged Java application, created from a ZIP/JAR in object storage.

use crate::cfn::CustomResourceRequest;
use crate::error::LifecycleResult;
use crate::lifecycle::guard::{self, ApplicationOperation};
use crate::lifecycle::{LifecycleHandler, StatusPoller, Watchdog};
use crate::properties::JavaAppProperties;
use crate::provider::ApplicationClient;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub struct JavaAppHandler {
    client: Arc<dyn ApplicationClient>,
    poll_interval: Duration,
}

impl std::fmt::Debug for JavaAppHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JavaAppHandler")
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl JavaAppHandler {
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
        guard::execute(self.client.as_ref(), &poller, operation).await?;
        Ok(())
    }
}

#[async_trait]
impl LifecycleHandler for JavaAppHandler {
    fn name(&self) -> &'static str {
        "java-app-resource"
    }

    async fn provision(
        &self,
        request: &CustomResourceRequest,
        watchdog: &Watchdog,
    ) -> LifecycleResult<String> {
        let properties = JavaAppProperties::from_properties(&request.resource_properties)?;
        self.execute(
            ApplicationOperation::Create(Box::new(properties.to_create_request())),
            watchdog,
        )
        .await?;
        Ok("Successfully Created Application".to_string())
    }

    async fn reconcile(
        &self,
        _request: &CustomResourceRequest,
        watchdog: &Watchdog,
    ) -> LifecycleResult<String> {
        self.execute(ApplicationOperation::Skip, watchdog).await?;
        Ok("Successfully Updated Application".to_string())
    }

    async fn decommission(
        &self,
        request: &CustomResourceRequest,
        watchdog: &Watchdog,
    ) -> LifecycleResult<String> {
        let name = JavaAppProperties::app_name(&request.resource_properties)?;
        self.execute(ApplicationOperation::Delete { name }, watchdog)
            .await?;
        Ok("Successfully Deleted Application".to_string())
    }
}

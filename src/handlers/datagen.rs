//! Seeds a data stream with synthetic stock ticks when the stack is created.

use crate::cfn::CustomResourceRequest;
use crate::datagen::generate_records;
use crate::error::LifecycleResult;
use crate::lifecycle::{LifecycleHandler, Watchdog};
use crate::properties::DataGenProperties;
use crate::provider::RecordSink;
use async_trait::async_trait;
use std::sync::Arc;

pub struct DataGenHandler {
    sink: Arc<dyn RecordSink>,
}

impl std::fmt::Debug for DataGenHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGenHandler").finish_non_exhaustive()
    }
}

impl DataGenHandler {
    pub fn new(sink: Arc<dyn RecordSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl LifecycleHandler for DataGenHandler {
    fn name(&self) -> &'static str {
        "kds-datagen"
    }

    async fn provision(
        &self,
        request: &CustomResourceRequest,
        _watchdog: &Watchdog,
    ) -> LifecycleResult<String> {
        let properties = DataGenProperties::from_properties(&request.resource_properties)?;
        generate_records(
            self.sink.as_ref(),
            &properties.stream_arn,
            properties.number_of_items,
        )
        .await?;
        Ok("Resource created".to_string())
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

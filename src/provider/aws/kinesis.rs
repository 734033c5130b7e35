//! # Kinesis Data Streams Sink

use crate::provider::RecordSink;
use anyhow::Result;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_kinesis::error::DisplayErrorContext;
use aws_sdk_kinesis::primitives::Blob;
use aws_sdk_kinesis::Client;
use tracing::debug;

/// Kinesis implementation of [`RecordSink`]
pub struct KinesisRecordSink {
    client: Client,
}

impl std::fmt::Debug for KinesisRecordSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KinesisRecordSink").finish_non_exhaustive()
    }
}

impl KinesisRecordSink {
    #[must_use]
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl RecordSink for KinesisRecordSink {
    async fn put_record(&self, stream_arn: &str, data: &[u8], partition_key: &str) -> Result<()> {
        let output = self
            .client
            .put_record()
            .stream_arn(stream_arn)
            .data(Blob::new(data))
            .partition_key(partition_key)
            .send()
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Failed to put record into {stream_arn}: {}",
                    DisplayErrorContext(&e)
                )
            })?;
        debug!(
            "Put record into shard {} with sequence number {}",
            output.shard_id(),
            output.sequence_number()
        );
        Ok(())
    }
}

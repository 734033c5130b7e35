//! # AWS Clients
//!
//! Implementations of the provider traits over the official AWS Rust SDK:
//! - `analytics`: Managed Service for Apache Flink (kinesisanalyticsv2) control plane
//! - `kinesis`: Kinesis Data Streams records
//! - `s3`: release asset bucket
//!
//! Credentials always come from the default provider chain, which inside Lambda resolves to
//! the function's execution role.

use aws_config::SdkConfig;
use tracing::info;

pub mod analytics;
pub mod kinesis;
pub mod s3;

pub use analytics::KinesisAnalyticsClient;
pub use kinesis::KinesisRecordSink;
pub use s3::S3AssetStore;

/// Load the shared SDK config
///
/// An explicit region wins over the one resolved from the environment.
pub async fn load_sdk_config(region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = region {
        info!("Using explicit AWS region: {}", region);
        loader = loader.region(aws_config::Region::new(region.to_string()));
    }
    loader.load().await
}

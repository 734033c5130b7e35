//! # Provider Modules
//!
//! Abstract interfaces for the remote services the handlers drive.
//!
//! Each trait has one production implementation (`aws` for the AWS control planes, `http` for
//! plain HTTP endpoints) and in-memory fakes in the integration tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use std::time::Duration;

pub mod types;
pub use types::*;

/// Control plane of the managed Flink service
///
/// Every call returns as soon as the service accepted it; the application then transitions
/// on its own and has to be observed through [`ApplicationClient::describe_application`].
#[async_trait]
pub trait ApplicationClient: Send + Sync {
    /// Describe an application
    /// Returns `Ok(None)` when the application does not exist
    async fn describe_application(&self, name: &str) -> Result<Option<ApplicationDetail>>;

    async fn create_application(&self, request: &CreateApplicationRequest) -> Result<()>;

    async fn start_application(&self, name: &str) -> Result<()>;

    /// Detach a VPC configuration
    /// `current_version_id` must be the version observed right before the call
    async fn delete_application_vpc_configuration(
        &self,
        name: &str,
        current_version_id: i64,
        vpc_configuration_id: &str,
    ) -> Result<()>;

    async fn delete_application(&self, name: &str, create_timestamp: DateTime<Utc>)
        -> Result<()>;

    /// Request a presigned URL for one of the application's web UIs
    /// Returns `Ok(None)` when the service answered without a URL
    async fn create_presigned_url(
        &self,
        name: &str,
        url_type: PresignedUrlType,
        session_expiry: Duration,
    ) -> Result<Option<String>>;
}

/// Data stream that synthetic records are written to
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn put_record(&self, stream_arn: &str, data: &[u8], partition_key: &str) -> Result<()>;
}

/// Object storage bucket holding release assets
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()>;

    /// Delete every object in the bucket
    /// Returns the number of objects deleted
    async fn empty_bucket(&self, bucket: &str) -> Result<usize>;
}

/// Source that release assets are downloaded from
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}

/// Authenticated session against a notebook's job API
#[async_trait]
pub trait NotebookSession: Send + Sync {
    /// Run every paragraph of a note through an authorized job URL
    /// Returns the service's reply (or its error message) as JSON
    async fn run_note(&self, authorized_job_url: &str) -> Result<serde_json::Value>;
}

pub mod aws;
pub mod http;

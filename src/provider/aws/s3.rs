//! # S3 Asset Store

use crate::provider::AssetStore;
use anyhow::Result;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

/// S3 implementation of [`AssetStore`]
pub struct S3AssetStore {
    client: Client,
}

impl std::fmt::Debug for S3AssetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3AssetStore").finish_non_exhaustive()
    }
}

impl S3AssetStore {
    #[must_use]
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl AssetStore for S3AssetStore {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Failed to upload s3://{bucket}/{key}: {}",
                    DisplayErrorContext(&e)
                )
            })?;
        info!("Uploaded s3://{}/{} ({} bytes)", bucket, key, size);
        Ok(())
    }

    async fn empty_bucket(&self, bucket: &str) -> Result<usize> {
        let mut deleted = 0;
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                anyhow::anyhow!(
                    "Failed to list objects in {bucket}: {}",
                    DisplayErrorContext(&e)
                )
            })?;
            for key in page.contents().iter().filter_map(|object| object.key()) {
                self.client
                    .delete_object()
                    .bucket(bucket)
                    .key(key)
                    .send()
                    .await
                    .map_err(|e| {
                        anyhow::anyhow!(
                            "Failed to delete s3://{bucket}/{key}: {}",
                            DisplayErrorContext(&e)
                        )
                    })?;
                debug!("Deleted s3://{}/{}", bucket, key);
                deleted += 1;
            }
        }

        info!("Emptied bucket {} ({} objects)", bucket, deleted);
        Ok(deleted)
    }
}

//! Copies release assets (application jars, notebooks) into the stack's bucket, and empties
//! the bucket again so CloudFormation can delete it.

use crate::cfn::CustomResourceRequest;
use crate::config::{CopyAssetsConfig, EnvLookup};
use crate::constants::{ALLOWED_ASSET_HOSTS, ALLOWED_ASSET_PATH_PREFIXES};
use crate::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::{LifecycleHandler, Watchdog};
use crate::provider::{AssetFetcher, AssetStore};
use async_trait::async_trait;
use reqwest::Url;
use std::sync::Arc;
use tracing::info;

/// Parse an asset URL and check it against the allowlist
///
/// An asset is accepted from an allowed host, or from any host when the first path segment
/// is an allowed prefix.
///
/// # Errors
///
/// Returns [`LifecycleError::DisallowedAsset`] for unparsable or unlisted URLs.
pub fn check_asset_allowed(raw: &str) -> LifecycleResult<Url> {
    let disallowed = || LifecycleError::DisallowedAsset(raw.to_string());
    let url = Url::parse(raw).map_err(|_parse_error| disallowed())?;

    let host_allowed = url
        .host_str()
        .is_some_and(|host| ALLOWED_ASSET_HOSTS.contains(&host));
    let prefix_allowed = url
        .path_segments()
        .and_then(|mut segments| segments.next())
        .is_some_and(|first| ALLOWED_ASSET_PATH_PREFIXES.contains(&first));

    if host_allowed || prefix_allowed {
        Ok(url)
    } else {
        Err(disallowed())
    }
}

/// Object key an asset is stored under: the last path segment of its URL
#[must_use]
pub fn asset_key(url: &Url) -> Option<String> {
    url.path_segments()
        .and_then(Iterator::last)
        .filter(|segment| !segment.is_empty())
        .map(ToString::to_string)
}

pub struct CopyAssetsHandler {
    fetcher: Arc<dyn AssetFetcher>,
    store: Arc<dyn AssetStore>,
    env: EnvLookup,
}

impl std::fmt::Debug for CopyAssetsHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CopyAssetsHandler").finish_non_exhaustive()
    }
}

impl CopyAssetsHandler {
    pub fn new(fetcher: Arc<dyn AssetFetcher>, store: Arc<dyn AssetStore>, env: EnvLookup) -> Self {
        Self {
            fetcher,
            store,
            env,
        }
    }
}

#[async_trait]
impl LifecycleHandler for CopyAssetsHandler {
    fn name(&self) -> &'static str {
        "copy-assets"
    }

    async fn provision(
        &self,
        _request: &CustomResourceRequest,
        _watchdog: &Watchdog,
    ) -> LifecycleResult<String> {
        let config = CopyAssetsConfig::from_lookup(&*self.env)?;

        // Reject the whole list before copying anything
        let urls = config
            .asset_urls
            .iter()
            .map(|raw| check_asset_allowed(raw))
            .collect::<LifecycleResult<Vec<_>>>()?;

        for url in &urls {
            let key = asset_key(url)
                .ok_or_else(|| LifecycleError::DisallowedAsset(url.to_string()))?;
            let body = self.fetcher.fetch(url).await?;
            self.store.put_object(&config.bucket_name, &key, body).await?;
            info!("Copied {} to s3://{}/{}", url, config.bucket_name, key);
        }

        Ok("Resource creation successful!".to_string())
    }

    async fn reconcile(
        &self,
        _request: &CustomResourceRequest,
        _watchdog: &Watchdog,
    ) -> LifecycleResult<String> {
        Ok("Resource update successful!".to_string())
    }

    async fn decommission(
        &self,
        _request: &CustomResourceRequest,
        _watchdog: &Watchdog,
    ) -> LifecycleResult<String> {
        let config = CopyAssetsConfig::from_lookup(&*self.env)?;
        let deleted = self.store.empty_bucket(&config.bucket_name).await?;
        info!("Removed {} objects from {}", deleted, config.bucket_name);
        Ok("Resource deletion successful!".to_string())
    }
}

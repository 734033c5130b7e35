//! Custom resource that copies release assets into the stack's bucket and empties it on
//! delete.

use msf_blueprint_handlers::config::{process_env_lookup, HandlerSettings};
use msf_blueprint_handlers::constants::COPY_ASSETS_TIMEOUT_SECS;
use msf_blueprint_handlers::handlers::CopyAssetsHandler;
use msf_blueprint_handlers::observability;
use msf_blueprint_handlers::provider::aws::{load_sdk_config, S3AssetStore};
use msf_blueprint_handlers::provider::http::HttpAssetFetcher;
use msf_blueprint_handlers::runtime::serve;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    observability::init("copy-assets");

    let settings = HandlerSettings::from_env(COPY_ASSETS_TIMEOUT_SECS);
    let sdk_config = load_sdk_config(settings.aws_region.as_deref()).await;
    let handler = CopyAssetsHandler::new(
        Arc::new(HttpAssetFetcher::new()?),
        Arc::new(S3AssetStore::new(&sdk_config)),
        process_env_lookup(),
    );

    serve(Arc::new(handler), settings).await
}

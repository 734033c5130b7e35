//! Custom resource that creates and deletes a Studio notebook application.

use msf_blueprint_handlers::config::{process_env_lookup, HandlerSettings};
use msf_blueprint_handlers::constants::STUDIO_APP_TIMEOUT_SECS;
use msf_blueprint_handlers::handlers::StudioAppHandler;
use msf_blueprint_handlers::observability;
use msf_blueprint_handlers::provider::aws::{load_sdk_config, KinesisAnalyticsClient};
use msf_blueprint_handlers::runtime::serve;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    observability::init("msf-studio-app-resource");

    let settings = HandlerSettings::from_env(STUDIO_APP_TIMEOUT_SECS);
    let sdk_config = load_sdk_config(settings.aws_region.as_deref()).await;
    let handler = StudioAppHandler::new(
        Arc::new(KinesisAnalyticsClient::new(&sdk_config)),
        process_env_lookup(),
        settings.poll_interval(),
    );

    serve(Arc::new(handler), settings).await
}

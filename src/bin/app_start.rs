//! Custom resource that starts an application and waits until it is RUNNING.

use msf_blueprint_handlers::config::HandlerSettings;
use msf_blueprint_handlers::constants::APP_START_TIMEOUT_SECS;
use msf_blueprint_handlers::handlers::AppStartHandler;
use msf_blueprint_handlers::observability;
use msf_blueprint_handlers::provider::aws::{load_sdk_config, KinesisAnalyticsClient};
use msf_blueprint_handlers::runtime::serve;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    observability::init("msf-app-start");

    let settings = HandlerSettings::from_env(APP_START_TIMEOUT_SECS);
    let sdk_config = load_sdk_config(settings.aws_region.as_deref()).await;
    let handler = AppStartHandler::new(
        Arc::new(KinesisAnalyticsClient::new(&sdk_config)),
        settings.poll_interval(),
    );

    serve(Arc::new(handler), settings).await
}

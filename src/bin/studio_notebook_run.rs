//! Custom resource that runs the blueprint note of a Studio application.

use msf_blueprint_handlers::config::{process_env_lookup, HandlerSettings};
use msf_blueprint_handlers::constants::NOTEBOOK_RUN_TIMEOUT_SECS;
use msf_blueprint_handlers::handlers::NotebookRunHandler;
use msf_blueprint_handlers::observability;
use msf_blueprint_handlers::provider::aws::{load_sdk_config, KinesisAnalyticsClient};
use msf_blueprint_handlers::provider::http::ZeppelinSession;
use msf_blueprint_handlers::runtime::serve;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    observability::init("msf-studio-notebook-run");

    let settings = HandlerSettings::from_env(NOTEBOOK_RUN_TIMEOUT_SECS);
    let sdk_config = load_sdk_config(settings.aws_region.as_deref()).await;
    let handler = NotebookRunHandler::new(
        Arc::new(KinesisAnalyticsClient::new(&sdk_config)),
        Arc::new(ZeppelinSession),
        process_env_lookup(),
    );

    serve(Arc::new(handler), settings).await
}

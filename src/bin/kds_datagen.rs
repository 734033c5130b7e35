//! Custom resource that seeds a Kinesis data stream with synthetic stock ticks.

use msf_blueprint_handlers::config::HandlerSettings;
use msf_blueprint_handlers::constants::DATAGEN_TIMEOUT_SECS;
use msf_blueprint_handlers::handlers::DataGenHandler;
use msf_blueprint_handlers::observability;
use msf_blueprint_handlers::provider::aws::{load_sdk_config, KinesisRecordSink};
use msf_blueprint_handlers::runtime::serve;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    observability::init("kds-datagen");

    let settings = HandlerSettings::from_env(DATAGEN_TIMEOUT_SECS);
    let sdk_config = load_sdk_config(settings.aws_region.as_deref()).await;
    let handler = DataGenHandler::new(Arc::new(KinesisRecordSink::new(&sdk_config)));

    serve(Arc::new(handler), settings).await
}

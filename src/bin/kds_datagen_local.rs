//! Produce synthetic stock ticks into a Kinesis data stream from a workstation.

use anyhow::Result;
use clap::Parser;
use msf_blueprint_handlers::datagen::generate_records;
use msf_blueprint_handlers::observability;
use msf_blueprint_handlers::provider::aws::{load_sdk_config, KinesisRecordSink};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "kds-datagen-local")]
#[command(about = "Produce synthetic stock ticks into a Kinesis data stream", long_about = None)]
#[command(version)]
struct Cli {
    /// Kinesis data stream ARN to produce test records into
    #[arg(long)]
    stream_arn: String,

    /// Number of test records to produce
    #[arg(long, default_value_t = 100)]
    count: u64,

    /// AWS region of the stream given via --stream-arn
    #[arg(long)]
    region: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::install_crypto_provider();
    observability::init_tracing();

    let cli = Cli::parse();
    let sdk_config = load_sdk_config(cli.region.as_deref()).await;
    let sink = KinesisRecordSink::new(&sdk_config);

    let written = generate_records(&sink, &cli.stream_arn, cli.count).await?;
    info!("Produced {} records into {}, done", written, cli.stream_arn);
    Ok(())
}

//! # Synthetic Stock Ticks
//!
//! Records written into a data stream to give a freshly deployed application something to
//! read.

use crate::constants::TICKERS;
use crate::provider::RecordSink;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockTick {
    /// Local wall-clock time, ISO-8601 without a zone
    #[serde(serialize_with = "serialize_event_time")]
    pub event_time: NaiveDateTime,
    pub ticker: String,
    pub price: f64,
}

fn serialize_event_time<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&value.format("%Y-%m-%dT%H:%M:%S%.6f"))
}

impl StockTick {
    /// A tick for a random ticker at a price in [0, 100) with two decimals
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let ticker = TICKERS.choose(rng).copied().unwrap_or(TICKERS[0]);
        let price = (rng.gen::<f64>() * 100.0 * 100.0).round() / 100.0;
        Self {
            event_time: Local::now().naive_local(),
            ticker: ticker.to_string(),
            price,
        }
    }
}

/// Write `count` random ticks to a stream, partitioned by ticker
///
/// # Errors
///
/// Stops at the first record that cannot be serialized or written.
pub async fn generate_records(sink: &dyn RecordSink, stream_arn: &str, count: u64) -> Result<u64> {
    info!("Producing {} records into {}", count, stream_arn);
    for written in 0..count {
        // ThreadRng is not Send, keep it out of the await
        let tick = StockTick::random(&mut rand::thread_rng());
        let data = serde_json::to_vec(&tick).context("Failed to serialize stock tick")?;
        sink.put_record(stream_arn, &data, &tick.ticker)
            .await
            .with_context(|| format!("Failed to write record {} of {}", written + 1, count))?;
        debug!("Wrote {} at {}", tick.ticker, tick.price);
    }
    Ok(count)
}

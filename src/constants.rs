//! # Constants
//!
//! Shared constants used throughout the handlers.
//!
//! These values represent the defaults the blueprint stacks were built around and can be
//! overridden via environment variables where applicable (see [`crate::config`]).

/// Interval between two `describe` calls while waiting for an application to settle (seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;

/// Largest accepted poll interval (seconds)
pub const MAX_POLL_INTERVAL_SECS: u64 = 60;

/// Largest accepted watchdog budget (seconds), the Lambda maximum timeout
pub const MAX_WATCHDOG_TIMEOUT_SECS: u64 = 900;

/// Watchdog budget for the Java application resource handler (seconds)
pub const JAVA_APP_TIMEOUT_SECS: u64 = 300;

/// Watchdog budget for the application start handler (seconds)
/// The function itself is deployed with a 600s timeout
pub const APP_START_TIMEOUT_SECS: u64 = 550;

/// Watchdog budget for the Studio application resource handler (seconds)
pub const STUDIO_APP_TIMEOUT_SECS: u64 = 300;

/// Watchdog budget for the notebook run handler (seconds)
pub const NOTEBOOK_RUN_TIMEOUT_SECS: u64 = 120;

/// Watchdog budget for the data generator handler (seconds)
pub const DATAGEN_TIMEOUT_SECS: u64 = 120;

/// Watchdog budget for the asset copy handler (seconds)
pub const COPY_ASSETS_TIMEOUT_SECS: u64 = 290;

/// Margin kept between the watchdog deadline and the Lambda hard deadline (milliseconds)
/// Leaves room to deliver the outcome before the platform kills the invocation
pub const DEADLINE_SAFETY_MARGIN_MS: u64 = 3000;

/// Session lifetime requested for presigned notebook URLs (seconds)
pub const PRESIGNED_URL_EXPIRY_SECS: u64 = 1800;

/// Note id baked into the generated Studio notebook and targeted by the notebook run handler
pub const NOTEBOOK_NOTE_ID: &str = "ABCDEFGHI";

/// Path segment of the Zeppelin UI inside a presigned URL
pub const ZEPPELIN_UI_PATH: &str = "/zeppelin/";

/// Path prefix of the Zeppelin notebook job API
pub const ZEPPELIN_JOB_API_PATH: &str = "/zeppelin/api/notebook/job/";

/// Property group id that carries blueprint metadata on every application
pub const BLUEPRINT_PROPERTY_GROUP_ID: &str = "BlueprintMetadata";

/// Tickers used by the synthetic data generator and the notebook UDF
pub const TICKERS: [&str; 5] = ["AAPL", "AMZN", "MSFT", "INTC", "TBV"];

/// Hosts that release assets may be downloaded from
pub const ALLOWED_ASSET_HOSTS: [&str; 2] = ["github.com", "data-streaming-labs.s3.amazonaws.com"];

/// First path segments that release assets may be downloaded from
pub const ALLOWED_ASSET_PATH_PREFIXES: [&str; 2] = ["awslabs", "blueprint-test"];

/// Maximum number of attempts when delivering an outcome to the response URL
pub const RESPONSE_DELIVERY_ATTEMPTS: u32 = 3;

/// Fibonacci backoff starting value between response delivery attempts (milliseconds)
pub const RESPONSE_BACKOFF_START_MS: u64 = 250;

/// Fibonacci backoff maximum value between response delivery attempts (milliseconds)
pub const RESPONSE_BACKOFF_MAX_MS: u64 = 2000;

/// Upper bound for a single PUT to the response URL (milliseconds)
pub const RESPONSE_ATTEMPT_TIMEOUT_MS: u64 = 2000;

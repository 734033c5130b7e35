//! # Observability
//!
//! Logging setup shared by every binary. Output goes to CloudWatch, which stamps each line
//! itself, so timestamps and module targets are left out.

use tracing::info;

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "msf_blueprint_handlers=info,kds_datagen_local=info";

/// Install the ring crypto provider for rustls
///
/// Must run before any TLS client is built. Installing twice is harmless.
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }
}

/// Initialize the tracing subscriber
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_target(false)
        .without_time()
        .init();
}

/// Log build information, once per cold start
pub fn log_build_info(binary: &str) {
    info!(
        "Starting {} v{} (git {}, built {})",
        binary,
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_GIT_HASH"),
        env!("BUILD_DATETIME"),
    );
}

/// Everything a binary does before serving its first request
pub fn init(binary: &str) {
    install_crypto_provider();
    init_tracing();
    log_build_info(binary);
}

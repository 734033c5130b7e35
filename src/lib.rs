//! MSF Blueprint Handlers Library
//!
//! CloudFormation custom-resource handlers that provision, start and tear down Managed Service
//! for Apache Flink applications, plus the helpers that seed their inputs (data streams,
//! release assets, notebooks).
//!
//! Each binary wires one [`lifecycle::LifecycleHandler`] to the Lambda runtime through
//! [`runtime::serve`]. The lifecycle core (watchdog, status poller, idempotency guard) lives in
//! [`lifecycle`]; remote services sit behind the traits in [`provider`].

pub mod backoff;
pub mod cfn;
pub mod config;
pub mod constants;
pub mod datagen;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod notebook;
pub mod observability;
pub mod properties;
pub mod provider;
pub mod runtime;

pub use error::{LifecycleError, LifecycleResult};

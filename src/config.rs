//! # Handler Configuration
//!
//! Configuration comes from the Lambda function's environment. Tunables have defaults from
//! [`crate::constants`]; handler inputs that a stack must provide are required and a missing
//! one fails the invocation with [`LifecycleError::MissingEnvironment`].
//!
//! Every loader takes a lookup function so tests can supply variables without touching the
//! process environment.

use crate::constants::{
    DEFAULT_POLL_INTERVAL_SECS, MAX_POLL_INTERVAL_SECS, MAX_WATCHDOG_TIMEOUT_SECS,
};
use crate::error::{LifecycleError, LifecycleResult};
use std::sync::Arc;
use std::time::Duration;

/// Shared variable lookup, read on every invocation
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Lookup into the process environment
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// [`EnvLookup`] backed by the process environment
#[must_use]
pub fn process_env_lookup() -> EnvLookup {
    Arc::new(process_env)
}

/// Settings shared by every handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSettings {
    /// Watchdog budget (seconds)
    pub watchdog_timeout_secs: u64,
    /// Interval between status polls (seconds)
    pub poll_interval_secs: u64,
    /// Region override, otherwise the SDK default chain decides
    pub aws_region: Option<String>,
}

impl HandlerSettings {
    /// Defaults for a handler with the given watchdog budget
    #[must_use]
    pub fn with_budget(watchdog_timeout_secs: u64) -> Self {
        Self {
            watchdog_timeout_secs,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            aws_region: None,
        }
    }

    /// Load settings from the process environment
    #[must_use]
    pub fn from_env(default_budget_secs: u64) -> Self {
        Self::from_lookup(default_budget_secs, process_env)
    }

    /// Load settings through a lookup function, falling back to defaults
    pub fn from_lookup<F>(default_budget_secs: u64, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            watchdog_timeout_secs: var_or_default(
                &lookup,
                "WATCHDOG_TIMEOUT_SECS",
                default_budget_secs,
            )
            .min(MAX_WATCHDOG_TIMEOUT_SECS),
            poll_interval_secs: var_or_default(
                &lookup,
                "POLL_INTERVAL_SECS",
                DEFAULT_POLL_INTERVAL_SECS,
            )
            .clamp(1, MAX_POLL_INTERVAL_SECS),
            aws_region: lookup("AWS_REGION").filter(|v| !v.is_empty()),
        }
    }

    #[must_use]
    pub fn watchdog_budget(&self) -> Duration {
        Duration::from_secs(self.watchdog_timeout_secs)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Read a variable and parse it, or return the default when unset or unparsable
fn var_or_default<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read a required, non-empty variable
fn required<F>(lookup: &F, key: &str) -> LifecycleResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| LifecycleError::MissingEnvironment(key.to_string()))
}

/// Inputs of the Studio application handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioAppConfig {
    pub app_name: String,
    pub execution_role: String,
    /// Kafka bootstrap servers the notebook's source table reads from
    pub bootstrap_servers: String,
    pub subnet_id: String,
    pub source_topic: String,
    pub security_group_id: String,
    pub glue_database_arn: String,
    pub log_stream_arn: String,
    pub runtime_environment: String,
    pub blueprint_name: String,
    pub stack_id: String,
}

impl StudioAppConfig {
    /// # Errors
    ///
    /// Returns [`LifecycleError::MissingEnvironment`] naming the first missing variable.
    pub fn from_lookup<F>(lookup: F) -> LifecycleResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            app_name: required(&lookup, "app_name")?,
            execution_role: required(&lookup, "execution_role")?,
            bootstrap_servers: required(&lookup, "bootstrap_string")?,
            subnet_id: required(&lookup, "subnet_1")?,
            source_topic: required(&lookup, "source_topic_name")?,
            security_group_id: required(&lookup, "security_group")?,
            glue_database_arn: required(&lookup, "glue_db_arn")?,
            log_stream_arn: required(&lookup, "log_stream_arn")?,
            runtime_environment: required(&lookup, "RuntimeEnvironment")?,
            blueprint_name: required(&lookup, "blueprintName")?,
            stack_id: required(&lookup, "stackId")?,
        })
    }
}

/// Inputs of the notebook run handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookRunConfig {
    pub app_name: String,
}

impl NotebookRunConfig {
    /// # Errors
    ///
    /// Returns [`LifecycleError::MissingEnvironment`] when `AppName` is unset.
    pub fn from_lookup<F>(lookup: F) -> LifecycleResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            app_name: required(&lookup, "AppName")?,
        })
    }
}

/// Inputs of the asset copy handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyAssetsConfig {
    /// Asset URLs in the order they were listed
    pub asset_urls: Vec<String>,
    pub bucket_name: String,
}

impl CopyAssetsConfig {
    /// # Errors
    ///
    /// Returns [`LifecycleError::MissingEnvironment`] when `AssetList` or `bucketName` is unset.
    pub fn from_lookup<F>(lookup: F) -> LifecycleResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let asset_list = required(&lookup, "AssetList")?;
        Ok(Self {
            asset_urls: asset_list
                .split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(ToString::to_string)
                .collect(),
            bucket_name: required(&lookup, "bucketName")?,
        })
    }
}

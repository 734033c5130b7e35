//! # Lifecycle Errors
//!
//! Every failure a handler can hit ends up as one of these variants. The dispatcher turns
//! whichever one surfaces into a single FAILED outcome carrying its `Display` text, so the
//! messages here are what CloudFormation shows to the stack operator.

use crate::provider::ApplicationStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The watchdog budget elapsed before the lifecycle operation finished
    #[error("Operation timed out")]
    Timeout,

    /// The start poller observed a status that is neither transient nor RUNNING
    #[error("Unable to start the app in state: {status}")]
    UnableToStart { status: ApplicationStatus },

    #[error("Unknown RequestType: {0}")]
    UnknownRequestType(String),

    #[error("Missing required resource property: {0}")]
    MissingProperty(String),

    #[error("Invalid resource property {name}: {reason}")]
    InvalidProperty { name: String, reason: String },

    #[error("Missing required environment variable: {0}")]
    MissingEnvironment(String),

    #[error("Application {0} does not exist")]
    ApplicationNotFound(String),

    /// The delete call needs the create timestamp reported by `describe`
    #[error("Application {0} has no create timestamp, cannot delete it")]
    MissingCreateTimestamp(String),

    #[error("Unable to get pre signed url for app")]
    PresignedUrlUnavailable,

    #[error("Unrecognized String in Bootstrapping List: {0}")]
    DisallowedAsset(String),

    /// Any error returned by a remote client, rendered with its full context chain
    #[error("{0:#}")]
    Remote(#[from] anyhow::Error),
}

impl LifecycleError {
    /// Shorthand for [`LifecycleError::InvalidProperty`]
    pub fn invalid_property(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProperty {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the request or the environment rather than a remote call
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownRequestType(_)
                | Self::MissingProperty(_)
                | Self::InvalidProperty { .. }
                | Self::MissingEnvironment(_)
                | Self::DisallowedAsset(_)
        )
    }
}

pub type LifecycleResult<T> = std::result::Result<T, LifecycleError>;

//! # Outcome Reporting
//!
//! Delivers the final status of an invocation to the pre-signed response URL CloudFormation
//! included in the request. The stack waits on this PUT; an invocation that never delivers
//! leaves the stack hanging until CloudFormation's own hour-long timeout.

use crate::backoff::FibonacciBackoff;
use crate::cfn::event::{CustomResourceRequest, InvocationContext};
use crate::constants::{
    RESPONSE_ATTEMPT_TIMEOUT_MS, RESPONSE_BACKOFF_MAX_MS, RESPONSE_BACKOFF_START_MS,
    RESPONSE_DELIVERY_ATTEMPTS,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

/// Final result of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: ResponseStatus,
    pub message: String,
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Failed,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseData {
    #[serde(rename = "Message")]
    pub message: String,
}

/// JSON document CloudFormation expects at the response URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseBody {
    pub status: ResponseStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    pub data: ResponseData,
}

impl ResponseBody {
    /// Build the response for an outcome
    ///
    /// The physical id of an existing resource is echoed back unchanged: handing CloudFormation
    /// a different id on Update would make it delete the "old" resource afterwards.
    #[must_use]
    pub fn new(
        request: &CustomResourceRequest,
        context: &InvocationContext,
        outcome: &Outcome,
    ) -> Self {
        let reason = match outcome.status {
            ResponseStatus::Success => format!(
                "See the details in CloudWatch Log Stream: {}",
                context.log_stream_name
            ),
            ResponseStatus::Failed => outcome.message.clone(),
        };
        Self {
            status: outcome.status,
            reason,
            physical_resource_id: request
                .physical_resource_id
                .clone()
                .unwrap_or_else(|| context.log_stream_name.clone()),
            stack_id: request.stack_id.clone(),
            request_id: request.request_id.clone(),
            logical_resource_id: request.logical_resource_id.clone(),
            no_echo: false,
            data: ResponseData {
                message: outcome.message.clone(),
            },
        }
    }
}

/// Sink for the single outcome of an invocation
#[async_trait]
pub trait OutcomeReporter: Send + Sync {
    async fn report(
        &self,
        request: &CustomResourceRequest,
        context: &InvocationContext,
        outcome: &Outcome,
    ) -> Result<()>;
}

/// Why a single delivery attempt failed
#[derive(Debug, thiserror::Error)]
enum DeliveryError {
    /// 4xx: the URL expired or the body was refused, a retry gets the same answer
    #[error("CloudFormation response URL rejected the response with {0}")]
    Rejected(StatusCode),
    #[error("CloudFormation response URL returned {0}")]
    Unavailable(StatusCode),
    #[error("Failed to send response to CloudFormation")]
    Transport(#[from] reqwest::Error),
}

impl DeliveryError {
    fn is_retryable(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// Time left before the invocation's hard deadline, `None` without a deadline
fn time_left(context: &InvocationContext) -> Option<Duration> {
    context.deadline.map(|deadline| {
        deadline
            .duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO)
    })
}

/// Reports outcomes by PUTting them to the request's pre-signed response URL
///
/// Each attempt is bounded by the attempt timeout and by the time the invocation has left.
/// Only transport errors and 5xx replies are retried.
#[derive(Debug, Clone)]
pub struct CfnResponder {
    client: reqwest::Client,
    max_attempts: u32,
    attempt_timeout: Duration,
}

impl CfnResponder {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client for CloudFormation responses")?;
        Ok(Self {
            client,
            max_attempts: RESPONSE_DELIVERY_ATTEMPTS,
            attempt_timeout: Duration::from_millis(RESPONSE_ATTEMPT_TIMEOUT_MS),
        })
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[must_use]
    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    fn attempt_timeout(&self, context: &InvocationContext) -> Duration {
        time_left(context).map_or(self.attempt_timeout, |left| self.attempt_timeout.min(left))
    }

    async fn put_once(
        &self,
        url: &str,
        body: &str,
        timeout: Duration,
    ) -> std::result::Result<(), DeliveryError> {
        // The pre-signed URL is signed without a content type, sending one breaks the signature
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "")
            .timeout(timeout)
            .body(body.to_string())
            .send()
            .await?;
        let status = response.status();
        if status.is_client_error() {
            return Err(DeliveryError::Rejected(status));
        }
        if !status.is_success() {
            return Err(DeliveryError::Unavailable(status));
        }
        info!("CloudFormation response delivered: {}", status);
        Ok(())
    }
}

#[async_trait]
impl OutcomeReporter for CfnResponder {
    async fn report(
        &self,
        request: &CustomResourceRequest,
        context: &InvocationContext,
        outcome: &Outcome,
    ) -> Result<()> {
        let body = ResponseBody::new(request, context, outcome);
        let body = serde_json::to_string(&body).context("Failed to serialize response body")?;
        info!("Response body: {}", body);

        let mut backoff = FibonacciBackoff::new(RESPONSE_BACKOFF_START_MS, RESPONSE_BACKOFF_MAX_MS);
        let mut attempt = 1;
        loop {
            let timeout = self.attempt_timeout(context);
            let e = match self.put_once(&request.response_url, &body, timeout).await {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };
            if !e.is_retryable() {
                return Err(anyhow::Error::new(e).context("Not retrying CloudFormation response"));
            }
            if attempt >= self.max_attempts {
                return Err(anyhow::Error::new(e).context(format!(
                    "Giving up on CloudFormation response after {attempt} attempts"
                )));
            }

            let delay = backoff.next_backoff();
            if time_left(context).is_some_and(|left| left < delay + self.attempt_timeout) {
                return Err(anyhow::Error::new(e).context(format!(
                    "Giving up on CloudFormation response after {attempt} attempts, invocation deadline is too close for another"
                )));
            }
            warn!(
                "Response delivery attempt {}/{} failed: {:#}, retrying in {:?}",
                attempt,
                self.max_attempts,
                anyhow::Error::new(e),
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

//! # Lifecycle
//!
//! Drives one custom-resource invocation from request to reported outcome:
//!
//! 1. the watchdog is armed
//! 2. the request type selects provision, reconcile or decommission on the handler
//! 3. guarded actions and status polling run under the watchdog
//! 4. the result, whatever it is, becomes exactly one outcome and is reported once
//!
//! Errors never escape [`dispatch`]; [`run_invocation`] only fails when the outcome itself
//! cannot be delivered.

pub mod guard;
pub mod poller;
pub mod watchdog;

use crate::cfn::{
    CustomResourceRequest, InvocationContext, LifecycleOperation, Outcome, OutcomeReporter,
};
use crate::config::HandlerSettings;
use crate::error::LifecycleResult;
use anyhow::Result;
use async_trait::async_trait;
use tracing::{error, info, info_span, Instrument};

pub use guard::{ApplicationOperation, GuardOutcome};
pub use poller::{PollOutcome, StatusPoller};
pub use watchdog::Watchdog;

/// One custom-resource type
///
/// Each method returns the success message reported to CloudFormation.
#[async_trait]
pub trait LifecycleHandler: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// `Create`
    async fn provision(
        &self,
        request: &CustomResourceRequest,
        watchdog: &Watchdog,
    ) -> LifecycleResult<String>;

    /// `Update`
    async fn reconcile(
        &self,
        request: &CustomResourceRequest,
        watchdog: &Watchdog,
    ) -> LifecycleResult<String>;

    /// `Delete`
    async fn decommission(
        &self,
        request: &CustomResourceRequest,
        watchdog: &Watchdog,
    ) -> LifecycleResult<String>;
}

/// Route a request to the handler and turn the result into an outcome
///
/// The handler runs under `watchdog`; an unknown request type fails without reaching it.
pub async fn dispatch(
    handler: &dyn LifecycleHandler,
    request: &CustomResourceRequest,
    watchdog: &Watchdog,
) -> Outcome {
    let result = match request.operation() {
        Ok(operation) => {
            info!("{} handling {}", handler.name(), operation);
            watchdog
                .run(async {
                    match operation {
                        LifecycleOperation::Provision => handler.provision(request, watchdog).await,
                        LifecycleOperation::Reconcile => handler.reconcile(request, watchdog).await,
                        LifecycleOperation::Decommission => {
                            handler.decommission(request, watchdog).await
                        }
                    }
                })
                .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(message) => {
            info!("Succeeded: {}", message);
            Outcome::success(message)
        }
        Err(e) => {
            if e.is_validation() {
                error!("Rejected request: {}", e);
            } else {
                error!("Failed: {}", e);
            }
            Outcome::failed(e.to_string())
        }
    }
}

/// Handle one invocation end to end and report its outcome exactly once
///
/// # Errors
///
/// Returns an error only when the outcome could not be delivered to the reporter.
pub async fn run_invocation(
    handler: &dyn LifecycleHandler,
    reporter: &dyn OutcomeReporter,
    settings: &HandlerSettings,
    request: &CustomResourceRequest,
    context: &InvocationContext,
) -> Result<Outcome> {
    let span = info_span!(
        "invocation",
        handler = handler.name(),
        request_id = %context.request_id,
        logical_resource_id = %request.logical_resource_id,
    );
    async move {
        info!("Request received: {:?}", request);
        let watchdog = Watchdog::arm_for_invocation(settings.watchdog_budget(), context.deadline);
        info!("Watchdog armed with a budget of {:?}", watchdog.budget());

        let outcome = dispatch(handler, request, &watchdog).await;
        reporter.report(request, context, &outcome).await?;
        Ok(outcome)
    }
    .instrument(span)
    .await
}

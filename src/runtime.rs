//! # Lambda Runtime
//!
//! Glue between the Lambda runtime and [`run_invocation`]. The function result is the
//! reported outcome; the invocation itself only errors when the outcome could not be
//! delivered to CloudFormation.

use crate::cfn::{CfnResponder, CustomResourceRequest, InvocationContext, Outcome};
use crate::config::HandlerSettings;
use crate::lifecycle::{run_invocation, LifecycleHandler};
use lambda_runtime::{service_fn, Context, LambdaEvent};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

/// Function result returned to the Lambda runtime
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvocationSummary {
    pub status: crate::cfn::ResponseStatus,
    pub message: String,
}

impl From<Outcome> for InvocationSummary {
    fn from(outcome: Outcome) -> Self {
        Self {
            status: outcome.status,
            message: outcome.message,
        }
    }
}

/// Invocation details from the runtime context
#[must_use]
pub fn invocation_context(context: &Context) -> InvocationContext {
    InvocationContext {
        request_id: context.request_id.clone(),
        log_stream_name: context.env_config.log_stream.clone(),
        deadline: (context.deadline > 0)
            .then(|| UNIX_EPOCH + Duration::from_millis(context.deadline)),
    }
}

/// Serve custom-resource requests with `handler` until the runtime shuts down
///
/// # Errors
///
/// Returns the runtime's error if the event loop fails.
pub async fn serve(
    handler: Arc<dyn LifecycleHandler>,
    settings: HandlerSettings,
) -> Result<(), lambda_runtime::Error> {
    let reporter = Arc::new(CfnResponder::new()?);
    let settings = Arc::new(settings);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<CustomResourceRequest>| {
        let handler = Arc::clone(&handler);
        let reporter = Arc::clone(&reporter);
        let settings = Arc::clone(&settings);
        async move {
            let context = invocation_context(&event.context);
            let outcome = run_invocation(
                handler.as_ref(),
                reporter.as_ref(),
                &settings,
                &event.payload,
                &context,
            )
            .await?;
            Ok::<_, lambda_runtime::Error>(InvocationSummary::from(outcome))
        }
    }))
    .await
}

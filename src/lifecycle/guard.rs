//! # Idempotency Guard
//!
//! Create, start and delete of a managed application, each safe to repeat. Every action is
//! gated on a fresh `describe`: a create against an existing application and a delete against
//! a missing one are no-ops, never failures.
//!
//! Handlers describe what they want as an [`ApplicationOperation`] and hand it to
//! [`execute`], so the create/start/delete sequences exist once.

use crate::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::poller::{start_policy, update_settled_policy, PollOutcome, StatusPoller};
use crate::provider::{ApplicationClient, ApplicationStatus, CreateApplicationRequest};
use tracing::{info, info_span, Instrument};

/// Whether a guarded action changed anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The remote call was made
    Applied,
    /// The application was already in the desired state
    AlreadySatisfied,
    /// The application reached this status
    Settled(ApplicationStatus),
}

/// One action against a managed application
#[derive(Debug, Clone, PartialEq)]
pub enum ApplicationOperation {
    Create(Box<CreateApplicationRequest>),
    Start { name: String },
    Delete { name: String },
    /// Report success without touching the application
    Skip,
}

/// Execute an operation against the application
///
/// # Errors
///
/// Propagates the error of the underlying guarded action.
pub async fn execute(
    client: &dyn ApplicationClient,
    poller: &StatusPoller,
    operation: ApplicationOperation,
) -> LifecycleResult<GuardOutcome> {
    match operation {
        ApplicationOperation::Create(request) => idempotent_create(client, &request).await,
        ApplicationOperation::Start { name } => idempotent_start(client, poller, &name).await,
        ApplicationOperation::Delete { name } => idempotent_delete(client, poller, &name).await,
        ApplicationOperation::Skip => Ok(GuardOutcome::AlreadySatisfied),
    }
}

/// Create the application unless it already exists
///
/// # Errors
///
/// Propagates describe errors other than "not found", and create errors.
pub async fn idempotent_create(
    client: &dyn ApplicationClient,
    request: &CreateApplicationRequest,
) -> LifecycleResult<GuardOutcome> {
    let span = info_span!("lifecycle.create", application = %request.name);
    async move {
        if let Some(existing) = client.describe_application(&request.name).await? {
            info!(
                "App already exists in status {}, nothing to create",
                existing.status
            );
            return Ok(GuardOutcome::AlreadySatisfied);
        }

        info!("App doesn't exist yet, creating it");
        client.create_application(request).await?;
        info!("Create accepted");
        Ok(GuardOutcome::Applied)
    }
    .instrument(span)
    .await
}

/// Start the application if it is READY, then wait for it to be RUNNING
///
/// An application that is already STARTING or RUNNING is not started again.
///
/// # Errors
///
/// - [`LifecycleError::ApplicationNotFound`] if the application does not exist
/// - [`LifecycleError::UnableToStart`] if it settles in any status but RUNNING
/// - [`LifecycleError::Timeout`] if the poller's deadline passes first
pub async fn idempotent_start(
    client: &dyn ApplicationClient,
    poller: &StatusPoller,
    name: &str,
) -> LifecycleResult<GuardOutcome> {
    let span = info_span!("lifecycle.start", application = %name);
    async move {
        let detail = client
            .describe_application(name)
            .await?
            .ok_or_else(|| LifecycleError::ApplicationNotFound(name.to_string()))?;

        // A successful start moves the application out of READY
        if detail.status == ApplicationStatus::Ready {
            info!("App is READY, starting it");
            client.start_application(name).await?;
        } else {
            info!("App is {}, not calling start", detail.status);
        }

        match poller.poll_until(client, name, start_policy).await? {
            PollOutcome::Converged(status) => Ok(GuardOutcome::Settled(status)),
            PollOutcome::Failed(status) => Err(LifecycleError::UnableToStart { status }),
            PollOutcome::TimedOut => Err(LifecycleError::Timeout),
        }
    }
    .instrument(span)
    .await
}

/// Delete the application if it exists
///
/// A VPC attachment is detached first, using the version observed by the describe call, and
/// the delete waits until the application has left UPDATING. The delete then uses the create
/// timestamp from that first describe.
///
/// # Errors
///
/// - [`LifecycleError::MissingCreateTimestamp`] if describe did not report one
/// - [`LifecycleError::Timeout`] if the application stays UPDATING past the deadline
/// - any describe, detach or delete error
pub async fn idempotent_delete(
    client: &dyn ApplicationClient,
    poller: &StatusPoller,
    name: &str,
) -> LifecycleResult<GuardOutcome> {
    let span = info_span!("lifecycle.delete", application = %name);
    async move {
        let Some(detail) = client.describe_application(name).await? else {
            info!("App doesn't exist or already deleted");
            return Ok(GuardOutcome::AlreadySatisfied);
        };
        info!("App exists in status {}, going to delete it", detail.status);

        let create_timestamp = detail
            .create_timestamp
            .ok_or_else(|| LifecycleError::MissingCreateTimestamp(name.to_string()))?;

        if let Some(vpc_configuration_id) = detail.vpc_configuration_id.as_deref() {
            info!(
                "Detaching VPC configuration {} at version {}",
                vpc_configuration_id, detail.version_id
            );
            client
                .delete_application_vpc_configuration(name, detail.version_id, vpc_configuration_id)
                .await?;

            match poller.poll_until(client, name, update_settled_policy).await? {
                PollOutcome::Converged(status) | PollOutcome::Failed(status) => {
                    info!("App is done updating ({}), proceeding with delete", status);
                }
                PollOutcome::TimedOut => return Err(LifecycleError::Timeout),
            }
        }

        client.delete_application(name, create_timestamp).await?;
        info!("Delete accepted");
        Ok(GuardOutcome::Applied)
    }
    .instrument(span)
    .await
}

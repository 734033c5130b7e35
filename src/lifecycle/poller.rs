//! # Status Poller
//!
//! Blocks an invocation until an application leaves a transient status. Each iteration makes
//! one `describe` call and hands the observed status to a policy; the policy either keeps the
//! poller waiting or ends the wait with a [`PollOutcome`].

use crate::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::watchdog::Watchdog;
use crate::provider::{ApplicationClient, ApplicationStatus};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// How a wait for a status transition ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Reached the expected status
    Converged(ApplicationStatus),
    /// Reached a status the policy treats as a failure
    Failed(ApplicationStatus),
    /// The deadline passed while the status was still transient
    TimedOut,
}

/// Decides, for an observed status, whether to keep waiting (`None`) or stop
pub type PollPolicy = fn(&ApplicationStatus) -> Option<PollOutcome>;

/// Wait for a start: STARTING is transient, RUNNING converges, anything else fails
#[must_use]
pub fn start_policy(status: &ApplicationStatus) -> Option<PollOutcome> {
    match status {
        ApplicationStatus::Starting => None,
        ApplicationStatus::Running => Some(PollOutcome::Converged(status.clone())),
        other => Some(PollOutcome::Failed(other.clone())),
    }
}

/// Wait for a configuration update: UPDATING is transient, any other status ends the wait
///
/// No status is treated as a failure here. A status such as ROLLED_BACK after a detach still
/// lets the caller proceed.
#[must_use]
pub fn update_settled_policy(status: &ApplicationStatus) -> Option<PollOutcome> {
    match status {
        ApplicationStatus::Updating => None,
        other => Some(PollOutcome::Converged(other.clone())),
    }
}

/// Fixed-interval status poller
#[derive(Debug, Clone, Copy)]
pub struct StatusPoller {
    interval: Duration,
    deadline: Option<Instant>,
}

impl StatusPoller {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// Stop polling once the watchdog's deadline has passed
    #[must_use]
    pub fn bounded_by(mut self, watchdog: &Watchdog) -> Self {
        self.deadline = Some(watchdog.deadline());
        self
    }

    /// Poll `name` until `policy` ends the wait
    ///
    /// The first `describe` happens immediately; a sleep of one interval separates each pair
    /// of consecutive calls, so a sequence of n statuses costs n - 1 sleeps.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::ApplicationNotFound`] if the application disappears while
    /// being polled, or the describe call's error.
    pub async fn poll_until(
        &self,
        client: &dyn ApplicationClient,
        name: &str,
        policy: PollPolicy,
    ) -> LifecycleResult<PollOutcome> {
        let mut attempts: u32 = 0;
        loop {
            let detail = client
                .describe_application(name)
                .await?
                .ok_or_else(|| LifecycleError::ApplicationNotFound(name.to_string()))?;
            attempts += 1;

            if let Some(outcome) = policy(&detail.status) {
                info!(
                    "Application {} status changed: {} after {} polls",
                    name, detail.status, attempts
                );
                return Ok(outcome);
            }

            if let Some(deadline) = self.deadline {
                let next_poll = Instant::now().checked_add(self.interval);
                if !matches!(next_poll, Some(next_poll) if next_poll <= deadline) {
                    info!(
                        "Application {} still {} at the deadline, giving up",
                        name, detail.status
                    );
                    return Ok(PollOutcome::TimedOut);
                }
            }

            debug!(
                "Application {} is still {}, sleeping {:?}",
                name, detail.status, self.interval
            );
            tokio::time::sleep(self.interval).await;
        }
    }
}

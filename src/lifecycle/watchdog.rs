//! # Watchdog
//!
//! A deadline armed when an invocation starts. The whole lifecycle operation runs under it;
//! when it fires the operation future is dropped, which abandons any in-flight remote call or
//! poll sleep, and the invocation fails with [`LifecycleError::Timeout`].
//!
//! The budget is capped by the time the platform leaves the invocation, minus a safety margin,
//! so the FAILED outcome can still be delivered before the runtime kills the process.

use crate::constants::{DEADLINE_SAFETY_MARGIN_MS, MAX_WATCHDOG_TIMEOUT_SECS};
use crate::error::{LifecycleError, LifecycleResult};
use std::future::Future;
use std::time::{Duration, SystemTime};
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
pub struct Watchdog {
    budget: Duration,
    deadline: Instant,
}

/// Budget left after capping `configured` by the time remaining before the hard deadline
#[must_use]
pub fn effective_budget(configured: Duration, remaining: Option<Duration>) -> Duration {
    match remaining {
        Some(remaining) => {
            let usable = remaining.saturating_sub(Duration::from_millis(DEADLINE_SAFETY_MARGIN_MS));
            configured.min(usable)
        }
        None => configured,
    }
}

impl Watchdog {
    /// Arm a watchdog that fires `budget` from now
    #[must_use]
    pub fn arm(budget: Duration) -> Self {
        let budget = budget.min(Duration::from_secs(MAX_WATCHDOG_TIMEOUT_SECS));
        Self {
            budget,
            deadline: Instant::now() + budget,
        }
    }

    /// Arm a watchdog for an invocation with an optional platform deadline
    #[must_use]
    pub fn arm_for_invocation(configured: Duration, platform_deadline: Option<SystemTime>) -> Self {
        let remaining = platform_deadline.map(|deadline| {
            deadline
                .duration_since(SystemTime::now())
                .unwrap_or(Duration::ZERO)
        });
        let budget = effective_budget(configured, remaining);
        if budget < configured {
            debug!(
                "Watchdog budget capped by invocation deadline: {:?} -> {:?}",
                configured, budget
            );
        }
        Self::arm(budget)
    }

    #[must_use]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Run an operation under the watchdog
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Timeout`] if the deadline passes first, otherwise whatever the
    /// operation returned.
    pub async fn run<F, T>(&self, operation: F) -> LifecycleResult<T>
    where
        F: Future<Output = LifecycleResult<T>>,
    {
        if let Ok(result) = tokio::time::timeout_at(self.deadline, operation).await {
            result
        } else {
            warn!("Watchdog fired after {:?}", self.budget);
            Err(LifecycleError::Timeout)
        }
    }
}

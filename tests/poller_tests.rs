//! # Status Poller Tests
//!
//! Runs the poller against scripted status sequences on tokio's paused clock, so elapsed
//! time is exactly the sum of the sleeps taken.

mod common;

use common::ScriptedApplicationClient;
use msf_blueprint_handlers::lifecycle::poller::{
    start_policy, update_settled_policy, PollOutcome, StatusPoller,
};
use msf_blueprint_handlers::lifecycle::Watchdog;
use msf_blueprint_handlers::provider::ApplicationStatus;
use msf_blueprint_handlers::LifecycleError;
use std::time::Duration;
use tokio::time::Instant;

const INTERVAL: Duration = Duration::from_secs(1);

#[tokio::test(start_paused = true)]
async fn test_converges_and_sleeps_between_each_status() {
    for starting in 0..5 {
        let mut statuses = vec!["STARTING"; starting];
        statuses.push("RUNNING");
        let client = ScriptedApplicationClient::with_statuses(&statuses);
        let poller = StatusPoller::new(INTERVAL);

        let started = Instant::now();
        let outcome = poller
            .poll_until(&client, "app", start_policy)
            .await
            .expect("poll should succeed");

        assert_eq!(outcome, PollOutcome::Converged(ApplicationStatus::Running));
        assert_eq!(client.describe_count(), statuses.len());
        assert_eq!(
            started.elapsed(),
            INTERVAL * u32::try_from(statuses.len() - 1).expect("small"),
            "sequence {statuses:?} should sleep len - 1 times"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_already_running_converges_without_sleeping() {
    let client = ScriptedApplicationClient::with_statuses(&["RUNNING"]);
    let started = Instant::now();

    let outcome = StatusPoller::new(INTERVAL)
        .poll_until(&client, "app", start_policy)
        .await
        .expect("poll should succeed");

    assert_eq!(outcome, PollOutcome::Converged(ApplicationStatus::Running));
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_unexpected_status_fails_without_further_sleep() {
    let client =
        ScriptedApplicationClient::with_statuses(&["STARTING", "STARTING", "FORCE_STOPPING"]);
    let started = Instant::now();

    let outcome = StatusPoller::new(INTERVAL)
        .poll_until(&client, "app", start_policy)
        .await
        .expect("poll should succeed");

    assert_eq!(outcome, PollOutcome::Failed(ApplicationStatus::ForceStopping));
    assert_eq!(started.elapsed(), Duration::from_secs(2));
    assert_eq!(client.describe_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_update_wait_treats_any_other_status_as_settled() {
    let client = ScriptedApplicationClient::with_statuses(&["UPDATING", "UPDATING", "ROLLED_BACK"]);

    let outcome = StatusPoller::new(INTERVAL)
        .poll_until(&client, "app", update_settled_policy)
        .await
        .expect("poll should succeed");

    assert_eq!(outcome, PollOutcome::Converged(ApplicationStatus::RolledBack));
}

#[tokio::test(start_paused = true)]
async fn test_poller_with_unbounded_interval_gives_up_without_sleeping() {
    let client = ScriptedApplicationClient::with_statuses(&["STARTING"]);
    let watchdog = Watchdog::arm(Duration::from_secs(5));
    let started = Instant::now();

    let outcome = StatusPoller::new(Duration::MAX)
        .bounded_by(&watchdog)
        .poll_until(&client, "app", start_policy)
        .await
        .expect("poll should succeed");

    assert_eq!(outcome, PollOutcome::TimedOut);
    assert_eq!(client.describe_count(), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_poller_stops_at_watchdog_deadline() {
    let client = ScriptedApplicationClient::with_statuses(&["STARTING"]);
    let watchdog = Watchdog::arm(Duration::from_secs(5));
    let started = Instant::now();

    let outcome = StatusPoller::new(INTERVAL)
        .bounded_by(&watchdog)
        .poll_until(&client, "app", start_policy)
        .await
        .expect("poll should succeed");

    assert_eq!(outcome, PollOutcome::TimedOut);
    assert_eq!(started.elapsed(), Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_application_vanishing_mid_poll_is_an_error() {
    let client = ScriptedApplicationClient::missing();

    let err = StatusPoller::new(INTERVAL)
        .poll_until(&client, "app", start_policy)
        .await
        .unwrap_err();

    assert!(matches!(err, LifecycleError::ApplicationNotFound(ref name) if name == "app"));
}

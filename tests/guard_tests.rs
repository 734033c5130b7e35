//! # Idempotency Guard Tests
//!
//! Create, start and delete against scripted application state.

mod common;

use common::{create_timestamp, Call, ScriptedApplicationClient};
use msf_blueprint_handlers::lifecycle::guard::{
    execute, idempotent_create, idempotent_delete, idempotent_start, ApplicationOperation,
    GuardOutcome,
};
use msf_blueprint_handlers::lifecycle::StatusPoller;
use msf_blueprint_handlers::properties::JavaAppProperties;
use msf_blueprint_handlers::provider::{ApplicationStatus, CreateApplicationRequest};
use msf_blueprint_handlers::LifecycleError;
use serde_json::json;
use std::time::Duration;
use tokio::time::Instant;

fn poller() -> StatusPoller {
    StatusPoller::new(Duration::from_secs(1))
}

fn create_request() -> CreateApplicationRequest {
    let props = json!({
        "AppName": "orders",
        "RuntimeEnvironment": "FLINK-1_15",
        "ServiceExecutionRole": "arn:aws:iam::123456789012:role/msf",
        "BucketArn": "arn:aws:s3:::artifacts",
        "FileKey": "orders.jar",
        "LogStreamArn": "arn:aws:logs:us-east-1:123456789012:log-group:g:log-stream:s"
    });
    JavaAppProperties::from_properties(props.as_object().expect("object"))
        .expect("valid properties")
        .to_create_request()
}

#[tokio::test]
async fn test_create_when_missing() {
    let client = ScriptedApplicationClient::missing();

    let outcome = idempotent_create(&client, &create_request())
        .await
        .expect("create should succeed");

    assert_eq!(outcome, GuardOutcome::Applied);
    assert_eq!(client.created(), vec![create_request()]);
}

#[tokio::test]
async fn test_create_skipped_when_present() {
    let client = ScriptedApplicationClient::with_statuses(&["RUNNING"]);

    let outcome = idempotent_create(&client, &create_request())
        .await
        .expect("create should succeed");

    assert_eq!(outcome, GuardOutcome::AlreadySatisfied);
    assert!(client.created().is_empty());
}

#[tokio::test]
async fn test_create_twice_creates_once() {
    let client = ScriptedApplicationClient::missing();

    idempotent_create(&client, &create_request())
        .await
        .expect("first create");
    let second = idempotent_create(&client, &create_request())
        .await
        .expect("second create");

    assert_eq!(second, GuardOutcome::AlreadySatisfied);
    assert_eq!(client.created().len(), 1);
}

#[tokio::test]
async fn test_describe_failure_is_not_masked() {
    let client = ScriptedApplicationClient::missing().with_describe_error("AccessDeniedException");

    let err = idempotent_create(&client, &create_request())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("AccessDeniedException"));
    assert!(client.created().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_start_ready_application() {
    let client = ScriptedApplicationClient::with_statuses(&["READY", "RUNNING"]);
    let started = Instant::now();

    let outcome = idempotent_start(&client, &poller(), "app")
        .await
        .expect("start should succeed");

    assert_eq!(outcome, GuardOutcome::Settled(ApplicationStatus::Running));
    assert_eq!(client.mutations(), vec![Call::Start("app".to_string())]);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_start_skipped_when_running() {
    let client = ScriptedApplicationClient::with_statuses(&["RUNNING", "RUNNING"]);

    idempotent_start(&client, &poller(), "app")
        .await
        .expect("start should succeed");

    assert!(client.mutations().is_empty());
    assert_eq!(client.describe_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_start_waits_through_starting() {
    let client =
        ScriptedApplicationClient::with_statuses(&["READY", "STARTING", "STARTING", "RUNNING"]);
    let started = Instant::now();

    idempotent_start(&client, &poller(), "app")
        .await
        .expect("start should succeed");

    assert_eq!(started.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_start_fails_in_unexpected_state() {
    let client = ScriptedApplicationClient::with_statuses(&["READY", "READY"]);

    let err = idempotent_start(&client, &poller(), "app")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Unable to start the app in state: READY");
}

#[tokio::test]
async fn test_start_missing_application() {
    let client = ScriptedApplicationClient::missing();

    let err = idempotent_start(&client, &poller(), "app")
        .await
        .unwrap_err();

    assert!(matches!(err, LifecycleError::ApplicationNotFound(_)));
}

#[tokio::test(start_paused = true)]
async fn test_delete_detaches_vpc_then_waits_then_deletes() {
    let client =
        ScriptedApplicationClient::with_statuses(&["RUNNING", "UPDATING", "UPDATING", "READY"])
            .with_vpc("vpc-config-1");
    let started = Instant::now();

    let outcome = idempotent_delete(&client, &poller(), "studio")
        .await
        .expect("delete should succeed");

    assert_eq!(outcome, GuardOutcome::Applied);
    assert_eq!(
        client.mutations(),
        vec![
            Call::DetachVpc {
                name: "studio".to_string(),
                version_id: 3,
                vpc_configuration_id: "vpc-config-1".to_string(),
            },
            Call::Delete {
                name: "studio".to_string(),
                create_timestamp: create_timestamp(),
            },
        ]
    );
    assert_eq!(started.elapsed(), Duration::from_secs(2));
}

#[tokio::test]
async fn test_delete_without_vpc_skips_detach() {
    let client = ScriptedApplicationClient::with_statuses(&["RUNNING"]);

    idempotent_delete(&client, &poller(), "orders")
        .await
        .expect("delete should succeed");

    assert_eq!(
        client.mutations(),
        vec![Call::Delete {
            name: "orders".to_string(),
            create_timestamp: create_timestamp(),
        }]
    );
}

#[tokio::test]
async fn test_delete_missing_application_is_a_no_op() {
    let client = ScriptedApplicationClient::missing();

    let outcome = idempotent_delete(&client, &poller(), "orders")
        .await
        .expect("delete should succeed");

    assert_eq!(outcome, GuardOutcome::AlreadySatisfied);
    assert!(client.mutations().is_empty());
}

#[tokio::test]
async fn test_execute_routes_descriptors() {
    let client = ScriptedApplicationClient::missing();

    let created = execute(
        &client,
        &poller(),
        ApplicationOperation::Create(Box::new(create_request())),
    )
    .await
    .expect("create");
    let skipped = execute(&client, &poller(), ApplicationOperation::Skip)
        .await
        .expect("skip");
    let deleted = execute(
        &client,
        &poller(),
        ApplicationOperation::Delete {
            name: "orders".to_string(),
        },
    )
    .await
    .expect("delete");

    assert_eq!(created, GuardOutcome::Applied);
    assert_eq!(skipped, GuardOutcome::AlreadySatisfied);
    assert_eq!(deleted, GuardOutcome::Applied);
    assert_eq!(client.mutations().len(), 2);
}

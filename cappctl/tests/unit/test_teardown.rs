//! Teardown workflow tests

mod support;

use cappctl::app::options::TeardownOptions;
use cappctl::deploy::fsm::TeardownState;
use cappctl::deploy::tasks::RESET_TASK;
use cappctl::deploy::teardown::tear_down;
use cappctl::errors::CappError;
use plunder_api::models::Envelope;
use tokio_test::{assert_err, assert_ok};

use support::{accepted, client, RecordingProgress};

fn options(address: &str, leave_deployment: bool) -> TeardownOptions {
    TeardownOptions {
        address: address.to_string(),
        leave_deployment,
    }
}

#[tokio::test]
async fn test_reset_then_remove_deployment() {
    let client = client(vec![accepted(), accepted()]);
    let progress = RecordingProgress::default();

    let state = assert_ok!(tear_down(&client, &options("10.0.0.5", false), &progress).await);
    assert_eq!(state, TeardownState::Done);

    let calls = client.gateway().calls();
    assert_eq!(calls.len(), 2);

    assert_eq!(calls[0].method, "POST");
    assert_eq!(calls[0].path, "/parlay");
    let reset = calls[0].body.as_ref().unwrap();
    assert_eq!(reset["deployments"][0]["name"], RESET_TASK);
    assert_eq!(reset["deployments"][0]["hosts"][0], "10.0.0.5");

    assert_eq!(calls[1].method, "DELETE");
    assert_eq!(calls[1].path, "/deployment/address/10-0-0-5");
}

#[tokio::test]
async fn test_leave_flag_keeps_deployment() {
    let client = client(vec![accepted()]);
    let progress = RecordingProgress::default();

    let state = assert_ok!(tear_down(&client, &options("10.0.0.5", true), &progress).await);
    assert_eq!(state, TeardownState::Done);

    let calls = client.gateway().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, "/parlay");
}

#[tokio::test]
async fn test_missing_address_is_usage_error() {
    let client = client(vec![]);
    let progress = RecordingProgress::default();

    let err = assert_err!(tear_down(&client, &options("", false), &progress).await);
    assert!(matches!(err, CappError::Usage(_)));
    assert!(client.gateway().calls().is_empty());
}

#[tokio::test]
async fn test_rejected_reset_skips_removal() {
    let client = client(vec![Envelope::rejected("", "host unknown to parlay")]);
    let progress = RecordingProgress::default();

    let err = assert_err!(tear_down(&client, &options("10.0.0.5", false), &progress).await);
    assert!(matches!(err, CappError::Rejected { .. }));
    assert_eq!(client.gateway().calls().len(), 1);
}

#[tokio::test]
async fn test_rejected_removal_is_fatal() {
    let client = client(vec![
        accepted(),
        Envelope::rejected("not found", "No deployment for 10-0-0-5"),
    ]);
    let progress = RecordingProgress::default();

    let err = assert_err!(tear_down(&client, &options("10.0.0.5", false), &progress).await);
    assert_eq!(err.to_string(), "Request rejected: No deployment for 10-0-0-5");
}

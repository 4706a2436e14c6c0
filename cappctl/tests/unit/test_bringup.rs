//! Bring-up workflow tests

mod support;

use std::time::Duration;

use cappctl::app::options::BringUpOptions;
use cappctl::deploy::bringup::bring_up;
use cappctl::deploy::fsm::BringUpState;
use cappctl::deploy::poll::PollOptions;
use cappctl::deploy::progress::Phase;
use cappctl::deploy::selector::LastEligible;
use cappctl::deploy::tasks::{KUBERNETES_TASK, LIVENESS_TASK};
use cappctl::errors::CappError;
use cappctl::models::task::TaskState;
use chrono::Utc;
use plunder_api::models::Envelope;
use tokio_test::{assert_err, assert_ok};

use support::{
    accepted, client, client_with, connection_refused, recording_sleep, task_log,
    RecordingProgress,
};

fn explicit_target() -> BringUpOptions {
    BringUpOptions {
        hardware_id: Some("00:50:56:a5:11:20".to_string()),
        address: "10.0.0.5".to_string(),
        ..Default::default()
    }
}

fn submitted_name(body: &Option<serde_json::Value>) -> String {
    body.as_ref().unwrap()["deployments"][0]["name"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_happy_path_with_explicit_target() {
    let client = client(vec![
        accepted(),            // deployment
        accepted(),            // liveness submit
        task_log("Running"),
        task_log("Running"),
        task_log("Completed"),
        accepted(),            // kubernetes submit
        task_log("Running"),
        task_log("Completed"),
    ]);
    let progress = RecordingProgress::default();
    let (sleeps, sleep_fn) = recording_sleep();

    let report = assert_ok!(
        bring_up(&client, &explicit_target(), &LastEligible::default(), &progress, sleep_fn).await
    );

    assert_eq!(report.state, BringUpState::Done);
    assert_eq!(report.target.hardware_id, "00:50:56:a5:11:20");
    assert_eq!(
        progress.finished(),
        vec![Phase::OsProvisioning, Phase::KubernetesInstall]
    );
    assert_eq!(progress.waiting(Phase::OsProvisioning), 2);
    assert_eq!(progress.waiting(Phase::KubernetesInstall), 1);

    let calls = client.gateway().calls();
    assert_eq!(calls.len(), 8);
    assert_eq!(client.gateway().remaining(), 0);

    // No lease lookup and no grace delay with an explicit target
    assert!(calls.iter().all(|c| !c.path.starts_with("/dhcp")));
    assert_eq!(sleeps.lock().unwrap().len(), 5);
    assert!(sleeps
        .lock()
        .unwrap()
        .iter()
        .all(|d| *d == Duration::from_secs(5)));

    assert_eq!(calls[0].method, "POST");
    assert_eq!(calls[0].path, "/deployment");
    let deployment = calls[0].body.as_ref().unwrap();
    assert_eq!(deployment["deployment"], "preseed");
    assert_eq!(deployment["mac"], "00:50:56:a5:11:20");
    assert_eq!(deployment["config"]["address"], "10.0.0.5");
    assert_eq!(deployment["config"]["hostname"], "Manager01");

    assert_eq!(calls[1].path, "/parlay");
    assert_eq!(submitted_name(&calls[1].body), LIVENESS_TASK);
    assert_eq!(calls[2].method, "GET");
    assert_eq!(calls[2].path, "/parlay/logs/10-0-0-5");
    assert_eq!(calls[5].path, "/parlay");
    assert_eq!(submitted_name(&calls[5].body), KUBERNETES_TASK);
    assert_eq!(calls[7].path, "/parlay/logs/10-0-0-5");
}

#[tokio::test]
async fn test_kubernetes_failure_aborts_without_cleanup() {
    let client = client(vec![
        accepted(),
        accepted(),
        task_log("Running"),
        task_log("Running"),
        task_log("Completed"),
        accepted(),
        task_log("Running"),
        task_log("Failed"),
    ]);
    let progress = RecordingProgress::default();
    let (_, sleep_fn) = recording_sleep();

    let err = assert_err!(
        bring_up(&client, &explicit_target(), &LastEligible::default(), &progress, sleep_fn).await
    );

    assert!(matches!(err, CappError::TaskFailed(_)));
    assert_eq!(progress.finished(), vec![Phase::OsProvisioning]);
    let calls = client.gateway().calls();
    assert_eq!(calls.len(), 8);
    assert!(calls.iter().all(|c| c.method != "DELETE"));
}

#[tokio::test]
async fn test_liveness_failure_keeps_polling() {
    // Only the Kubernetes phase treats Failed as terminal
    let client = client(vec![
        accepted(),
        accepted(),
        task_log("Failed"),
        task_log("Failed"),
        task_log("Completed"),
        accepted(),
        task_log("Completed"),
    ]);
    let progress = RecordingProgress::default();
    let (_, sleep_fn) = recording_sleep();

    let report = assert_ok!(
        bring_up(&client, &explicit_target(), &LastEligible::default(), &progress, sleep_fn).await
    );

    assert_eq!(report.state, BringUpState::Done);
    assert_eq!(progress.waiting(Phase::OsProvisioning), 2);
    assert!(progress.events().contains(&support::Event::Waiting(
        Phase::OsProvisioning,
        TaskState::Failed
    )));
}

#[tokio::test]
async fn test_unknown_state_keeps_polling_kubernetes() {
    let client = client(vec![
        accepted(),
        accepted(),
        task_log("Completed"),
        accepted(),
        task_log("Queued"),
        task_log("Running"),
        task_log("Completed"),
    ]);
    let progress = RecordingProgress::default();
    let (_, sleep_fn) = recording_sleep();

    assert_ok!(
        bring_up(&client, &explicit_target(), &LastEligible::default(), &progress, sleep_fn).await
    );
    assert_eq!(progress.waiting(Phase::KubernetesInstall), 2);
}

#[tokio::test]
async fn test_selects_last_eligible_lease_after_grace_period() {
    let now = Utc::now();
    let leases = serde_json::json!([
        { "nic": "aa:aa:aa:aa:aa:aa", "expiry": now - chrono::Duration::minutes(2) },
        { "nic": "bb:bb:bb:bb:bb:bb", "expiry": now - chrono::Duration::minutes(15) },
        { "nic": "cc:cc:cc:cc:cc:cc", "expiry": now - chrono::Duration::minutes(3) },
    ]);
    let client = client(vec![
        Envelope::with_payload(leases),
        accepted(),
        accepted(),
        task_log("Completed"),
        accepted(),
        task_log("Completed"),
    ]);
    let options = BringUpOptions {
        address: "10.0.0.5".to_string(),
        ..Default::default()
    };
    let progress = RecordingProgress::default();
    let (sleeps, sleep_fn) = recording_sleep();

    let report = assert_ok!(
        bring_up(&client, &options, &LastEligible::default(), &progress, sleep_fn).await
    );

    assert_eq!(report.target.hardware_id, "cc:cc:cc:cc:cc:cc");
    assert_eq!(sleeps.lock().unwrap()[0], Duration::from_secs(5));

    let calls = client.gateway().calls();
    assert_eq!(calls[0].method, "GET");
    assert_eq!(calls[0].path, "/dhcp/unleased");
    assert_eq!(calls[1].body.as_ref().unwrap()["mac"], "cc:cc:cc:cc:cc:cc");
}

#[tokio::test]
async fn test_no_free_hardware_aborts_before_deploying() {
    let now = Utc::now();
    let leases = serde_json::json!([
        { "nic": "aa:aa:aa:aa:aa:aa", "expiry": now - chrono::Duration::minutes(30) },
    ]);
    let client = client(vec![Envelope::with_payload(leases)]);
    let options = BringUpOptions {
        address: "10.0.0.5".to_string(),
        ..Default::default()
    };
    let progress = RecordingProgress::default();
    let (_, sleep_fn) = recording_sleep();

    let err = assert_err!(
        bring_up(&client, &options, &LastEligible::default(), &progress, sleep_fn).await
    );

    assert!(matches!(err, CappError::NoFreeHardware));
    assert_eq!(client.gateway().calls().len(), 1);
}

#[tokio::test]
async fn test_rejected_lease_lookup_is_fatal() {
    let client = client(vec![Envelope::rejected("", "dhcp server not running")]);
    let options = BringUpOptions {
        address: "10.0.0.5".to_string(),
        ..Default::default()
    };
    let progress = RecordingProgress::default();
    let (_, sleep_fn) = recording_sleep();

    let err = assert_err!(
        bring_up(&client, &options, &LastEligible::default(), &progress, sleep_fn).await
    );
    assert!(matches!(err, CappError::Rejected { .. }));
}

#[tokio::test]
async fn test_rejected_deployment_is_fatal() {
    let client = client(vec![Envelope::rejected("duplicate entry", "Deployment already exists")]);
    let progress = RecordingProgress::default();
    let (_, sleep_fn) = recording_sleep();

    let err = assert_err!(
        bring_up(&client, &explicit_target(), &LastEligible::default(), &progress, sleep_fn).await
    );

    assert_eq!(err.to_string(), "Request rejected: Deployment already exists");
    assert_eq!(client.gateway().calls().len(), 1);
}

#[tokio::test]
async fn test_bounded_polling_times_out() {
    let client = client(vec![
        accepted(),
        accepted(),
        task_log("Running"),
        task_log("Running"),
    ]);
    let options = BringUpOptions {
        poll: PollOptions {
            interval: Duration::from_secs(1),
            max_attempts: Some(2),
        },
        ..explicit_target()
    };
    let progress = RecordingProgress::default();
    let (sleeps, sleep_fn) = recording_sleep();

    let err = assert_err!(
        bring_up(&client, &options, &LastEligible::default(), &progress, sleep_fn).await
    );

    assert!(matches!(err, CappError::PollTimeout { attempts: 2, .. }));
    assert_eq!(sleeps.lock().unwrap().as_slice(), &[Duration::from_secs(1); 2]);
}

#[tokio::test]
async fn test_resubmits_liveness_before_each_poll() {
    let client = client(vec![
        accepted(),
        accepted(),
        task_log("Failed"),
        accepted(),
        task_log("Completed"),
        accepted(),
        task_log("Completed"),
    ]);
    let options = BringUpOptions {
        resubmit_liveness: true,
        ..explicit_target()
    };
    let progress = RecordingProgress::default();
    let (_, sleep_fn) = recording_sleep();

    assert_ok!(bring_up(&client, &options, &LastEligible::default(), &progress, sleep_fn).await);

    let calls = client.gateway().calls();
    let methods: Vec<_> = calls.iter().map(|c| c.method).collect();
    assert_eq!(
        methods,
        vec!["POST", "POST", "GET", "POST", "GET", "POST", "GET"]
    );
    assert_eq!(submitted_name(&calls[3].body), LIVENESS_TASK);
    assert_eq!(submitted_name(&calls[5].body), KUBERNETES_TASK);
}

#[tokio::test]
async fn test_invalid_address_is_usage_error() {
    let client = client(vec![]);
    let options = BringUpOptions {
        address: "10.0.0".to_string(),
        ..explicit_target()
    };
    let progress = RecordingProgress::default();
    let (_, sleep_fn) = recording_sleep();

    let err = assert_err!(
        bring_up(&client, &options, &LastEligible::default(), &progress, sleep_fn).await
    );
    assert!(matches!(err, CappError::Usage(_)));
    assert!(client.gateway().calls().is_empty());
}

#[tokio::test]
async fn test_rejected_liveness_submit_is_fatal() {
    let client = client(vec![
        accepted(),
        Envelope::rejected("", "parlay is busy"),
        task_log("Completed"),
    ]);
    let progress = RecordingProgress::default();
    let (sleeps, sleep_fn) = recording_sleep();

    let err = assert_err!(
        bring_up(&client, &explicit_target(), &LastEligible::default(), &progress, sleep_fn).await
    );

    assert!(matches!(err, CappError::Rejected { .. }));
    assert_eq!(client.gateway().calls().len(), 2);
    assert_eq!(client.gateway().remaining(), 1);
    assert!(sleeps.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_liveness_poll_is_fatal() {
    let client = client(vec![
        accepted(),
        accepted(),
        Envelope::rejected("no logs", "No logs for 10-0-0-5"),
        task_log("Completed"),
    ]);
    let progress = RecordingProgress::default();
    let (sleeps, sleep_fn) = recording_sleep();

    let err = assert_err!(
        bring_up(&client, &explicit_target(), &LastEligible::default(), &progress, sleep_fn).await
    );

    assert_eq!(err.to_string(), "Request rejected: No logs for 10-0-0-5");
    assert_eq!(client.gateway().calls().len(), 3);
    assert_eq!(client.gateway().remaining(), 1);
    assert_eq!(sleeps.lock().unwrap().len(), 1);
    assert!(progress.finished().is_empty());
}

#[tokio::test]
async fn test_rejected_kubernetes_submit_is_fatal() {
    let client = client(vec![
        accepted(),
        accepted(),
        task_log("Completed"),
        Envelope::rejected("", "parlay is busy"),
        task_log("Completed"),
    ]);
    let progress = RecordingProgress::default();
    let (_, sleep_fn) = recording_sleep();

    let err = assert_err!(
        bring_up(&client, &explicit_target(), &LastEligible::default(), &progress, sleep_fn).await
    );

    assert!(matches!(err, CappError::Rejected { .. }));
    let calls = client.gateway().calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(submitted_name(&calls[3].body), KUBERNETES_TASK);
    assert_eq!(client.gateway().remaining(), 1);
    assert_eq!(progress.finished(), vec![Phase::OsProvisioning]);
}

#[tokio::test]
async fn test_transport_error_mid_poll_is_not_retried() {
    let client = client_with(vec![
        Ok(accepted()),
        Ok(accepted()),
        Ok(task_log("Completed")),
        Ok(accepted()),
        Ok(task_log("Running")),
        Err(connection_refused()),
        Ok(task_log("Completed")),
    ]);
    let progress = RecordingProgress::default();
    let (_, sleep_fn) = recording_sleep();

    let err = assert_err!(
        bring_up(&client, &explicit_target(), &LastEligible::default(), &progress, sleep_fn).await
    );

    assert!(matches!(err, CappError::IoError(_)));
    assert_eq!(client.gateway().calls().len(), 6);
    assert_eq!(client.gateway().remaining(), 1);
}

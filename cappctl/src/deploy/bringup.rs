//! Management cluster bring-up
//!
//! Selects hardware, registers the OS deployment, waits for the installed OS
//! to answer, then installs Kubernetes and waits for that to finish. Every
//! API error aborts the run; nothing already submitted is rolled back.

use std::future::Future;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{error, info, warn};

use crate::app::options::BringUpOptions;
use crate::deploy::fsm::{BringUpEvent, BringUpFsm, BringUpState};
use crate::deploy::poll::{wait_for_task, PollOutcome, Watch};
use crate::deploy::progress::{Phase, Progress};
use crate::deploy::selector::LeaseSelector;
use crate::deploy::tasks;
use crate::errors::CappError;
use crate::http::client::{Gateway, PlunderClient};
use crate::models::host::{validate_address, HostTarget, PRESEED_CONFIG};
use crate::models::task::TaskState;

/// Summary of a successful bring-up
#[derive(Debug, Clone)]
pub struct BringUpReport {
    pub target: HostTarget,
    pub state: BringUpState,
    pub os_elapsed: Duration,
    pub kubernetes_elapsed: Duration,
}

/// Run the bring-up workflow to completion
pub async fn bring_up<G, S, F>(
    client: &PlunderClient<G>,
    options: &BringUpOptions,
    selector: &dyn LeaseSelector,
    progress: &dyn Progress,
    sleep_fn: S,
) -> Result<BringUpReport, CappError>
where
    G: Gateway,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    validate_address(&options.address)?;

    let mut fsm = BringUpFsm::new();
    match run(&mut fsm, client, options, selector, progress, &sleep_fn).await {
        Ok(report) => Ok(report),
        Err(e) => {
            if fsm.process(BringUpEvent::Fail(e.to_string())).is_ok() {
                error!(state = ?fsm.state(), "Bring-up aborted: {}", e);
            }
            Err(e)
        }
    }
}

async fn run<G, S, F>(
    fsm: &mut BringUpFsm,
    client: &PlunderClient<G>,
    options: &BringUpOptions,
    selector: &dyn LeaseSelector,
    progress: &dyn Progress,
    sleep_fn: &S,
) -> Result<BringUpReport, CappError>
where
    G: Gateway,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    progress.message("Beginning the deployment of a new host");

    // SelectingTarget
    let hardware_id = match options.hardware_id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => id.to_string(),
        None => select_hardware(client, options, selector, progress, sleep_fn).await?,
    };
    let target = HostTarget::new(hardware_id, options.address.clone(), options.host_name.clone());
    info!(hardware_id = %target.hardware_id, address = %target.address, "Target selected");
    fsm.process(BringUpEvent::TargetSelected)?;

    // Deploying
    client
        .create_deployment(&target.deployment_request(PRESEED_CONFIG))
        .await?;
    info!("Deployment {} registered for {}", PRESEED_CONFIG, target.hardware_id);
    fsm.process(BringUpEvent::Deployed)?;

    // AwaitingLiveness. Failed is not terminal here: the probe fails until the
    // installed OS comes up, so only Completed ends the wait.
    let liveness = tasks::liveness_task(&target.address);
    let started = Instant::now();
    if !options.resubmit_liveness {
        client.submit_task(&liveness).await?;
    }
    let watch = Watch {
        phase: Phase::OsProvisioning,
        address: &target.address,
        resubmit: options.resubmit_liveness.then_some(&liveness),
        ends_wait: host_alive,
    };
    let os_elapsed = finished_after(
        wait_for_task(client, &watch, &options.poll, started, progress, sleep_fn).await?,
        Phase::OsProvisioning,
    )?;
    progress.finished(Phase::OsProvisioning, &target.address, os_elapsed);
    fsm.process(BringUpEvent::HostAlive)?;

    // InstallingKubernetes
    progress.message("Beginning the installation and initialisation of Kubernetes");
    client
        .submit_task(&tasks::kubernetes_install_task(&target.address))
        .await?;
    fsm.process(BringUpEvent::KubernetesSubmitted)?;

    // AwaitingKubernetes
    let started = Instant::now();
    let watch = Watch {
        phase: Phase::KubernetesInstall,
        address: &target.address,
        resubmit: None,
        ends_wait: TaskState::is_final,
    };
    let outcome = wait_for_task(client, &watch, &options.poll, started, progress, sleep_fn).await?;
    if let PollOutcome::Finished { state: TaskState::Failed, .. } = outcome {
        return Err(CappError::TaskFailed(
            "Kubernetes has failed to install".to_string(),
        ));
    }
    let kubernetes_elapsed = finished_after(outcome, Phase::KubernetesInstall)?;
    progress.finished(Phase::KubernetesInstall, &target.address, kubernetes_elapsed);
    fsm.process(BringUpEvent::KubernetesInstalled)?;

    // Done
    progress.message(&monitor_hint(&target.address));

    Ok(BringUpReport {
        target,
        state: fsm.state().clone(),
        os_elapsed,
        kubernetes_elapsed,
    })
}

/// Pick hardware from the unleased inventory after the grace period
async fn select_hardware<G, S, F>(
    client: &PlunderClient<G>,
    options: &BringUpOptions,
    selector: &dyn LeaseSelector,
    progress: &dyn Progress,
    sleep_fn: &S,
) -> Result<String, CappError>
where
    G: Gateway,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    progress.message(&format!(
        "Will select an unleased server at random for management cluster in {} seconds",
        options.selection_grace.as_secs()
    ));
    sleep_fn(options.selection_grace).await;

    let leases = client.unleased().await?;
    match selector.select(&leases, Utc::now()) {
        Some(nic) => Ok(nic),
        None => {
            warn!("None of {} unleased NICs is recent enough", leases.len());
            Err(CappError::NoFreeHardware)
        }
    }
}

fn host_alive(state: &TaskState) -> bool {
    *state == TaskState::Completed
}

fn finished_after(outcome: PollOutcome, phase: Phase) -> Result<Duration, CappError> {
    match outcome {
        PollOutcome::Finished { elapsed, .. } => Ok(elapsed),
        PollOutcome::TimedOut { attempts } => Err(CappError::PollTimeout {
            phase: format!("{:?}", phase),
            attempts,
        }),
    }
}

/// How to follow the host's task log without this process
pub fn monitor_hint(address: &str) -> String {
    format!(
        "Host tasks can be monitored with pldrctl get logs {} -w 5",
        address
    )
}

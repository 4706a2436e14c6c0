//! Host teardown
//!
//! Resets the host through parlay and, unless asked to leave it, removes the
//! host's deployment so it is not provisioned again. The reset is fire and
//! forget: its outcome is never polled.

use tracing::{error, info};

use crate::app::options::TeardownOptions;
use crate::deploy::fsm::{TeardownEvent, TeardownFsm, TeardownState};
use crate::deploy::progress::Progress;
use crate::deploy::tasks;
use crate::errors::CappError;
use crate::http::client::{Gateway, PlunderClient};
use crate::models::host::validate_address;

/// Run the teardown workflow, returning the final state
pub async fn tear_down<G: Gateway>(
    client: &PlunderClient<G>,
    options: &TeardownOptions,
    progress: &dyn Progress,
) -> Result<TeardownState, CappError> {
    progress.message("Destroying a node");
    validate_address(&options.address)?;

    let mut fsm = TeardownFsm::new();
    match run(&mut fsm, client, options, progress).await {
        Ok(()) => Ok(fsm.state().clone()),
        Err(e) => {
            if fsm.process(TeardownEvent::Fail(e.to_string())).is_ok() {
                error!(state = ?fsm.state(), "Teardown aborted: {}", e);
            }
            Err(e)
        }
    }
}

async fn run<G: Gateway>(
    fsm: &mut TeardownFsm,
    client: &PlunderClient<G>,
    options: &TeardownOptions,
    progress: &dyn Progress,
) -> Result<(), CappError> {
    // Resetting
    client.submit_task(&tasks::reset_task(&options.address)).await?;
    info!(address = %options.address, "Reset submitted");
    progress.message("Node will now reset (through sysrq)");
    fsm.process(TeardownEvent::ResetSubmitted {
        leave_deployment: options.leave_deployment,
    })?;

    // RemovingDeployment
    if *fsm.state() == TeardownState::RemovingDeployment {
        progress.message("Removing node from configuration so it wont be re-provisioned");
        client.remove_deployment_by_address(&options.address).await?;
        fsm.process(TeardownEvent::DeploymentRemoved)?;
    }

    progress.message(&format!("Node {} destroyed", options.address));
    Ok(())
}

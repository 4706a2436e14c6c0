//! Finite state machines for bring-up and teardown

use serde::{Deserialize, Serialize};

use crate::errors::CappError;

/// Bring-up state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BringUpState {
    /// Choosing the hardware to provision
    SelectingTarget,

    /// Registering the OS deployment
    Deploying,

    /// Waiting for the installed OS to answer the uptime probe
    AwaitingLiveness,

    /// Submitting the Kubernetes installation
    InstallingKubernetes,

    /// Waiting for the Kubernetes installation to finish
    AwaitingKubernetes,

    /// Management cluster is up
    Done,

    /// Aborted
    Failed,
}

/// Bring-up event
#[derive(Debug, Clone)]
pub enum BringUpEvent {
    /// Hardware chosen (or given explicitly)
    TargetSelected,

    /// Deployment accepted by the server
    Deployed,

    /// Liveness task reported Completed
    HostAlive,

    /// Kubernetes task accepted by parlay
    KubernetesSubmitted,

    /// Kubernetes task reported Completed
    KubernetesInstalled,

    /// Any fatal error
    Fail(String),
}

/// Bring-up FSM
#[derive(Debug, Clone)]
pub struct BringUpFsm {
    state: BringUpState,
    error: Option<String>,
}

impl BringUpFsm {
    pub fn new() -> Self {
        Self {
            state: BringUpState::SelectingTarget,
            error: None,
        }
    }

    pub fn state(&self) -> &BringUpState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: BringUpEvent) -> Result<(), CappError> {
        let new_state = match (&self.state, &event) {
            (BringUpState::SelectingTarget, BringUpEvent::TargetSelected) => BringUpState::Deploying,
            (BringUpState::Deploying, BringUpEvent::Deployed) => BringUpState::AwaitingLiveness,
            (BringUpState::AwaitingLiveness, BringUpEvent::HostAlive) => {
                BringUpState::InstallingKubernetes
            }
            (BringUpState::InstallingKubernetes, BringUpEvent::KubernetesSubmitted) => {
                BringUpState::AwaitingKubernetes
            }
            (BringUpState::AwaitingKubernetes, BringUpEvent::KubernetesInstalled) => {
                BringUpState::Done
            }

            // Done and Failed are final
            (BringUpState::Done, _) | (BringUpState::Failed, _) => {
                return Err(CappError::InvalidTransition(format!(
                    "{:?} -> {:?}",
                    self.state, event
                )));
            }
            (_, BringUpEvent::Fail(err)) => {
                self.error = Some(err.clone());
                BringUpState::Failed
            }

            (state, event) => {
                return Err(CappError::InvalidTransition(format!(
                    "{:?} -> {:?}",
                    state, event
                )));
            }
        };

        self.state = new_state;
        Ok(())
    }
}

impl Default for BringUpFsm {
    fn default() -> Self {
        Self::new()
    }
}

/// Teardown state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeardownState {
    /// Submitting the reset task
    Resetting,

    /// Deleting the host's deployment record
    RemovingDeployment,

    Done,

    Failed,
}

/// Teardown event
#[derive(Debug, Clone)]
pub enum TeardownEvent {
    /// Reset task accepted; the flag says whether the deployment stays
    ResetSubmitted { leave_deployment: bool },

    /// Deployment record deleted
    DeploymentRemoved,

    Fail(String),
}

/// Teardown FSM
#[derive(Debug, Clone)]
pub struct TeardownFsm {
    state: TeardownState,
    error: Option<String>,
}

impl TeardownFsm {
    pub fn new() -> Self {
        Self {
            state: TeardownState::Resetting,
            error: None,
        }
    }

    pub fn state(&self) -> &TeardownState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: TeardownEvent) -> Result<(), CappError> {
        let new_state = match (&self.state, &event) {
            (TeardownState::Resetting, TeardownEvent::ResetSubmitted { leave_deployment: true }) => {
                TeardownState::Done
            }
            (TeardownState::Resetting, TeardownEvent::ResetSubmitted { leave_deployment: false }) => {
                TeardownState::RemovingDeployment
            }
            (TeardownState::RemovingDeployment, TeardownEvent::DeploymentRemoved) => {
                TeardownState::Done
            }
            (TeardownState::Resetting, TeardownEvent::Fail(err))
            | (TeardownState::RemovingDeployment, TeardownEvent::Fail(err)) => {
                self.error = Some(err.clone());
                TeardownState::Failed
            }
            (state, event) => {
                return Err(CappError::InvalidTransition(format!(
                    "{:?} -> {:?}",
                    state, event
                )));
            }
        };

        self.state = new_state;
        Ok(())
    }
}

impl Default for TeardownFsm {
    fn default() -> Self {
        Self::new()
    }
}

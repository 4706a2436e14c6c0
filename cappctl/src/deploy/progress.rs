//! Operator-facing progress output

use std::io::Write;
use std::time::Duration;

use colored::Colorize;

use crate::models::task::TaskState;
use crate::utils::whole_seconds;

/// Phase of the bring-up being waited on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// OS install, detected through the liveness task
    OsProvisioning,

    /// Kubernetes installation task
    KubernetesInstall,
}

/// Receives progress updates from the orchestrators
pub trait Progress: Send + Sync {
    /// A one-off line of information
    fn message(&self, text: &str);

    /// A poll returned a state that does not end the phase
    fn waiting(&self, phase: Phase, elapsed: Duration, state: &TaskState);

    /// The phase completed
    fn finished(&self, phase: Phase, address: &str, elapsed: Duration);
}

/// Progress on stdout, redrawing the waiting line in place
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalProgress;

impl Progress for TerminalProgress {
    fn message(&self, text: &str) {
        println!("{}", text);
    }

    fn waiting(&self, phase: Phase, elapsed: Duration, _state: &TaskState) {
        let label = match phase {
            Phase::OsProvisioning => "Waiting for Host to complete OS provisioning",
            Phase::KubernetesInstall => "Waiting for Kubernetes to complete installation",
        };
        print!("\r{} {} Seconds", label.cyan(), whole_seconds(elapsed));
        let _ = std::io::stdout().flush();
    }

    fn finished(&self, phase: Phase, address: &str, elapsed: Duration) {
        let label = match phase {
            Phase::OsProvisioning => "Host has been successfully provisioned OS in".to_string(),
            Phase::KubernetesInstall => {
                format!("Kubernetes has been successfully installed on host {} in", address)
            }
        };
        println!("\r{} {} Seconds", label.as_str().green(), whole_seconds(elapsed));
    }
}

//! Workflow configuration options

use std::path::PathBuf;
use std::time::Duration;

use crate::deploy::poll::PollOptions;
use crate::logs::LogOptions;
use crate::models::host::DEFAULT_HOST_NAME;
use crate::storage::settings::DEFAULT_CLIENT_CONFIG;

/// Options shared by every command
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Path of the Plunder client configuration
    pub client_config: PathBuf,

    /// Logging configuration
    pub log: LogOptions,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            client_config: PathBuf::from(DEFAULT_CLIENT_CONFIG),
            log: LogOptions::default(),
        }
    }
}

/// Options for bringing up the management cluster host
#[derive(Debug, Clone)]
pub struct BringUpOptions {
    /// Hardware address to provision. Picked from the unleased inventory when empty.
    pub hardware_id: Option<String>,

    /// IPv4 address given to the host
    pub address: String,

    /// Server name given to the host
    pub host_name: String,

    /// Delay before picking hardware automatically, so the operator can cancel
    pub selection_grace: Duration,

    /// Polling of the liveness and Kubernetes tasks
    pub poll: PollOptions,

    /// Submit the liveness task again before every poll instead of once
    pub resubmit_liveness: bool,
}

impl Default for BringUpOptions {
    fn default() -> Self {
        Self {
            hardware_id: None,
            address: String::new(),
            host_name: DEFAULT_HOST_NAME.to_string(),
            selection_grace: Duration::from_secs(5),
            poll: PollOptions::default(),
            resubmit_liveness: false,
        }
    }
}

/// Options for destroying a host
#[derive(Debug, Clone, Default)]
pub struct TeardownOptions {
    /// IPv4 address of the host
    pub address: String,

    /// Keep the deployment so the host is provisioned again on reboot
    pub leave_deployment: bool,
}

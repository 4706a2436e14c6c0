//! Target host models

use std::net::Ipv4Addr;

use plunder_api::models::{DeploymentConfig, HostConfig};

use crate::errors::CappError;
use crate::utils::dash_address;

/// Deployment configuration installed on the management cluster host
pub const PRESEED_CONFIG: &str = "preseed";

/// Server name given to the management cluster host
pub const DEFAULT_HOST_NAME: &str = "Manager01";

/// The machine being provisioned or destroyed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTarget {
    /// Hardware (MAC) address of the provisioning NIC
    pub hardware_id: String,

    /// IPv4 address the host is given
    pub address: String,

    /// Server name
    pub name: String,
}

impl HostTarget {
    pub fn new(hardware_id: impl Into<String>, address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            hardware_id: hardware_id.into(),
            address: address.into(),
            name: name.into(),
        }
    }

    /// Key used for this host by the deployment and parlay APIs
    pub fn dash_address(&self) -> String {
        dash_address(&self.address)
    }

    /// Deployment request installing `config_name` on this host
    pub fn deployment_request(&self, config_name: &str) -> DeploymentConfig {
        DeploymentConfig {
            mac: self.hardware_id.clone(),
            config_name: config_name.to_string(),
            config_host: HostConfig {
                ip_address: self.address.clone(),
                server_name: self.name.clone(),
            },
        }
    }
}

/// Reject anything that is not a dotted IPv4 address, so the dash form stays
/// unambiguous.
pub fn validate_address(address: &str) -> Result<(), CappError> {
    if address.is_empty() {
        return Err(CappError::Usage("No address specified for host".to_string()));
    }
    address
        .parse::<Ipv4Addr>()
        .map(|_| ())
        .map_err(|_| CappError::Usage(format!("{} is not a valid IPv4 address", address)))
}

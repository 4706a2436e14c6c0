//! API models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response envelope returned by every Plunder endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub warning: String,
    #[serde(default)]
    pub error: String,
    #[serde(default, rename = "friendlyError")]
    pub friendly_error: String,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

impl Envelope {
    /// Wrap a successful payload
    pub fn with_payload(payload: serde_json::Value) -> Self {
        Self {
            payload: Some(payload),
            ..Default::default()
        }
    }

    /// Build a rejected envelope
    pub fn rejected(error: &str, friendly_error: &str) -> Self {
        Self {
            error: error.to_string(),
            friendly_error: friendly_error.to_string(),
            ..Default::default()
        }
    }

    /// True when the server rejected the operation, regardless of HTTP status
    pub fn is_rejected(&self) -> bool {
        !self.error.is_empty() || !self.friendly_error.is_empty()
    }
}

/// A DHCP lease as reported by the lease inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    /// Hardware (MAC) address of the NIC holding the lease
    pub nic: String,

    /// When the lease expired or will expire
    pub expiry: DateTime<Utc>,
}

/// Deployment request binding a named configuration to a host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub mac: String,

    #[serde(rename = "deployment")]
    pub config_name: String,

    #[serde(rename = "config")]
    pub config_host: HostConfig,
}

/// Per-host settings carried inside a deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(rename = "address")]
    pub ip_address: String,

    #[serde(rename = "hostname")]
    pub server_name: String,
}

/// Parlay submission: one or more named action lists against a set of hosts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasureMap {
    pub deployments: Vec<ParlayDeployment>,
}

/// A named, ordered list of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParlayDeployment {
    pub name: String,

    #[serde(default)]
    pub parallel: bool,

    #[serde(default, rename = "parallelSessions")]
    pub parallel_sessions: u32,

    pub hosts: Vec<String>,

    pub actions: Vec<Action>,
}

/// A single declarative action executed by parlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Action kind, e.g. "command"
    #[serde(rename = "type")]
    pub action_type: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Run the command as this user through sudo
    #[serde(default, rename = "commandSudo", skip_serializing_if = "Option::is_none")]
    pub command_sudo: Option<String>,

    /// Timeout in seconds, 0 means no timeout
    #[serde(default)]
    pub timeout: u32,

    #[serde(default, rename = "ignoreFail")]
    pub ignore_fail: bool,
}

/// Execution log for a host as returned by the parlay logs endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLog {
    pub state: String,

    #[serde(default)]
    pub log: String,
}

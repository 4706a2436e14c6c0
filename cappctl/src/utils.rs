//! Utility functions

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Version information for cappctl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}

/// Key used by the deployment and parlay APIs for a host: dots become dashes.
pub fn dash_address(address: &str) -> String {
    address.replace('.', "-")
}

/// Round a duration to whole seconds
pub fn whole_seconds(elapsed: Duration) -> u64 {
    elapsed.as_secs_f64().round() as u64
}

/// Generate a random UUID v4
pub fn generate_run_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

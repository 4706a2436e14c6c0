//! Client configuration file (plunderclient.yaml)

use base64::Engine;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::CappError;
use crate::filesys::file::File;

/// Default location of the client configuration, relative to the working directory
pub const DEFAULT_CLIENT_CONFIG: &str = "plunderclient.yaml";

/// Connection settings for the Plunder API server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Server hostname or IP address
    pub address: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base64 encoded PEM certificate of the server. When present the
    /// connection uses https and trusts this certificate.
    #[serde(default)]
    pub cert: Option<String>,

    /// API path layout
    #[serde(flatten)]
    pub paths: ApiPaths,
}

fn default_port() -> u16 {
    60443
}

/// Paths of the three Plunder API families
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiPaths {
    #[serde(default = "default_dhcp_path", rename = "dhcpPath")]
    pub dhcp: String,

    #[serde(default = "default_deployment_path", rename = "deploymentPath")]
    pub deployment: String,

    #[serde(default = "default_parlay_path", rename = "parlayPath")]
    pub parlay: String,
}

fn default_dhcp_path() -> String {
    "/dhcp".to_string()
}

fn default_deployment_path() -> String {
    "/deployment".to_string()
}

fn default_parlay_path() -> String {
    "/parlay".to_string()
}

impl Default for ApiPaths {
    fn default() -> Self {
        Self {
            dhcp: default_dhcp_path(),
            deployment: default_deployment_path(),
            parlay: default_parlay_path(),
        }
    }
}

impl ClientSettings {
    /// Load settings from a YAML file
    pub async fn load(file: &File) -> Result<Self, CappError> {
        if !file.exists().await {
            return Err(CappError::ConfigError(format!(
                "client configuration {:?} not found",
                file.path()
            )));
        }
        let settings: ClientSettings = file.read_yaml().await?;
        if settings.address.is_empty() {
            return Err(CappError::ConfigError(
                "client configuration has no server address".to_string(),
            ));
        }
        Ok(settings)
    }

    /// Base URL of the API server
    pub fn base_url(&self) -> Result<Url, CappError> {
        let scheme = if self.cert.is_some() { "https" } else { "http" };
        Ok(Url::parse(&format!("{}://{}:{}", scheme, self.address, self.port))?)
    }

    /// Decoded PEM bytes of the server certificate, if configured
    pub fn cert_pem(&self) -> Result<Option<Vec<u8>>, CappError> {
        match &self.cert {
            None => Ok(None),
            Some(encoded) => base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .map(Some)
                .map_err(|e| CappError::ConfigError(format!("invalid server certificate: {}", e))),
        }
    }
}

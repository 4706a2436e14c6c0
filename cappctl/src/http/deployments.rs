//! Deployment API client

use plunder_api::models::DeploymentConfig;

use crate::errors::CappError;
use crate::http::client::{ensure_accepted, Gateway, PlunderClient};
use crate::utils::dash_address;

impl<G: Gateway> PlunderClient<G> {
    /// Register a deployment so the host is provisioned on next boot
    pub async fn create_deployment(&self, config: &DeploymentConfig) -> Result<(), CappError> {
        let path = self.paths().deployment.clone();
        let body = serde_json::to_vec(config)?;
        let envelope = self.gateway().post(&path, body).await?;
        ensure_accepted(&path, &envelope)
    }

    /// Remove the deployment of the host with the given address
    pub async fn remove_deployment_by_address(&self, address: &str) -> Result<(), CappError> {
        let path = format!(
            "{}/address/{}",
            self.paths().deployment,
            dash_address(address)
        );
        let envelope = self.gateway().delete(&path).await?;
        ensure_accepted(&path, &envelope)
    }
}

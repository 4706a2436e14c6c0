//! Lease inventory API client

use plunder_api::models::Lease;
use tracing::debug;

use crate::errors::CappError;
use crate::http::client::{into_payload, Gateway, PlunderClient};

impl<G: Gateway> PlunderClient<G> {
    /// Get the leases for hardware that is currently unleased
    pub async fn unleased(&self) -> Result<Vec<Lease>, CappError> {
        let path = format!("{}/unleased", self.paths().dhcp);
        let envelope = self.gateway().get(&path).await?;
        let leases: Vec<Lease> = into_payload(&path, envelope)?;
        debug!("{} unleased NICs reported", leases.len());
        Ok(leases)
    }
}

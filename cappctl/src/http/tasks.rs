//! Parlay (remote task runner) API client

use plunder_api::models::{TaskLog, TreasureMap};

use crate::errors::CappError;
use crate::http::client::{ensure_accepted, into_payload, Gateway, PlunderClient};
use crate::models::task::TaskState;
use crate::utils::dash_address;

impl<G: Gateway> PlunderClient<G> {
    /// Submit a task for execution.
    ///
    /// Parlay keeps one execution per host address: a submission replaces
    /// whatever was running against the same address, and the log endpoint
    /// reports only the latest one.
    pub async fn submit_task(&self, task: &TreasureMap) -> Result<(), CappError> {
        let path = self.paths().parlay.clone();
        let body = serde_json::to_vec(task)?;
        let envelope = self.gateway().post(&path, body).await?;
        ensure_accepted(&path, &envelope)
    }

    /// Get the execution state of the latest task for a host
    pub async fn task_log(&self, address: &str) -> Result<(TaskState, TaskLog), CappError> {
        let path = format!("{}/logs/{}", self.paths().parlay, dash_address(address));
        let envelope = self.gateway().get(&path).await?;
        let log: TaskLog = into_payload(&path, envelope)?;
        Ok((TaskState::from(log.state.as_str()), log))
    }
}

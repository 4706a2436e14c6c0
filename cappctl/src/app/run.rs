//! Command entry points

use tracing::{info, info_span, Instrument};

use crate::app::options::{AppOptions, BringUpOptions, TeardownOptions};
use crate::deploy::bringup::{bring_up, BringUpReport};
use crate::deploy::fsm::TeardownState;
use crate::deploy::progress::TerminalProgress;
use crate::deploy::selector::LastEligible;
use crate::deploy::teardown::tear_down;
use crate::errors::CappError;
use crate::filesys::file::File;
use crate::http::client::{HttpClient, PlunderClient};
use crate::storage::settings::ClientSettings;
use crate::utils::generate_run_id;

/// Build a client from the Plunder client configuration
pub async fn connect(options: &AppOptions) -> Result<PlunderClient<HttpClient>, CappError> {
    let settings = ClientSettings::load(&File::new(&options.client_config)).await?;
    let http_client = HttpClient::new(&settings)?;
    info!("Using Plunder API at {}", http_client.base_url());
    Ok(PlunderClient::new(http_client, settings.paths))
}

/// Bring up the management cluster host
pub async fn init_mgmt_cluster(
    app: &AppOptions,
    options: BringUpOptions,
) -> Result<BringUpReport, CappError> {
    let span = info_span!("init_mgmt_cluster", run_id = %generate_run_id(), address = %options.address);
    async {
        let client = connect(app).await?;
        bring_up(
            &client,
            &options,
            &LastEligible::default(),
            &TerminalProgress,
            tokio::time::sleep,
        )
        .await
    }
    .instrument(span)
    .await
}

/// Reset a host and optionally forget its deployment
pub async fn destroy(app: &AppOptions, options: TeardownOptions) -> Result<TeardownState, CappError> {
    let span = info_span!("destroy", run_id = %generate_run_id(), address = %options.address);
    async {
        let client = connect(app).await?;
        tear_down(&client, &options, &TerminalProgress).await
    }
    .instrument(span)
    .await
}

//! cappctl - Entry Point
//!
//! Cluster API Plunder control: brings up a management cluster host and
//! destroys provisioned hosts through the Plunder API server.

use std::path::PathBuf;
use std::time::Duration;

use cappctl::app::options::{AppOptions, BringUpOptions, TeardownOptions};
use cappctl::app::run::{destroy, init_mgmt_cluster};
use cappctl::deploy::poll::PollOptions;
use cappctl::errors::CappError;
use cappctl::logs::{init_logging, LogLevel, LogOptions};
use cappctl::models::host::DEFAULT_HOST_NAME;
use cappctl::storage::settings::DEFAULT_CLIENT_CONFIG;
use cappctl::utils::version_info;

use clap::{CommandFactory, Parser, Subcommand};
use tracing::{debug, error};

#[derive(Parser)]
#[command(name = "cappctl")]
#[command(about = "Cluster API Plunder control", long_about = None)]
struct Cli {
    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true, default_value = "info")]
    log_level: LogLevel,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Plunder client configuration
    #[arg(long, global = true, default_value = DEFAULT_CLIENT_CONFIG)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialise Kubernetes Management Cluster
    InitMgmtCluster {
        /// The Mac address of the node to use for provisioning
        #[arg(short, long)]
        mac: Option<String>,

        /// The IP address to provision the management cluster with
        #[arg(short, long)]
        address: String,

        /// Server name of the management cluster host
        #[arg(long, default_value = DEFAULT_HOST_NAME)]
        hostname: String,

        /// Seconds between task state polls
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
        poll_interval: u64,

        /// Abort after this many polls per phase (default: wait forever)
        #[arg(long)]
        max_poll_attempts: Option<u32>,

        /// Submit the uptime check again before every poll
        #[arg(long)]
        resubmit_liveness: bool,
    },

    /// Destroy a machine
    Destroy {
        /// Address of a machine to destroy
        #[arg(short, long)]
        address: Option<String>,

        /// Leave the deployment after it's been destroyed
        #[arg(short, long)]
        leave: bool,
    },

    /// Print version information
    Version,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::InitMgmtCluster { .. } => "init-mgmt-cluster",
            Commands::Destroy { .. } => "destroy",
            Commands::Version => "version",
        }
    }
}

/// Rendered help of a subcommand, shown after a usage error
fn subcommand_help(name: &str) -> Option<String> {
    Cli::command()
        .find_subcommand_mut(name)
        .map(|command| command.render_help().to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let command_name = cli.command.name();

    let app = AppOptions {
        client_config: cli.config,
        log: LogOptions {
            log_level: cli.log_level,
            json_format: cli.log_json,
        },
    };
    let logging = init_logging(app.log.clone());
    if let Err(e) = &logging {
        eprintln!("Failed to initialize logging: {e}");
    }

    let result = match cli.command {
        Commands::Version => match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => {
                println!("{}", version);
                Ok(())
            }
            Err(e) => Err(CappError::from(e)),
        },
        Commands::InitMgmtCluster {
            mac,
            address,
            hostname,
            poll_interval,
            max_poll_attempts,
            resubmit_liveness,
        } => {
            let options = BringUpOptions {
                hardware_id: mac,
                address,
                host_name: hostname,
                poll: PollOptions {
                    interval: Duration::from_secs(poll_interval),
                    max_attempts: max_poll_attempts,
                },
                resubmit_liveness,
                ..Default::default()
            };
            init_mgmt_cluster(&app, options).await.map(|report| {
                debug!("Bring-up finished: {:?}", report);
            })
        }
        Commands::Destroy { address, leave } => {
            let options = TeardownOptions {
                address: address.unwrap_or_default(),
                leave_deployment: leave,
            };
            destroy(&app, options).await.map(|state| {
                debug!("Teardown finished in state {:?}", state);
            })
        }
    };

    if let Err(e) = result {
        if matches!(e, CappError::Usage(_)) {
            if let Some(help) = subcommand_help(command_name) {
                println!("{}", help);
            }
        }
        if logging.is_ok() {
            error!("{}", e);
        } else {
            eprintln!("[ERROR] {}", e);
        }
        std::process::exit(1);
    }
}

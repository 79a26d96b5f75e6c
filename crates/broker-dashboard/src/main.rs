//! Broker dashboard binary.
//!
//! Serves the broker metrics history API until interrupted.

use std::process::ExitCode;

use broker_dashboard::simulate::{run_synthetic, SyntheticBroker};
use broker_dashboard::{Cli, DashboardServer};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    let bind_addr = config.bind_addr;

    let server = match DashboardServer::new(config) {
        Ok(server) => server,
        Err(e) => {
            error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!("Starting broker dashboard on {}", bind_addr);
    info!("  History:    http://{}/api/history", bind_addr);
    info!("  Live feed:  ws://{}/api/ws", bind_addr);

    if cli.simulate {
        let tick = cli.simulate_interval();
        tokio::spawn(run_synthetic(server.feed(), SyntheticBroker::new(tick), tick));
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    match server.serve_with_shutdown(bind_addr, shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Dashboard error: {}", e);
            ExitCode::FAILURE
        }
    }
}

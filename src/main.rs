//! Chain monitoring service entry point.
//!
//! Initializes services from configuration, starts one protocol client
//! per configured node endpoint, and runs the single sequential consumer
//! loop that filters deduplicated reports and dispatches notifications.
//!
//! # Flow
//! 1. Loads chain configurations from the default directory
//! 2. Starts the node manager (clients + fan-in dedup)
//! 3. Filters each report against the chain's subscriptions
//! 4. Delivers matches to each subscription's webhook target
//! 5. Handles graceful shutdown on Ctrl+C

use std::path::PathBuf;

use clap::{Arg, Command};
use dotenvy::dotenv;
use tracing::{error, info};

use chainstream_monitor::{
	bootstrap::{initialize_services, process_report, Result},
	services::manager::DEFAULT_DEDUP_WINDOW,
	utils::logging::setup_logging,
};

#[tokio::main]
async fn main() -> Result<()> {
	let matches = Command::new("chainstream-monitor")
		.version(env!("CARGO_PKG_VERSION"))
		.about(
			"A chain monitoring service that streams transactions from multiple nodes per \
			 network, deduplicates them, and routes matches to configured webhooks.",
		)
		.arg(
			Arg::new("config-path")
				.long("config-path")
				.help("Directory containing chain configuration files (default: config/chains)")
				.value_name("PATH"),
		)
		.arg(
			Arg::new("dedup-window")
				.long("dedup-window")
				.help("Number of delivered event hashes remembered for deduplication (default: 100)")
				.value_name("SIZE"),
		)
		.get_matches();

	// Load environment variables from .env file
	dotenv().ok();

	setup_logging().unwrap_or_else(|e| {
		error!("Failed to setup logging: {}", e);
	});

	let config_path = matches
		.get_one::<String>("config-path")
		.map(PathBuf::from);

	let dedup_window = matches
		.get_one::<String>("dedup-window")
		.map(|s| {
			s.parse::<usize>().map_err(|e| {
				error!("Failed to parse dedup window: {}", e);
				e
			})
		})
		.transpose()?
		.unwrap_or(DEFAULT_DEDUP_WINDOW);

	let mut services = initialize_services(config_path.as_deref(), dedup_window)
		.map_err(|e| anyhow::anyhow!("Failed to initialize services: {}", e))?;

	if services.chains.is_empty() {
		info!("No chains configured. Exiting...");
		return Ok(());
	}

	let mut reports = services
		.manager
		.listen()
		.map_err(|e| anyhow::anyhow!("Failed to start node manager: {}", e))?;

	info!("Service started. Press Ctrl+C to shutdown");

	// Single sequential consumer: dedup ordering and watermark updates
	// rely on reports being processed one at a time
	let outcome: Result<()> = loop {
		tokio::select! {
			result = tokio::signal::ctrl_c() => {
				if let Err(e) = result {
					error!("Error waiting for Ctrl+C: {}", e);
				}
				info!("Shutdown signal received, stopping services...");
				break Ok(());
			}
			maybe_report = reports.recv() => match maybe_report {
				None => {
					info!("Report stream ended, stopping services...");
					break Ok(());
				}
				Some(report) => {
					match process_report(
						&report,
						&services.chains,
						&mut services.filter,
						&services.notifier,
					)
					.await
					{
						Ok(delivered) if delivered > 0 => {
							info!(
								chain = report.chain.as_str(),
								delivered,
								"Delivered report"
							);
						}
						Ok(_) => {}
						// A height parse failure breaks the watermark
						// invariant; surface it loudly instead of
						// continuing with corrupt state
						Err(e) => break Err(anyhow::anyhow!("Fatal filter error: {}", e).into()),
					}
				}
			}
		}
	};

	// Close the output stream before stopping the clients: forwarding
	// tasks parked on a full channel fail their pending send and unwind
	// instead of deadlocking the worker joins below
	drop(reports);
	services.manager.stop().await;
	info!("Shutdown complete");

	outcome
}

//! Deposit monitoring service entry point.
//!
//! Initializes the monitoring stack, starts one scan loop per configured
//! chain, and handles graceful shutdown on interrupt signals.

use std::env::{set_var, var};
use std::path::Path;

use clap::{Arg, Command};
use deposit_monitor::{
	bootstrap::{create_deposit_handler, initialize_services, Result},
	utils::logging::setup_logging,
};
use dotenvy::dotenv;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
	let matches = Command::new("deposit-monitor")
		.version(env!("CARGO_PKG_VERSION"))
		.about(
			"A multi-chain deposit monitoring service that scans blockchain networks for \
			 incoming deposits with redundant RPC endpoints and per-chain health tracking.",
		)
		.arg(
			Arg::new("log-file")
				.long("log-file")
				.help("Write logs to file instead of stdout")
				.action(clap::ArgAction::SetTrue),
		)
		.arg(
			Arg::new("log-level")
				.long("log-level")
				.help("Set log level (trace, debug, info, warn, error)")
				.value_name("LEVEL"),
		)
		.arg(
			Arg::new("log-path")
				.long("log-path")
				.help("Path to store log files (default: logs/)")
				.value_name("PATH"),
		)
		.arg(
			Arg::new("config-path")
				.long("config-path")
				.help("Directory of chain configuration files (default: config/chains)")
				.value_name("PATH"),
		)
		.arg(
			Arg::new("data-path")
				.long("data-path")
				.help("Directory for persisted monitor state (default: data)")
				.value_name("PATH"),
		)
		.get_matches();

	// Load environment variables from .env file
	dotenv().ok();

	// Only apply CLI options if the corresponding environment variables are NOT already set
	if matches.get_flag("log-file") && var("LOG_MODE").is_err() {
		set_var("LOG_MODE", "file");
	}
	if let Some(level) = matches.get_one::<String>("log-level") {
		if var("LOG_LEVEL").is_err() {
			set_var("LOG_LEVEL", level);
		}
	}
	if let Some(path) = matches.get_one::<String>("log-path") {
		if var("LOG_DATA_DIR").is_err() {
			set_var("LOG_DATA_DIR", path);
		}
	}

	setup_logging().unwrap_or_else(|e| {
		eprintln!("Failed to setup logging: {}", e);
	});

	let config_path = matches.get_one::<String>("config-path").map(Path::new);
	let data_path = matches.get_one::<String>("data-path").map(Path::new);

	let stack = initialize_services(config_path, data_path, create_deposit_handler())
		.await
		.map_err(|e| anyhow::anyhow!("Failed to initialize services: {}", e))?;

	for chain in &stack.chains {
		if let Err(e) = stack.scheduler.start_chain_watcher(chain).await {
			error!(chain = %chain, error = %e, "failed to start scan loop");
		}
	}

	info!("Service started. Press Ctrl+C to shutdown");
	let _ = tokio::signal::ctrl_c().await;
	info!("Shutdown signal received, stopping scan loops...");

	stack.scheduler.shutdown().await;

	info!("Shutdown complete");
	Ok(())
}

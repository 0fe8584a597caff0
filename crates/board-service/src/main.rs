//! Main entry point for the order board service.
//!
//! This binary runs the board engine for one restaurant: it polls the
//! backend on a fixed interval, keeps the reconciled order view current,
//! and optionally serves that view plus transition commands over HTTP
//! for a display layer.

use board_client::{implementations::http::HttpBackend, BackendService};
use board_config::Config;
use board_core::BoardEngine;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod server;

/// Command-line arguments for the board service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};
	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));
	fmt().with_env_filter(env_filter).with_target(true).init();

	tracing::info!("Started order board");

	let config = Config::from_file(args.config.to_str().ok_or("Invalid config path")?).await?;
	tracing::info!(
		restaurant_id = %config.board.restaurant_id,
		backend = %config.backend.url,
		"Loaded configuration"
	);

	let backend = HttpBackend::new(
		config.backend.url.clone(),
		config.board.restaurant_id.clone(),
		Duration::from_secs(config.backend.request_timeout_seconds),
	)?;
	let engine = Arc::new(BoardEngine::new(
		config.board.clone(),
		BackendService::new(Box::new(backend)),
	));

	engine.start();

	let api_config = config.api.clone().filter(|api| api.enabled);
	if let Some(api_config) = api_config {
		tokio::select! {
			result = server::start_server(api_config, Arc::clone(&engine)) => {
				tracing::info!("API server finished");
				result?;
			}
			_ = tokio::signal::ctrl_c() => {}
		}
	} else {
		tracing::info!("Running without API surface");
		tokio::signal::ctrl_c().await?;
	}

	engine.stop().await;
	tracing::info!("Stopped order board");
	Ok(())
}

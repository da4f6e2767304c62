// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Chime job dashboard server binary.

use clap::{Parser, Subcommand};
use std::time::Duration;
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chime_server::{create_app_state, create_router};

/// Chime server - dashboard for scheduled HTTP jobs.
#[derive(Parser, Debug)]
#[command(
	name = "chime-server",
	about = "Chime scheduled HTTP job dashboard server",
	version
)]
struct Args {
	/// Path to a TOML configuration file (overrides /etc/chime/server.toml)
	#[arg(long, env = "CHIME_SERVER_CONFIG")]
	config: Option<std::path::PathBuf>,

	/// Subcommands for chime-server (e.g., `version`)
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Parse CLI arguments
	let args = Args::parse();

	// Handle subcommands that should not start the server
	if let Some(Command::Version) = args.command {
		println!("chime-server {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	// Load configuration
	let config = match args.config {
		Some(path) => chime_server_config::load_config_with_file(path)?,
		None => chime_server_config::load_config()?,
	};

	// Setup tracing
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		"starting chime-server"
	);

	// Create database pool and run migrations
	let pool = chime_server_db::create_pool(&config.database.url).await?;
	chime_server_db::run_migrations(&pool).await?;

	let state = create_app_state(pool, &config).await;

	// Register background maintenance tasks
	let session_sweeper = chime_server::jobs::spawn_session_cleanup(
		state.session_repo.clone(),
		Duration::from_secs(config.auth.session_cleanup_interval_secs),
	);
	let oauth_state_sweeper = chime_server::jobs::spawn_oauth_state_cleanup(
		state.oauth_state_store.clone(),
		chime_server::oauth_state::DEFAULT_STATE_TTL,
	);

	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		);

	// Start server
	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	// Run server with graceful shutdown
	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	session_sweeper.abort();
	oauth_state_sweeper.abort();

	tracing::info!("Server shutdown complete");
	Ok(())
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Campo provisioning server binary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use campo_server::{create_app_state, create_router, version};
use campo_server_config::{LogFormat, LoggingConfig};
use campo_supabase::SupabaseConnector;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Campo server - creates field accounts in the Campo Supabase project.
#[derive(Parser, Debug)]
#[command(name = "campo-server", about = "Campo user provisioning server", version)]
struct Args {
	/// TOML configuration file (defaults to /etc/campo/server.toml)
	#[arg(long, env = "CAMPO_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => campo_server_config::load_config_with_file(path),
		None => campo_server_config::load_config(),
	}
	.context("failed to load configuration")?;

	init_tracing(&config.logging);

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		supabase_url = %config.supabase.url,
		"starting campo-server"
	);

	let connector = SupabaseConnector::new(
		config.supabase.url.clone(),
		config.supabase.service_role_key.clone(),
		Duration::from_secs(config.supabase.request_timeout_secs),
	);
	let state = create_app_state(Arc::new(connector));
	let app = create_router(state);

	let addr = config.socket_addr();
	let listener = tokio::net::TcpListener::bind(&addr)
		.await
		.with_context(|| format!("failed to bind {addr}"))?;
	tracing::info!("listening on {}", addr);

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

	tracing::info!("Server shutdown complete");
	Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
	let registry = tracing_subscriber::registry().with(filter);

	match logging.format {
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json())
			.init(),
		LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
	}
}

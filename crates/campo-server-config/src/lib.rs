// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the Campo provisioning server.
//!
//! Configuration is layered from built-in defaults, an optional TOML file and
//! the environment, then resolved once at startup into a [`ServerConfig`]
//! that is handed to the server explicitly.
//!
//! ```ignore
//! let config = campo_server_config::load_config()?;
//! println!("listening on {}", config.socket_addr());
//! ```

pub mod env;
pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use campo_common_secret::SecretString;
pub use env::{load_secret_env, SecretEnvError};
pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use std::path::PathBuf;

use tracing::{debug, info};

pub const SERVICE_ROLE_KEY_ENV: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub supabase: SupabaseConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from defaults, `/etc/campo/server.toml` and the
/// environment, in increasing precedence.
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Same as [`load_config`] with a caller-chosen TOML path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	let service_role_key = load_secret_env(SERVICE_ROLE_KEY_ENV)?;

	resolve(merged, service_role_key)
}

/// Resolve a merged layer plus the service-role key into a [`ServerConfig`].
pub fn resolve(
	layer: ServerConfigLayer,
	service_role_key: Option<SecretString>,
) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let supabase = layer.supabase.unwrap_or_default().finalize(service_role_key)?;
	let logging = layer.logging.unwrap_or_default().finalize();

	if http.port == 0 {
		return Err(ConfigError::InvalidValue {
			key: "http.port".to_string(),
			message: "must be non-zero".to_string(),
		});
	}

	info!(
		host = %http.host,
		port = http.port,
		supabase_url = %supabase.url,
		timeout_secs = supabase.request_timeout_secs,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		supabase,
		logging,
	})
}

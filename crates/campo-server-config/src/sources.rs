// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, TOML files and environment.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{HttpConfigLayer, LogFormat, LoggingConfigLayer, SupabaseConfigLayer};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file source. A missing file is not an error.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/campo/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Server settings use `CAMPO_SERVER_*`; the Supabase project URL keeps the
/// `SUPABASE_URL` name the edge runtime injects, so the same environment
/// works in both places.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		Ok(ServerConfigLayer {
			http: Some(HttpConfigLayer {
				host: env_var("CAMPO_SERVER_HOST"),
				port: env_parse("CAMPO_SERVER_PORT")?,
			}),
			supabase: Some(SupabaseConfigLayer {
				url: env_var("SUPABASE_URL"),
				request_timeout_secs: env_parse("CAMPO_SERVER_SUPABASE_TIMEOUT_SECS")?,
			}),
			logging: Some(LoggingConfigLayer {
				level: env_var("CAMPO_SERVER_LOG_LEVEL"),
				format: env_var("CAMPO_SERVER_LOG_FORMAT")
					.map(|v| v.parse::<LogFormat>())
					.transpose()?,
			}),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("cannot parse '{v}'"),
		}),
		None => Ok(None),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_precedence_order() {
		assert!(Precedence::Defaults < Precedence::ConfigFile);
		assert!(Precedence::ConfigFile < Precedence::Environment);
	}

	#[test]
	fn test_missing_toml_file_is_empty_layer() {
		let layer = TomlSource::new("/nonexistent/campo.toml").load().unwrap();
		assert!(layer.http.is_none());
		assert!(layer.supabase.is_none());
	}

	#[test]
	fn test_toml_file_is_parsed() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[http]\nhost = \"127.0.0.1\"\nport = 7000").unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		let http = layer.http.unwrap();
		assert_eq!(http.host.as_deref(), Some("127.0.0.1"));
		assert_eq!(http.port, Some(7000));
	}

	#[test]
	fn test_invalid_toml_reports_path() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[http\nport = ").unwrap();

		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}

	#[test]
	fn test_env_parse_rejects_garbage() {
		std::env::set_var("CAMPO_TEST_ENV_PARSE_PORT", "eighty");
		let result: Result<Option<u16>, _> = env_parse("CAMPO_TEST_ENV_PARSE_PORT");
		assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
		std::env::remove_var("CAMPO_TEST_ENV_PARSE_PORT");
	}
}

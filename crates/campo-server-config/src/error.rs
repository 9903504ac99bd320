// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration error types.

use std::path::PathBuf;

use crate::env::SecretEnvError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// A setting with no default was not provided by any source.
	#[error("{setting} is required; set {env_var}")]
	MissingSetting {
		setting: &'static str,
		env_var: &'static str,
	},

	#[error("invalid {key}: {message}")]
	InvalidValue { key: String, message: String },

	#[error("cannot parse config file {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("cannot read config file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("cannot load the Supabase service-role key: {0}")]
	ServiceRoleKey(#[from] SecretEnvError),
}

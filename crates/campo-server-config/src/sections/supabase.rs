// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Supabase project configuration.
//!
//! The service-role key never appears in TOML; it is read from
//! `SUPABASE_SERVICE_ROLE_KEY` (or `SUPABASE_SERVICE_ROLE_KEY_FILE`) and
//! handed to [`SupabaseConfigLayer::finalize`].

use campo_common_secret::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Supabase configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
	/// Project URL, e.g. `https://abcd.supabase.co`, without trailing slash.
	pub url: String,
	pub service_role_key: SecretString,
	pub request_timeout_secs: u64,
}

impl SupabaseConfig {
	pub fn new(url: impl Into<String>, service_role_key: SecretString) -> Self {
		Self {
			url: url.into().trim_end_matches('/').to_string(),
			service_role_key,
			request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
		}
	}
}

/// Supabase configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupabaseConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub request_timeout_secs: Option<u64>,
}

impl SupabaseConfigLayer {
	pub fn merge(&mut self, other: SupabaseConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
		if other.request_timeout_secs.is_some() {
			self.request_timeout_secs = other.request_timeout_secs;
		}
	}

	pub fn finalize(
		self,
		service_role_key: Option<SecretString>,
	) -> Result<SupabaseConfig, ConfigError> {
		let url = self
			.url
			.filter(|u| !u.trim().is_empty())
			.ok_or_else(|| ConfigError::MissingSetting {
				setting: "supabase.url",
				env_var: "SUPABASE_URL",
			})?;

		if !(url.starts_with("http://") || url.starts_with("https://")) {
			return Err(ConfigError::InvalidValue {
				key: "supabase.url".to_string(),
				message: format!("expected an http(s) URL, got '{url}'"),
			});
		}

		let service_role_key = service_role_key
			.filter(|k| !k.is_empty())
			.ok_or_else(|| ConfigError::MissingSetting {
				setting: "supabase service-role key",
				env_var: "SUPABASE_SERVICE_ROLE_KEY",
			})?;

		let timeout = self
			.request_timeout_secs
			.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
		if timeout == 0 {
			return Err(ConfigError::InvalidValue {
				key: "supabase.request_timeout_secs".to_string(),
				message: "must be greater than zero".to_string(),
			});
		}

		let mut config = SupabaseConfig::new(url, service_role_key);
		config.request_timeout_secs = timeout;
		Ok(config)
	}
}

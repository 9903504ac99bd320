// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret loading from the environment with `*_FILE` indirection.
//!
//! `SUPABASE_SERVICE_ROLE_KEY` may be given directly or, for container
//! deployments that mount secrets as files, through
//! `SUPABASE_SERVICE_ROLE_KEY_FILE`. The file form wins when both are set.

use std::path::PathBuf;
use std::{env, fs};

use campo_common_secret::SecretString;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretEnvError {
	#[error("failed to read secret file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },
}

/// Load `var` from `{var}_FILE` or `var`, in that order.
///
/// One trailing newline is stripped from file contents. Empty direct values
/// count as unset.
pub fn load_secret_env(var: &str) -> Result<Option<SecretString>, SecretEnvError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path_str) = env::var(&file_var) {
		if path_str.is_empty() {
			return Err(SecretEnvError::EmptyPath { var: file_var });
		}
		let path = PathBuf::from(path_str);
		let content = fs::read_to_string(&path).map_err(|source| SecretEnvError::Io {
			path: path.clone(),
			source,
		})?;
		let value = content.strip_suffix('\n').unwrap_or(&content);
		return Ok(Some(SecretString::new(value.to_string())));
	}

	Ok(env::var(var)
		.ok()
		.filter(|v| !v.is_empty())
		.map(SecretString::new))
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the Supabase administrative client.

use thiserror::Error;

/// Errors from GoTrue or PostgREST calls.
#[derive(Debug, Error)]
pub enum AdminError {
	/// Network-level error during HTTP communication.
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	/// The HTTP client could not be built.
	#[error("Client setup failed: {0}")]
	Setup(String),

	/// Supabase answered with a non-success status.
	#[error("Supabase API error: {status} - {message}")]
	Api { status: u16, message: String },

	/// Supabase answered with a body we could not decode.
	#[error("Invalid response from Supabase: {0}")]
	InvalidResponse(String),
}

impl AdminError {
	/// The message Supabase itself gave, without the status prefix.
	///
	/// PostgREST errors surface to callers verbatim, the way the dashboard
	/// shows them.
	pub fn detail(&self) -> String {
		match self {
			AdminError::Api { message, .. } => message.clone(),
			other => other.to_string(),
		}
	}
}

/// Outcome of a failed account creation, classified by the client so that
/// callers never inspect provider text.
#[derive(Debug, Error)]
pub enum CreateIdentityError {
	#[error("email address is already registered")]
	DuplicateEmail,

	#[error("{0}")]
	Other(String),
}

impl From<AdminError> for CreateIdentityError {
	fn from(e: AdminError) -> Self {
		CreateIdentityError::Other(e.detail())
	}
}

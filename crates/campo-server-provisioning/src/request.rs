// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use campo_common_secret::SecretString;
use serde::Deserialize;

use crate::error::PayloadProblem;
use crate::roles::Role;

/// The authenticated caller, as far as the scoping rules need to know it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
	pub id: String,
	pub role: Role,
	/// `None` when the caller's profile has no sede assigned.
	pub sede: Option<String>,
}

/// A validated request to create a field account.
#[derive(Debug, Clone)]
pub struct ProvisioningRequest {
	pub email: String,
	pub password: SecretString,
	pub full_name: String,
	pub role: Role,
	pub sede: String,
	pub phone: String,

	/// Profile id the caller claims as creator. Unset when the body omits it
	/// or sends an empty string.
	pub created_by: Option<String>,
}

#[derive(Deserialize)]
struct RawRequest {
	#[serde(default)]
	email: Option<String>,
	#[serde(default)]
	password: Option<SecretString>,
	#[serde(default)]
	full_name: Option<String>,
	#[serde(default)]
	role: Option<String>,
	#[serde(default)]
	sede: Option<String>,
	#[serde(default)]
	phone: Option<String>,
	#[serde(default)]
	created_by: Option<String>,
}

impl ProvisioningRequest {
	/// Parse and validate a JSON request body.
	///
	/// `null` counts as missing. Fields other than the seven known ones are
	/// ignored.
	pub fn from_json(body: &[u8]) -> Result<Self, PayloadProblem> {
		let value: serde_json::Value =
			serde_json::from_slice(body).map_err(|e| PayloadProblem::Malformed(e.to_string()))?;
		if !value.is_object() {
			return Err(PayloadProblem::Malformed(
				"se esperaba un objeto JSON".to_string(),
			));
		}
		let raw: RawRequest =
			serde_json::from_value(value).map_err(|e| PayloadProblem::Malformed(e.to_string()))?;

		let password = raw
			.password
			.filter(|p| !p.is_empty())
			.ok_or(PayloadProblem::MissingFields)?;

		Ok(Self {
			email: required(raw.email)?,
			password,
			full_name: required(raw.full_name)?,
			role: Role::parse(&required(raw.role)?),
			sede: required(raw.sede)?,
			phone: required(raw.phone)?,
			created_by: raw.created_by.filter(|s| !s.is_empty()),
		})
	}
}

fn required(field: Option<String>) -> Result<String, PayloadProblem> {
	field
		.filter(|s| !s.is_empty())
		.ok_or(PayloadProblem::MissingFields)
}

/// Token from an `Authorization` header value.
///
/// The `Bearer ` prefix is optional; a header that is empty once the prefix
/// is removed yields `None`.
pub fn extract_bearer_token(header: &str) -> Option<SecretString> {
	let token = header.strip_prefix("Bearer ").unwrap_or(header);
	if token.is_empty() {
		None
	} else {
		Some(SecretString::from(token))
	}
}

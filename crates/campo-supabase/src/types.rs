// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Records exchanged with GoTrue and the `users` table.

use campo_common_secret::SecretString;
use serde::{Deserialize, Serialize};

/// The account a bearer token resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
	pub id: String,
}

/// The columns of a `users` row needed to authorize a caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProfileRow {
	/// `None` on a row the signup trigger created and nobody filled in.
	#[serde(default)]
	pub role: Option<String>,
	#[serde(default)]
	pub sede: Option<String>,
}

/// Parameters for a GoTrue admin account creation.
///
/// The account is always created with its email already confirmed.
#[derive(Debug, Clone)]
pub struct NewIdentity {
	pub email: String,
	pub password: SecretString,
	pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedIdentity {
	pub id: String,
}

/// Column values written to the profile row after the account exists.
///
/// Every field is serialized, so a `None` region or creator is written as
/// SQL `NULL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
	pub full_name: String,
	pub role: String,
	pub sede: String,
	pub region: Option<String>,
	pub phone: String,
	pub status: String,
	pub created_by: Option<String>,
}

/// Whether an update touched the row it targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileUpdateOutcome {
	Updated,
	/// No row had the id. The `on_auth_user_created` trigger should have
	/// inserted one when the account was created.
	NoMatchingRow,
}

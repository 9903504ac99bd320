// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The administrative operations the provisioning workflow relies on.

use std::sync::Arc;

use async_trait::async_trait;
use campo_common_secret::SecretString;

use crate::error::{AdminError, CreateIdentityError};
use crate::types::{
	AuthUser, CreatedIdentity, NewIdentity, ProfileRow, ProfileUpdate, ProfileUpdateOutcome,
};

/// Privileged access to the identity store and the `users` table.
///
/// Implementations hold the service-role key and therefore bypass row-level
/// security. They keep no session between calls.
#[async_trait]
pub trait IdentityAdmin: Send + Sync {
	/// Resolve a caller's bearer token. `Ok(None)` means the token was
	/// rejected.
	async fn verify_token(&self, token: &SecretString) -> Result<Option<AuthUser>, AdminError>;

	/// Fetch the role and sede of a profile row. `Ok(None)` means no row.
	async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRow>, AdminError>;

	async fn create_identity(
		&self,
		identity: &NewIdentity,
	) -> Result<CreatedIdentity, CreateIdentityError>;

	async fn update_profile(
		&self,
		user_id: &str,
		update: &ProfileUpdate,
	) -> Result<ProfileUpdateOutcome, AdminError>;

	async fn delete_identity(&self, user_id: &str) -> Result<(), AdminError>;
}

/// Builds a fresh [`IdentityAdmin`] for each request.
pub trait AdminConnector: Send + Sync {
	fn connect(&self) -> Result<Arc<dyn IdentityAdmin>, AdminError>;
}

/// Connector producing [`crate::SupabaseAdminClient`]s for one project.
#[derive(Debug, Clone)]
pub struct SupabaseConnector {
	url: String,
	service_role_key: SecretString,
	timeout: std::time::Duration,
}

impl SupabaseConnector {
	pub fn new(
		url: impl Into<String>,
		service_role_key: SecretString,
		timeout: std::time::Duration,
	) -> Self {
		Self {
			url: url.into(),
			service_role_key,
			timeout,
		}
	}
}

impl AdminConnector for SupabaseConnector {
	fn connect(&self) -> Result<Arc<dyn IdentityAdmin>, AdminError> {
		let client =
			crate::SupabaseAdminClient::new(&self.url, self.service_role_key.clone(), self.timeout)?;
		Ok(Arc::new(client))
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory [`IdentityAdmin`] for tests.
//!
//! Behaves like a Supabase project whose `on_auth_user_created` trigger
//! inserts a blank profile row for every new account, and records every call
//! so tests can assert on side effects.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use campo_common_secret::SecretString;

use crate::admin::{AdminConnector, IdentityAdmin};
use crate::error::{AdminError, CreateIdentityError};
use crate::types::{
	AuthUser, CreatedIdentity, NewIdentity, ProfileRow, ProfileUpdate, ProfileUpdateOutcome,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCall {
	VerifyToken,
	GetProfile(String),
	CreateIdentity(String),
	UpdateProfile(String),
	DeleteIdentity(String),
}

#[derive(Default)]
pub struct FakeAdmin {
	sessions: HashMap<String, AuthUser>,
	profiles: HashMap<String, ProfileRow>,
	next_ids: Mutex<Vec<String>>,
	registered_emails: Mutex<HashSet<String>>,
	/// Trigger-created rows of accounts made through this fake.
	provisioned: Mutex<HashMap<String, Option<ProfileUpdate>>>,
	calls: Mutex<Vec<AdminCall>>,
	token_lookup_error: bool,
	profile_lookup_error: bool,
	create_error: Option<String>,
	update_error: Option<String>,
	delete_error: bool,
	skip_profile_trigger: bool,
	id_counter: AtomicUsize,
}

impl FakeAdmin {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a caller: `token` resolves to `id`, whose profile has the
	/// given role and sede.
	pub fn with_user(mut self, token: &str, id: &str, role: &str, sede: Option<&str>) -> Self {
		self
			.sessions
			.insert(token.to_string(), AuthUser { id: id.to_string() });
		self.profiles.insert(
			id.to_string(),
			ProfileRow {
				role: Some(role.to_string()),
				sede: sede.map(str::to_string),
			},
		);
		self
	}

	/// A caller whose profile row exists but has no role or sede, as left by
	/// the signup trigger.
	pub fn with_blank_profile(mut self, token: &str, id: &str) -> Self {
		self
			.sessions
			.insert(token.to_string(), AuthUser { id: id.to_string() });
		self.profiles.insert(
			id.to_string(),
			ProfileRow {
				role: None,
				sede: None,
			},
		);
		self
	}

	/// A token that resolves to an account with no profile row.
	pub fn with_session_only(mut self, token: &str, id: &str) -> Self {
		self
			.sessions
			.insert(token.to_string(), AuthUser { id: id.to_string() });
		self
	}

	/// Ids handed out by `create_identity`, in order.
	pub fn with_next_ids(self, ids: &[&str]) -> Self {
		*self.next_ids.lock().unwrap() = ids.iter().rev().map(|s| s.to_string()).collect();
		self
	}

	pub fn with_registered_email(self, email: &str) -> Self {
		self.registered_emails
			.lock()
			.unwrap()
			.insert(email.to_string());
		self
	}

	pub fn failing_token_lookup(mut self) -> Self {
		self.token_lookup_error = true;
		self
	}

	pub fn failing_profile_lookup(mut self) -> Self {
		self.profile_lookup_error = true;
		self
	}

	pub fn failing_create(mut self, message: &str) -> Self {
		self.create_error = Some(message.to_string());
		self
	}

	pub fn failing_update(mut self, message: &str) -> Self {
		self.update_error = Some(message.to_string());
		self
	}

	pub fn failing_delete(mut self) -> Self {
		self.delete_error = true;
		self
	}

	/// Simulate a project where the profile trigger is missing.
	pub fn without_profile_trigger(mut self) -> Self {
		self.skip_profile_trigger = true;
		self
	}

	pub fn calls(&self) -> Vec<AdminCall> {
		self.calls.lock().unwrap().clone()
	}

	pub fn deleted_ids(&self) -> Vec<String> {
		self
			.calls()
			.into_iter()
			.filter_map(|c| match c {
				AdminCall::DeleteIdentity(id) => Some(id),
				_ => None,
			})
			.collect()
	}

	pub fn create_calls(&self) -> usize {
		self
			.calls()
			.iter()
			.filter(|c| matches!(c, AdminCall::CreateIdentity(_)))
			.count()
	}

	/// The values last written to the profile row of `id`.
	pub fn profile_update(&self, id: &str) -> Option<ProfileUpdate> {
		self.provisioned.lock().unwrap().get(id).cloned().flatten()
	}

	/// Whether an account with this id still exists.
	pub fn identity_exists(&self, id: &str) -> bool {
		self.provisioned.lock().unwrap().contains_key(id)
	}

	fn record(&self, call: AdminCall) {
		self.calls.lock().unwrap().push(call);
	}

	fn next_id(&self) -> String {
		self.next_ids.lock().unwrap().pop().unwrap_or_else(|| {
			let n = self.id_counter.fetch_add(1, Ordering::SeqCst);
			format!("user-{n}")
		})
	}
}

#[async_trait]
impl IdentityAdmin for FakeAdmin {
	async fn verify_token(&self, token: &SecretString) -> Result<Option<AuthUser>, AdminError> {
		self.record(AdminCall::VerifyToken);
		if self.token_lookup_error {
			return Err(AdminError::Api {
				status: 500,
				message: "auth service unavailable".to_string(),
			});
		}
		Ok(self.sessions.get(token.expose()).cloned())
	}

	async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRow>, AdminError> {
		self.record(AdminCall::GetProfile(user_id.to_string()));
		if self.profile_lookup_error {
			return Err(AdminError::Api {
				status: 500,
				message: "relation \"users\" does not exist".to_string(),
			});
		}
		Ok(self.profiles.get(user_id).cloned())
	}

	async fn create_identity(
		&self,
		identity: &NewIdentity,
	) -> Result<CreatedIdentity, CreateIdentityError> {
		self.record(AdminCall::CreateIdentity(identity.email.clone()));
		if let Some(message) = &self.create_error {
			return Err(CreateIdentityError::Other(message.clone()));
		}
		if !self
			.registered_emails
			.lock()
			.unwrap()
			.insert(identity.email.clone())
		{
			return Err(CreateIdentityError::DuplicateEmail);
		}

		let id = self.next_id();
		if !self.skip_profile_trigger {
			self.provisioned.lock().unwrap().insert(id.clone(), None);
		}
		Ok(CreatedIdentity { id })
	}

	async fn update_profile(
		&self,
		user_id: &str,
		update: &ProfileUpdate,
	) -> Result<ProfileUpdateOutcome, AdminError> {
		self.record(AdminCall::UpdateProfile(user_id.to_string()));
		if let Some(message) = &self.update_error {
			return Err(AdminError::Api {
				status: 400,
				message: message.clone(),
			});
		}
		match self.provisioned.lock().unwrap().get_mut(user_id) {
			Some(row) => {
				*row = Some(update.clone());
				Ok(ProfileUpdateOutcome::Updated)
			}
			None => Ok(ProfileUpdateOutcome::NoMatchingRow),
		}
	}

	async fn delete_identity(&self, user_id: &str) -> Result<(), AdminError> {
		self.record(AdminCall::DeleteIdentity(user_id.to_string()));
		if self.delete_error {
			return Err(AdminError::Api {
				status: 500,
				message: "delete failed".to_string(),
			});
		}
		self.provisioned.lock().unwrap().remove(user_id);
		Ok(())
	}
}

/// Connector that always hands out the same [`FakeAdmin`].
pub struct FakeConnector {
	admin: Arc<FakeAdmin>,
	unavailable: bool,
	connects: AtomicUsize,
}

impl FakeConnector {
	pub fn new(admin: Arc<FakeAdmin>) -> Self {
		Self {
			admin,
			unavailable: false,
			connects: AtomicUsize::new(0),
		}
	}

	/// A connector whose client can never be built.
	pub fn unavailable() -> Self {
		Self {
			admin: Arc::new(FakeAdmin::new()),
			unavailable: true,
			connects: AtomicUsize::new(0),
		}
	}

	pub fn connects(&self) -> usize {
		self.connects.load(Ordering::SeqCst)
	}
}

impl AdminConnector for FakeConnector {
	fn connect(&self) -> Result<Arc<dyn IdentityAdmin>, AdminError> {
		self.connects.fetch_add(1, Ordering::SeqCst);
		if self.unavailable {
			return Err(AdminError::Setup("no TLS backend".to_string()));
		}
		let admin: Arc<dyn IdentityAdmin> = self.admin.clone();
		Ok(admin)
	}
}

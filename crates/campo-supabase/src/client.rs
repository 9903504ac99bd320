// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! reqwest implementation of [`IdentityAdmin`] against a Supabase project.
//!
//! Accounts live behind GoTrue (`/auth/v1`), profiles in the `users` table
//! behind PostgREST (`/rest/v1`). Every call carries the service-role key as
//! `apikey`; everything except token verification also authorizes with it.

use std::time::Duration;

use async_trait::async_trait;
use campo_common_secret::SecretString;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error, instrument, warn};

use crate::admin::IdentityAdmin;
use crate::error::{AdminError, CreateIdentityError};
use crate::types::{
	AuthUser, CreatedIdentity, NewIdentity, ProfileRow, ProfileUpdate, ProfileUpdateOutcome,
};

const USER_AGENT: &str = concat!("campo/", env!("CARGO_PKG_VERSION"));
const CLIENT_INFO: &str = concat!("campo-supabase/", env!("CARGO_PKG_VERSION"));
const PROFILES_TABLE: &str = "users";

/// GoTrue `error_code`s meaning the email already has an account.
const DUPLICATE_EMAIL_CODES: &[&str] = &["email_exists", "user_already_exists"];

/// Stateless administrative client for one Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseAdminClient {
	http_client: Client,
	base_url: String,
	service_role_key: SecretString,
}

impl SupabaseAdminClient {
	pub fn new(
		base_url: impl Into<String>,
		service_role_key: SecretString,
		timeout: Duration,
	) -> Result<Self, AdminError> {
		let http_client = Client::builder()
			.user_agent(USER_AGENT)
			.timeout(timeout)
			.build()
			.map_err(|e| AdminError::Setup(e.to_string()))?;

		Ok(Self {
			http_client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			service_role_key,
		})
	}

	fn auth_url(&self, path: &str) -> String {
		format!("{}/auth/v1{}", self.base_url, path)
	}

	fn profiles_url(&self) -> String {
		format!("{}/rest/v1/{}", self.base_url, PROFILES_TABLE)
	}

	fn request(&self, method: Method, url: String) -> RequestBuilder {
		self
			.http_client
			.request(method, url)
			.header("apikey", self.service_role_key.expose())
			.header("x-client-info", CLIENT_INFO)
	}

	fn service_request(&self, method: Method, url: String) -> RequestBuilder {
		self
			.request(method, url)
			.bearer_auth(self.service_role_key.expose())
	}
}

#[async_trait]
impl IdentityAdmin for SupabaseAdminClient {
	#[instrument(skip_all)]
	async fn verify_token(&self, token: &SecretString) -> Result<Option<AuthUser>, AdminError> {
		let response = self
			.request(Method::GET, self.auth_url("/user"))
			.bearer_auth(token.expose())
			.send()
			.await?;

		let status = response.status();
		if status.is_client_error() {
			debug!(status = %status, "token rejected by GoTrue");
			return Ok(None);
		}
		if !status.is_success() {
			return Err(api_error(response).await);
		}

		decode::<AuthUser>(response).await.map(Some)
	}

	#[instrument(skip(self))]
	async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRow>, AdminError> {
		let id_filter = format!("eq.{user_id}");
		let response = self
			.service_request(Method::GET, self.profiles_url())
			.query(&[("select", "role,sede"), ("id", id_filter.as_str())])
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(api_error(response).await);
		}

		let mut rows: Vec<ProfileRow> = decode(response).await?;
		if rows.len() > 1 {
			warn!(count = rows.len(), "more than one profile row for id");
			return Err(AdminError::InvalidResponse(format!(
				"expected at most one profile row, got {}",
				rows.len()
			)));
		}
		Ok(rows.pop())
	}

	#[instrument(skip_all, fields(email = %identity.email))]
	async fn create_identity(
		&self,
		identity: &NewIdentity,
	) -> Result<CreatedIdentity, CreateIdentityError> {
		let body = json!({
			"email": identity.email,
			"password": identity.password.expose(),
			"email_confirm": true,
			"user_metadata": { "full_name": identity.full_name },
		});

		let response = self
			.service_request(Method::POST, self.auth_url("/admin/users"))
			.json(&body)
			.send()
			.await
			.map_err(AdminError::from)?;

		let status = response.status();
		if status.is_success() {
			return Ok(decode::<CreatedIdentity>(response).await?);
		}

		let body = response.text().await.unwrap_or_default();
		let failure = ApiFailure::parse(status, &body);
		if failure.is_duplicate_email() {
			debug!("GoTrue reports email already registered");
			return Err(CreateIdentityError::DuplicateEmail);
		}

		error!(status = %status, message = %failure.message, "account creation failed");
		Err(CreateIdentityError::Other(failure.message))
	}

	#[instrument(skip(self, update))]
	async fn update_profile(
		&self,
		user_id: &str,
		update: &ProfileUpdate,
	) -> Result<ProfileUpdateOutcome, AdminError> {
		let id_filter = format!("eq.{user_id}");
		let response = self
			.service_request(Method::PATCH, self.profiles_url())
			.query(&[("id", id_filter.as_str())])
			.header("Prefer", "return=representation")
			.json(update)
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(api_error(response).await);
		}

		let rows: Vec<Value> = decode(response).await?;
		if rows.is_empty() {
			return Ok(ProfileUpdateOutcome::NoMatchingRow);
		}
		Ok(ProfileUpdateOutcome::Updated)
	}

	#[instrument(skip(self))]
	async fn delete_identity(&self, user_id: &str) -> Result<(), AdminError> {
		let response = self
			.service_request(Method::DELETE, self.auth_url(&format!("/admin/users/{user_id}")))
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(api_error(response).await);
		}
		Ok(())
	}
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AdminError> {
	let body = response.text().await?;
	serde_json::from_str(&body).map_err(|e| {
		error!(error = %e, "failed to parse Supabase response");
		AdminError::InvalidResponse(format!("JSON parse error: {e}"))
	})
}

async fn api_error(response: Response) -> AdminError {
	let status = response.status();
	let body = response.text().await.unwrap_or_default();
	let failure = ApiFailure::parse(status, &body);
	error!(status = %status, message = %failure.message, "Supabase API error");
	AdminError::Api {
		status: status.as_u16(),
		message: failure.message,
	}
}

/// The useful parts of a GoTrue or PostgREST error body.
#[derive(Debug)]
struct ApiFailure {
	error_code: Option<String>,
	message: String,
}

impl ApiFailure {
	// GoTrue uses `msg` / `error_description`, PostgREST uses `message`.
	fn parse(status: StatusCode, body: &str) -> Self {
		let value: Value = serde_json::from_str(body).unwrap_or(Value::Null);
		let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);

		let message = ["msg", "message", "error_description", "error"]
			.iter()
			.find_map(|name| field(*name))
			.or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
			.unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

		Self {
			error_code: field("error_code"),
			message,
		}
	}

	fn is_duplicate_email(&self) -> bool {
		if let Some(code) = &self.error_code {
			if DUPLICATE_EMAIL_CODES.contains(&code.as_str()) {
				return true;
			}
		}
		// Older GoTrue releases only say it in the message.
		let message = self.message.to_lowercase();
		message.contains("already registered") || message.contains("already been registered")
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User provisioning HTTP handlers.

use axum::body::Bytes;
use axum::extract::{rejection::BytesRejection, State};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum::Json;
use campo_server_provisioning::{PayloadProblem, ProvisioningError, SUCCESS_MESSAGE};
use serde::Serialize;

use crate::api::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
	pub success: bool,
	pub user_id: String,
	pub message: &'static str,
}

/// POST /create-user - Create a field account for an owner or supervisor.
///
/// The body is read raw so that malformed JSON is reported in the standard
/// error shape instead of axum's rejection. A body that cannot be buffered
/// (over the default 2 MB limit) is reported the same way.
pub async fn create_user(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Result<Bytes, BytesRejection>,
) -> Result<Json<CreateUserResponse>, ApiError> {
	let body = body.map_err(|rejection| {
		tracing::debug!(error = %rejection.body_text(), "request body rejected");
		ProvisioningError::from(PayloadProblem::Malformed(rejection.body_text()))
	})?;

	// Decoded lossily so a non-UTF-8 header counts as a bad token, not a missing one.
	let authorization = headers
		.get(AUTHORIZATION)
		.map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

	let user = state
		.user_provisioning
		.provision(authorization.as_deref(), &body)
		.await?;

	Ok(Json(CreateUserResponse {
		success: true,
		user_id: user.user_id,
		message: SUCCESS_MESSAGE,
	}))
}

/// OPTIONS /create-user - CORS preflight.
pub async fn preflight() -> &'static str {
	"ok"
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use campo_server_provisioning::ProvisioningError;
use serde::Serialize;

/// Body of every failed provisioning call.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub success: bool,
	pub error: String,
}

/// A provisioning failure on its way to the client.
///
/// All failures share status 400; clients tell them apart by message.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub ProvisioningError);

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		tracing::info!(kind = self.0.kind(), error = %self.0, "provisioning request failed");

		let body = ErrorResponse {
			success: false,
			error: self.0.to_string(),
		};
		(StatusCode::BAD_REQUEST, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use campo_server_provisioning::AuthFailure;

	#[tokio::test]
	async fn errors_render_as_400_with_message() {
		let response = ApiError::from(ProvisioningError::from(AuthFailure::MissingHeader)).into_response();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);

		let body = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
		assert_eq!(
			json,
			serde_json::json!({ "success": false, "error": "No authorization header" })
		);
	}
}

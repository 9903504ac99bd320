// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::Json;
use serde::Serialize;

use crate::version::VERSION;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: &'static str,
	pub version: &'static str,
}

/// GET /health - Liveness probe. Does not contact Supabase.
pub async fn health_check() -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "ok",
		version: VERSION,
	})
}

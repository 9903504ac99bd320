// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Router and shared state.

use std::sync::Arc;

use axum::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN};
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use campo_server_provisioning::UserProvisioningService;
use campo_supabase::AdminConnector;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::routes;

/// Headers the browser clients send with a provisioning call.
pub const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub user_provisioning: Arc<UserProvisioningService>,
}

pub fn create_app_state(connector: Arc<dyn AdminConnector>) -> AppState {
	AppState {
		user_provisioning: Arc::new(UserProvisioningService::new(connector)),
	}
}

/// Build the router.
///
/// The provisioning endpoint is mounted both at `/create-user` and under the
/// Supabase Functions prefix so existing callers keep working. Every
/// response, errors included, carries the CORS headers.
pub fn create_router(state: AppState) -> Router {
	let create_user = post(routes::users::create_user).options(routes::users::preflight);

	Router::new()
		.route("/create-user", create_user.clone())
		.route("/functions/v1/create-user", create_user)
		.route("/health", get(routes::health::health_check))
		.with_state(state)
		.layer(SetResponseHeaderLayer::overriding(
			ACCESS_CONTROL_ALLOW_ORIGIN,
			HeaderValue::from_static("*"),
		))
		.layer(SetResponseHeaderLayer::overriding(
			ACCESS_CONTROL_ALLOW_HEADERS,
			HeaderValue::from_static(CORS_ALLOW_HEADERS),
		))
		.layer(TraceLayer::new_for_http())
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
	body::Body,
	http::{header, Method, Request},
	response::Response,
	Router,
};
use campo_server::{create_app_state, create_router};
use campo_supabase::testing::{FakeAdmin, FakeConnector};
use tower::ServiceExt;

pub const OWNER_TOKEN: &str = "owner-token";
pub const SUPERVISOR_TOKEN: &str = "supervisor-token";
pub const MERCADERISTA_TOKEN: &str = "mercaderista-token";

/// Owner without a sede, a `disbattery` supervisor and a mercaderista.
pub fn seeded_admin() -> FakeAdmin {
	FakeAdmin::new()
		.with_user(OWNER_TOKEN, "owner-1", "owner", None)
		.with_user(SUPERVISOR_TOKEN, "supervisor-1", "supervisor", Some("disbattery"))
		.with_user(MERCADERISTA_TOKEN, "merc-1", "mercaderista", Some("disbattery"))
}

pub struct TestApp {
	pub router: Router,
	pub admin: Arc<FakeAdmin>,
	pub connector: Arc<FakeConnector>,
}

impl TestApp {
	pub fn new() -> Self {
		Self::with_admin(seeded_admin())
	}

	pub fn with_admin(admin: FakeAdmin) -> Self {
		let admin = Arc::new(admin);
		let connector = Arc::new(FakeConnector::new(admin.clone()));
		let router = create_router(create_app_state(connector.clone()));
		Self {
			router,
			admin,
			connector,
		}
	}

	pub async fn request(&self, request: Request<Body>) -> Response {
		self.router.clone().oneshot(request).await.unwrap()
	}

	pub async fn post(&self, path: &str, token: Option<&str>, body: serde_json::Value) -> Response {
		self
			.post_raw(path, token, serde_json::to_vec(&body).unwrap())
			.await
	}

	pub async fn post_raw(&self, path: &str, token: Option<&str>, body: Vec<u8>) -> Response {
		let mut builder = Request::builder()
			.method(Method::POST)
			.uri(path)
			.header(header::CONTENT_TYPE, "application/json");
		if let Some(token) = token {
			builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
		}
		self.request(builder.body(Body::from(body)).unwrap()).await
	}
}

pub fn new_user(role: &str, sede: &str) -> serde_json::Value {
	serde_json::json!({
		"email": "nuevo@example.com",
		"password": "s3cret-pass",
		"full_name": "Nuevo Usuario",
		"role": role,
		"sede": sede,
		"phone": "04120000000",
	})
}

pub async fn body_json(response: Response) -> serde_json::Value {
	let body = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	serde_json::from_slice(&body).unwrap()
}

pub async fn body_text(response: Response) -> String {
	let body = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	String::from_utf8(body.to_vec()).unwrap()
}

pub fn assert_cors(response: &Response) {
	let headers = response.headers();
	assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
	assert_eq!(
		headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
		"authorization, x-client-info, apikey, content-type"
	);
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Campo provisioning server.
//!
//! Exposes the user provisioning workflow over HTTP with the request and
//! response shapes the Campo web and mobile clients already use.

pub mod api;
pub mod error;
pub mod routes;
pub mod version;

pub use api::{create_app_state, create_router, AppState};
pub use campo_server_config::ServerConfig;
pub use error::ApiError;

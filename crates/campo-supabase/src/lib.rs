// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Supabase administrative client for Campo.
//!
//! [`IdentityAdmin`] is the seam the provisioning workflow depends on;
//! [`SupabaseAdminClient`] implements it over HTTP and [`SupabaseConnector`]
//! hands out a fresh client per request.

pub mod admin;
pub mod client;
pub mod error;
pub mod testing;
pub mod types;

pub use admin::{AdminConnector, IdentityAdmin, SupabaseConnector};
pub use client::SupabaseAdminClient;
pub use error::{AdminError, CreateIdentityError};
pub use types::{
	AuthUser, CreatedIdentity, NewIdentity, ProfileRow, ProfileUpdate, ProfileUpdateOutcome,
};

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User provisioning for Campo.
//!
//! An owner or supervisor creates a field account in one call: the caller is
//! authenticated, checked against the scoping rules for their role, and the
//! new identity is created with its profile row filled in. If the profile
//! cannot be written the identity is deleted again.

mod error;
mod request;
mod roles;
mod service;

pub use error::{AuthFailure, ForbiddenReason, PayloadProblem, ProvisioningError};
pub use request::{extract_bearer_token, ProvisioningRequest, Requester};
pub use roles::{region_for_sede, Region, Role};
pub use service::{ProvisionedUser, UserProvisioningService, SUCCESS_MESSAGE};

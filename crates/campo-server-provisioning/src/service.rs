// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use campo_supabase::{
	AdminConnector, CreateIdentityError, IdentityAdmin, NewIdentity, ProfileUpdate,
	ProfileUpdateOutcome,
};

use crate::error::{AuthFailure, ForbiddenReason, ProvisioningError};
use crate::request::{extract_bearer_token, ProvisioningRequest, Requester};
use crate::roles::{region_for_sede, Role};

/// Result type for provisioning operations.
pub type Result<T> = std::result::Result<T, ProvisioningError>;

pub const SUCCESS_MESSAGE: &str = "Usuario creado exitosamente";

const ACTIVE_STATUS: &str = "active";

/// An account created by [`UserProvisioningService::provision`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedUser {
	pub user_id: String,
}

/// Creates field accounts on behalf of owners and supervisors.
///
/// Every call builds its own admin client through the connector; the
/// service holds no other state.
#[derive(Clone)]
pub struct UserProvisioningService {
	connector: Arc<dyn AdminConnector>,
}

impl UserProvisioningService {
	pub fn new(connector: Arc<dyn AdminConnector>) -> Self {
		Self { connector }
	}

	/// Run one provisioning request.
	///
	/// `authorization` is the raw `Authorization` header value and `body` the
	/// raw request body. Checks run in a fixed order and the first failure
	/// wins, so nothing is written unless the caller is authenticated,
	/// allowed, and the payload is complete.
	///
	/// Creating the identity and writing its profile are two separate calls.
	/// If the profile write fails the identity is deleted again; a crash in
	/// between leaves an identity without a profile.
	#[tracing::instrument(skip_all, fields(user_id = tracing::field::Empty))]
	pub async fn provision(
		&self,
		authorization: Option<&str>,
		body: &[u8],
	) -> Result<ProvisionedUser> {
		let admin = self.connector.connect().map_err(|e| {
			tracing::error!(error = %e, "failed to build admin client");
			ProvisioningError::Configuration(e.to_string())
		})?;

		let requester = self.authenticate(admin.as_ref(), authorization).await?;
		if !requester.role.can_provision() {
			tracing::warn!(requester = %requester.id, role = %requester.role, "provisioning denied for role");
			return Err(ForbiddenReason::RoleNotAllowed.into());
		}

		let request = ProvisioningRequest::from_json(body)?;
		check_scope(&requester, &request)?;

		let created = admin
			.create_identity(&NewIdentity {
				email: request.email.clone(),
				password: request.password.clone(),
				full_name: request.full_name.clone(),
			})
			.await
			.map_err(|e| match e {
				CreateIdentityError::DuplicateEmail => ProvisioningError::DuplicateEmail,
				CreateIdentityError::Other(message) => {
					tracing::warn!(error = %message, "identity creation failed");
					ProvisioningError::IdentityCreationFailed(message)
				}
			})?;
		tracing::Span::current().record("user_id", created.id.as_str());

		let update = profile_update(&requester, &request);
		let failure = match admin.update_profile(&created.id, &update).await {
			Ok(ProfileUpdateOutcome::Updated) => None,
			Ok(ProfileUpdateOutcome::NoMatchingRow) => Some(format!(
				"no existe un perfil para el usuario {}",
				created.id
			)),
			Err(e) => Some(e.detail()),
		};

		if let Some(message) = failure {
			tracing::warn!(error = %message, "profile update failed, removing new identity");
			rollback_identity(admin.as_ref(), &created.id).await;
			return Err(ProvisioningError::ProfileUpdateFailed(message));
		}

		tracing::info!(
			requester = %requester.id,
			role = %request.role,
			sede = %request.sede,
			"user provisioned"
		);
		Ok(ProvisionedUser {
			user_id: created.id,
		})
	}

	async fn authenticate(
		&self,
		admin: &dyn IdentityAdmin,
		authorization: Option<&str>,
	) -> Result<Requester> {
		let header = authorization
			.filter(|value| !value.is_empty())
			.ok_or(AuthFailure::MissingHeader)?;
		let token = extract_bearer_token(header).ok_or(AuthFailure::InvalidToken)?;

		let user = match admin.verify_token(&token).await {
			Ok(Some(user)) => user,
			Ok(None) => {
				tracing::debug!("bearer token rejected");
				return Err(AuthFailure::InvalidToken.into());
			}
			Err(e) => {
				tracing::warn!(error = %e, "token verification failed");
				return Err(AuthFailure::InvalidToken.into());
			}
		};

		let profile = match admin.get_profile(&user.id).await {
			Ok(Some(profile)) => profile,
			Ok(None) => {
				tracing::warn!(requester = %user.id, "requester has no profile row");
				return Err(ProvisioningError::ProfileUnavailable);
			}
			Err(e) => {
				tracing::warn!(requester = %user.id, error = %e, "profile lookup failed");
				return Err(ProvisioningError::ProfileUnavailable);
			}
		};

		// A blank trigger-created row has no role and may not provision.
		let role = profile
			.role
			.as_deref()
			.map(Role::parse)
			.unwrap_or_else(|| Role::Other(String::new()));

		Ok(Requester {
			id: user.id,
			role,
			sede: profile.sede,
		})
	}
}

/// Supervisors may only create mercaderistas for their own sede.
fn check_scope(requester: &Requester, request: &ProvisioningRequest) -> Result<()> {
	if requester.role != Role::Supervisor {
		return Ok(());
	}
	if requester.sede.as_deref() != Some(request.sede.as_str()) {
		return Err(ForbiddenReason::OtherSede.into());
	}
	if request.role != Role::Mercaderista {
		return Err(ForbiddenReason::RoleOutOfScope.into());
	}
	Ok(())
}

fn profile_update(requester: &Requester, request: &ProvisioningRequest) -> ProfileUpdate {
	let created_by = match &request.created_by {
		Some(claimed) => {
			if *claimed != requester.id {
				tracing::warn!(
					requester = %requester.id,
					created_by = %claimed,
					"created_by differs from authenticated requester"
				);
			}
			claimed.clone()
		}
		None => requester.id.clone(),
	};

	ProfileUpdate {
		full_name: request.full_name.clone(),
		role: request.role.as_str().to_string(),
		sede: request.sede.clone(),
		region: region_for_sede(&request.sede).map(|r| r.as_str().to_string()),
		phone: request.phone.clone(),
		status: ACTIVE_STATUS.to_string(),
		created_by: Some(created_by),
	}
}

async fn rollback_identity(admin: &dyn IdentityAdmin, user_id: &str) {
	match admin.delete_identity(user_id).await {
		Ok(()) => tracing::info!(user_id, "removed identity after failed profile update"),
		Err(e) => tracing::error!(
			user_id,
			error = %e,
			"failed to remove identity after failed profile update; identity is orphaned"
		),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use campo_supabase::testing::{AdminCall, FakeAdmin, FakeConnector};
	use serde_json::json;

	use crate::error::PayloadProblem;

	const OWNER_TOKEN: &str = "owner-token";
	const SUPERVISOR_TOKEN: &str = "supervisor-token";
	const MERCADERISTA_TOKEN: &str = "mercaderista-token";

	fn admin() -> FakeAdmin {
		FakeAdmin::new()
			.with_user(OWNER_TOKEN, "owner-1", "owner", None)
			.with_user(SUPERVISOR_TOKEN, "supervisor-1", "supervisor", Some("disbattery"))
			.with_user(MERCADERISTA_TOKEN, "merc-1", "mercaderista", Some("disbattery"))
	}

	fn service(admin: Arc<FakeAdmin>) -> UserProvisioningService {
		UserProvisioningService::new(Arc::new(FakeConnector::new(admin)))
	}

	fn payload(role: &str, sede: &str) -> Vec<u8> {
		serde_json::to_vec(&json!({
			"email": "nuevo@example.com",
			"password": "s3cret-pass",
			"full_name": "Nuevo Usuario",
			"role": role,
			"sede": sede,
			"phone": "04120000000",
		}))
		.unwrap()
	}

	fn bearer(token: &str) -> String {
		format!("Bearer {token}")
	}

	#[tokio::test]
	async fn owner_creates_user_with_derived_region() {
		let admin = Arc::new(admin().with_next_ids(&["U1"]));
		let result = service(admin.clone())
			.provision(Some(&bearer(OWNER_TOKEN)), &payload("supervisor", "blitz_2000"))
			.await
			.unwrap();

		assert_eq!(result.user_id, "U1");
		let update = admin.profile_update("U1").unwrap();
		assert_eq!(update.role, "supervisor");
		assert_eq!(update.sede, "blitz_2000");
		assert_eq!(update.region.as_deref(), Some("centro_los_llanos"));
		assert_eq!(update.status, "active");
		assert_eq!(update.created_by.as_deref(), Some("owner-1"));
		assert!(admin.deleted_ids().is_empty());
	}

	#[tokio::test]
	async fn unknown_sede_stores_null_region() {
		let admin = Arc::new(admin().with_next_ids(&["U1"]));
		service(admin.clone())
			.provision(Some(&bearer(OWNER_TOKEN)), &payload("mercaderista", "unknown_value"))
			.await
			.unwrap();

		assert_eq!(admin.profile_update("U1").unwrap().region, None);
	}

	#[tokio::test]
	async fn supervisor_creates_mercaderista_in_own_sede() {
		let admin = Arc::new(admin().with_next_ids(&["U2"]));
		let result = service(admin.clone())
			.provision(Some(&bearer(SUPERVISOR_TOKEN)), &payload("mercaderista", "disbattery"))
			.await
			.unwrap();

		assert_eq!(result.user_id, "U2");
		assert_eq!(
			admin.profile_update("U2").unwrap().region.as_deref(),
			Some("oriente")
		);
	}

	#[tokio::test]
	async fn missing_header_is_rejected_before_any_lookup() {
		let admin = Arc::new(admin());
		let err = service(admin.clone())
			.provision(None, &payload("mercaderista", "disbattery"))
			.await
			.unwrap_err();

		assert_eq!(err, ProvisioningError::from(AuthFailure::MissingHeader));
		assert!(admin.calls().is_empty());
	}

	#[tokio::test]
	async fn empty_header_counts_as_missing() {
		let admin = Arc::new(admin());
		let err = service(admin.clone())
			.provision(Some(""), &payload("mercaderista", "disbattery"))
			.await
			.unwrap_err();

		assert_eq!(err, ProvisioningError::from(AuthFailure::MissingHeader));
		assert_eq!(err.to_string(), "No authorization header");
		assert!(admin.calls().is_empty());
	}

	#[tokio::test]
	async fn unknown_token_is_unauthenticated() {
		let admin = Arc::new(admin());
		let err = service(admin.clone())
			.provision(Some("Bearer nope"), &payload("mercaderista", "disbattery"))
			.await
			.unwrap_err();

		assert_eq!(err, ProvisioningError::from(AuthFailure::InvalidToken));
		assert_eq!(admin.calls(), vec![AdminCall::VerifyToken]);
	}

	#[tokio::test]
	async fn token_verification_error_is_unauthenticated() {
		let admin = Arc::new(admin().failing_token_lookup());
		let err = service(admin)
			.provision(Some(&bearer(OWNER_TOKEN)), &payload("mercaderista", "disbattery"))
			.await
			.unwrap_err();

		assert_eq!(err, ProvisioningError::from(AuthFailure::InvalidToken));
	}

	#[tokio::test]
	async fn empty_bearer_is_unauthenticated_without_lookup() {
		let admin = Arc::new(admin());
		let err = service(admin.clone())
			.provision(Some("Bearer "), &payload("mercaderista", "disbattery"))
			.await
			.unwrap_err();

		assert_eq!(err, ProvisioningError::from(AuthFailure::InvalidToken));
		assert!(admin.calls().is_empty());
	}

	#[tokio::test]
	async fn requester_without_profile_is_rejected() {
		let admin = Arc::new(admin().with_session_only("ghost-token", "ghost-1"));
		let err = service(admin.clone())
			.provision(Some(&bearer("ghost-token")), &payload("mercaderista", "disbattery"))
			.await
			.unwrap_err();

		assert_eq!(err, ProvisioningError::ProfileUnavailable);
		assert_eq!(admin.create_calls(), 0);
	}

	#[tokio::test]
	async fn profile_lookup_error_is_profile_unavailable() {
		let admin = Arc::new(admin().failing_profile_lookup());
		let err = service(admin)
			.provision(Some(&bearer(OWNER_TOKEN)), &payload("mercaderista", "disbattery"))
			.await
			.unwrap_err();

		assert_eq!(err, ProvisioningError::ProfileUnavailable);
	}

	#[tokio::test]
	async fn mercaderista_cannot_provision() {
		let admin = Arc::new(admin());
		let err = service(admin.clone())
			.provision(Some(&bearer(MERCADERISTA_TOKEN)), &payload("mercaderista", "disbattery"))
			.await
			.unwrap_err();

		assert_eq!(err, ProvisioningError::from(ForbiddenReason::RoleNotAllowed));
		assert_eq!(admin.create_calls(), 0);
	}

	#[tokio::test]
	async fn requester_with_blank_profile_cannot_provision() {
		let admin = Arc::new(admin().with_blank_profile("blank-token", "blank-1"));
		let err = service(admin.clone())
			.provision(Some(&bearer("blank-token")), &payload("mercaderista", "disbattery"))
			.await
			.unwrap_err();

		assert_eq!(err, ProvisioningError::from(ForbiddenReason::RoleNotAllowed));
		assert_eq!(admin.create_calls(), 0);
	}

	#[tokio::test]
	async fn role_gate_runs_before_payload_validation() {
		let admin = Arc::new(admin());
		let err = service(admin)
			.provision(Some(&bearer(MERCADERISTA_TOKEN)), b"not json")
			.await
			.unwrap_err();

		assert_eq!(err, ProvisioningError::from(ForbiddenReason::RoleNotAllowed));
	}

	#[tokio::test]
	async fn supervisor_cannot_target_other_sede() {
		let admin = Arc::new(admin());
		let err = service(admin.clone())
			.provision(Some(&bearer(SUPERVISOR_TOKEN)), &payload("mercaderista", "grupo_victoria"))
			.await
			.unwrap_err();

		assert_eq!(err, ProvisioningError::from(ForbiddenReason::OtherSede));
		assert_eq!(admin.create_calls(), 0);
	}

	#[tokio::test]
	async fn supervisor_cannot_create_owner() {
		let admin = Arc::new(admin());
		let err = service(admin.clone())
			.provision(Some(&bearer(SUPERVISOR_TOKEN)), &payload("owner", "disbattery"))
			.await
			.unwrap_err();

		assert_eq!(err, ProvisioningError::from(ForbiddenReason::RoleOutOfScope));
		assert_eq!(admin.create_calls(), 0);
	}

	#[tokio::test]
	async fn sede_rule_is_checked_before_role_rule() {
		let admin = Arc::new(admin());
		let err = service(admin)
			.provision(Some(&bearer(SUPERVISOR_TOKEN)), &payload("owner", "grupo_victoria"))
			.await
			.unwrap_err();

		assert_eq!(err, ProvisioningError::from(ForbiddenReason::OtherSede));
	}

	#[tokio::test]
	async fn supervisor_without_sede_cannot_create() {
		let admin = Arc::new(FakeAdmin::new().with_user("s", "sup-2", "supervisor", None));
		let err = service(admin)
			.provision(Some(&bearer("s")), &payload("mercaderista", "disbattery"))
			.await
			.unwrap_err();

		assert_eq!(err, ProvisioningError::from(ForbiddenReason::OtherSede));
	}

	#[tokio::test]
	async fn missing_phone_is_rejected_before_any_mutation() {
		let admin = Arc::new(admin());
		let body = serde_json::to_vec(&json!({
			"email": "nuevo@example.com",
			"password": "s3cret-pass",
			"full_name": "Nuevo Usuario",
			"role": "mercaderista",
			"sede": "disbattery",
		}))
		.unwrap();

		let err = service(admin.clone())
			.provision(Some(&bearer(OWNER_TOKEN)), &body)
			.await
			.unwrap_err();

		assert_eq!(err, ProvisioningError::from(PayloadProblem::MissingFields));
		assert_eq!(admin.create_calls(), 0);
	}

	#[tokio::test]
	async fn duplicate_email_is_reported() {
		let admin = Arc::new(admin().with_registered_email("nuevo@example.com"));
		let err = service(admin.clone())
			.provision(Some(&bearer(OWNER_TOKEN)), &payload("mercaderista", "disbattery"))
			.await
			.unwrap_err();

		assert_eq!(err, ProvisioningError::DuplicateEmail);
		assert!(admin.deleted_ids().is_empty());
	}

	#[tokio::test]
	async fn other_creation_failures_carry_provider_message() {
		let admin = Arc::new(admin().failing_create("Password should be at least 6 characters"));
		let err = service(admin)
			.provision(Some(&bearer(OWNER_TOKEN)), &payload("mercaderista", "disbattery"))
			.await
			.unwrap_err();

		assert_eq!(
			err,
			ProvisioningError::IdentityCreationFailed(
				"Password should be at least 6 characters".to_string()
			)
		);
	}

	#[tokio::test]
	async fn failed_profile_update_deletes_new_identity() {
		let admin = Arc::new(
			admin()
				.with_next_ids(&["U9"])
				.failing_update("violates check constraint"),
		);
		let err = service(admin.clone())
			.provision(Some(&bearer(OWNER_TOKEN)), &payload("mercaderista", "disbattery"))
			.await
			.unwrap_err();

		assert_eq!(
			err,
			ProvisioningError::ProfileUpdateFailed("violates check constraint".to_string())
		);
		assert_eq!(admin.deleted_ids(), vec!["U9".to_string()]);
		assert!(!admin.identity_exists("U9"));
	}

	#[tokio::test]
	async fn missing_profile_row_deletes_new_identity() {
		let admin = Arc::new(admin().with_next_ids(&["U7"]).without_profile_trigger());
		let err = service(admin.clone())
			.provision(Some(&bearer(OWNER_TOKEN)), &payload("mercaderista", "disbattery"))
			.await
			.unwrap_err();

		assert!(matches!(err, ProvisioningError::ProfileUpdateFailed(ref m) if m.contains("U7")));
		assert_eq!(admin.deleted_ids(), vec!["U7".to_string()]);
	}

	#[tokio::test]
	async fn failed_rollback_still_reports_update_failure() {
		let admin = Arc::new(
			admin()
				.with_next_ids(&["U3"])
				.failing_update("timeout")
				.failing_delete(),
		);
		let err = service(admin.clone())
			.provision(Some(&bearer(OWNER_TOKEN)), &payload("mercaderista", "disbattery"))
			.await
			.unwrap_err();

		assert_eq!(err, ProvisioningError::ProfileUpdateFailed("timeout".to_string()));
		assert_eq!(admin.deleted_ids(), vec!["U3".to_string()]);
	}

	#[tokio::test]
	async fn client_supplied_created_by_is_kept() {
		let admin = Arc::new(admin().with_next_ids(&["U4"]));
		let body = serde_json::to_vec(&json!({
			"email": "nuevo@example.com",
			"password": "s3cret-pass",
			"full_name": "Nuevo Usuario",
			"role": "mercaderista",
			"sede": "disbattery",
			"phone": "04120000000",
			"created_by": "someone-else",
		}))
		.unwrap();

		service(admin.clone())
			.provision(Some(&bearer(OWNER_TOKEN)), &body)
			.await
			.unwrap();

		assert_eq!(
			admin.profile_update("U4").unwrap().created_by.as_deref(),
			Some("someone-else")
		);
	}

	#[tokio::test]
	async fn calls_happen_in_order() {
		let admin = Arc::new(admin().with_next_ids(&["U5"]));
		service(admin.clone())
			.provision(Some(&bearer(OWNER_TOKEN)), &payload("mercaderista", "disbattery"))
			.await
			.unwrap();

		assert_eq!(
			admin.calls(),
			vec![
				AdminCall::VerifyToken,
				AdminCall::GetProfile("owner-1".to_string()),
				AdminCall::CreateIdentity("nuevo@example.com".to_string()),
				AdminCall::UpdateProfile("U5".to_string()),
			]
		);
	}

	#[tokio::test]
	async fn unavailable_connector_is_configuration_error() {
		let service = UserProvisioningService::new(Arc::new(FakeConnector::unavailable()));
		let err = service
			.provision(Some(&bearer(OWNER_TOKEN)), &payload("mercaderista", "disbattery"))
			.await
			.unwrap_err();

		assert!(matches!(err, ProvisioningError::Configuration(_)));
		assert!(err.to_string().starts_with("Error de configuración: "));
	}

	#[tokio::test]
	async fn each_request_builds_a_fresh_client() {
		let connector = Arc::new(FakeConnector::new(Arc::new(admin())));
		let service = UserProvisioningService::new(connector.clone());
		for _ in 0..3 {
			let _ = service.provision(None, b"").await;
		}
		assert_eq!(connector.connects(), 3);
	}
}

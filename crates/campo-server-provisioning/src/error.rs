// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

/// Why a caller could not be authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
	#[error("No authorization header")]
	MissingHeader,

	#[error("Usuario no autenticado")]
	InvalidToken,
}

/// Why an authenticated caller may not create the requested account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ForbiddenReason {
	#[error("No tienes permisos para crear usuarios")]
	RoleNotAllowed,

	#[error("Solo puedes crear usuarios para tu sede")]
	OtherSede,

	#[error("Solo puedes crear mercaderistas")]
	RoleOutOfScope,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadProblem {
	#[error("Todos los campos son requeridos")]
	MissingFields,

	#[error("Cuerpo de la solicitud inválido: {0}")]
	Malformed(String),
}

/// Errors that can occur during user provisioning.
///
/// The `Display` output is the message returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProvisioningError {
	#[error(transparent)]
	Unauthenticated(#[from] AuthFailure),

	#[error("No se pudo obtener el perfil del usuario")]
	ProfileUnavailable,

	#[error(transparent)]
	Forbidden(#[from] ForbiddenReason),

	#[error(transparent)]
	InvalidPayload(#[from] PayloadProblem),

	#[error("El correo electrónico ya está registrado")]
	DuplicateEmail,

	#[error("{0}")]
	IdentityCreationFailed(String),

	#[error("Error al actualizar perfil: {0}")]
	ProfileUpdateFailed(String),

	#[error("Error de configuración: {0}")]
	Configuration(String),
}

impl ProvisioningError {
	/// Stable name of the variant, for logs.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Unauthenticated(_) => "unauthenticated",
			Self::ProfileUnavailable => "profile_unavailable",
			Self::Forbidden(_) => "forbidden",
			Self::InvalidPayload(_) => "invalid_payload",
			Self::DuplicateEmail => "duplicate_email",
			Self::IdentityCreationFailed(_) => "identity_creation_failed",
			Self::ProfileUpdateFailed(_) => "profile_update_failed",
			Self::Configuration(_) => "configuration",
		}
	}
}

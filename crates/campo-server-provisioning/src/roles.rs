// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Profile roles and the sede to region table.

use std::fmt;

/// Role stored on a profile row.
///
/// Only the roles the provisioning rules care about get their own variant;
/// anything else round-trips through [`Role::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
	Owner,
	Supervisor,
	Mercaderista,
	Other(String),
}

impl Role {
	pub fn parse(s: &str) -> Self {
		match s {
			"owner" => Self::Owner,
			"supervisor" => Self::Supervisor,
			"mercaderista" => Self::Mercaderista,
			other => Self::Other(other.to_string()),
		}
	}

	pub fn as_str(&self) -> &str {
		match self {
			Self::Owner => "owner",
			Self::Supervisor => "supervisor",
			Self::Mercaderista => "mercaderista",
			Self::Other(s) => s,
		}
	}

	/// Whether a caller with this role may create accounts at all.
	pub fn can_provision(&self) -> bool {
		matches!(self, Self::Owner | Self::Supervisor)
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
	CentroCapital,
	Oriente,
	CentroLosLlanos,
	Occidente,
}

impl Region {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::CentroCapital => "centro_capital",
			Self::Oriente => "oriente",
			Self::CentroLosLlanos => "centro_los_llanos",
			Self::Occidente => "occidente",
		}
	}
}

impl fmt::Display for Region {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

const SEDE_REGIONS: &[(&str, Region)] = &[
	("grupo_disbattery", Region::CentroCapital),
	("disbattery", Region::Oriente),
	("blitz_2000", Region::CentroLosLlanos),
	("grupo_victoria", Region::Occidente),
];

/// Region a sede belongs to. Unknown sedes have none.
pub fn region_for_sede(sede: &str) -> Option<Region> {
	SEDE_REGIONS
		.iter()
		.find(|(name, _)| *name == sede)
		.map(|(_, region)| *region)
}

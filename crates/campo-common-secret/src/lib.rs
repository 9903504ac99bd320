// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redacting wrapper for credentials that flow through the provisioning path.
//!
//! Three kinds of value travel through a provisioning request and must never
//! reach a log line or an error body: the Supabase service-role key, the
//! caller's bearer token, and the plaintext password of the account being
//! created. All of them are held in a [`SecretString`].
//!
//! ```
//! use campo_common_secret::SecretString;
//!
//! let key = SecretString::new("service-role-key".to_string());
//! assert_eq!(format!("{key}"), "[REDACTED]");
//! assert_eq!(format!("{key:?}"), "Secret(\"[REDACTED]\")");
//! assert_eq!(key.expose(), "service-role-key");
//! ```

use std::fmt;

use zeroize::Zeroize;

/// Placeholder written wherever a secret would otherwise be rendered.
pub const REDACTED: &str = "[REDACTED]";

/// A value that only leaves its wrapper through [`Secret::expose`].
///
/// Debug, Display and Serialize all print [`REDACTED`]; the inner value is
/// zeroed when the wrapper is dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Borrow the protected value. Every call site is a place where the secret
	/// leaves the wrapper, so keep them few and obvious.
	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl SecretString {
	/// True when the wrapped string has no characters.
	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Secret::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Secret::new(value.to_string())
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

#[cfg(feature = "serde")]
mod serde_impl {
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use zeroize::Zeroize;

	use super::{Secret, REDACTED};

	// Outbound payloads that need the real value build it from `expose()`.
	impl<T> Serialize for Secret<T>
	where
		T: Serialize + Zeroize,
	{
		fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			serializer.serialize_str(REDACTED)
		}
	}

	impl<'de, T> Deserialize<'de> for Secret<T>
	where
		T: Deserialize<'de> + Zeroize,
	{
		fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
		where
			D: Deserializer<'de>,
		{
			T::deserialize(deserializer).map(Secret::new)
		}
	}
}

//! Normalized end-user identity and the builder that enforces the merge and id-selection rules.

// self
use crate::{_prelude::*, error::DecodeError};

/// Normalized end-user profile returned by every adapter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	/// Stable, non-empty subject id.
	pub id: String,
	/// Login or handle.
	pub username: String,
	/// Human-readable name.
	pub display_name: String,
	/// Cross-application subject id within the provider family.
	pub union_id: Option<String>,
	/// Email address.
	pub email: Option<String>,
	/// Phone number.
	pub phone: Option<String>,
	/// ISO 3166-1 alpha-2 region code.
	pub country_code: Option<String>,
	/// Avatar URL.
	pub avatar_url: Option<String>,
	/// Provider-specific attributes.
	pub extra: BTreeMap<String, String>,
}
impl Identity {
	/// Starts a builder seeded with the application-scoped subject id.
	pub fn builder(app_scoped_id: impl AsRef<str>) -> IdentityBuilder {
		IdentityBuilder::new(app_scoped_id)
	}
}

/// Incremental [`Identity`] assembly across one or more remote sources.
///
/// Every setter ignores empty (or whitespace-only) values, so feeding a generic source first
/// and a more specific one second lets the specific source win wherever it has data.
#[derive(Clone, Debug, Default)]
pub struct IdentityBuilder {
	app_scoped_id: Option<String>,
	union_id: Option<String>,
	username: Option<String>,
	display_name: Option<String>,
	email: Option<String>,
	phone: Option<String>,
	country_code: Option<String>,
	avatar_url: Option<String>,
	extra: BTreeMap<String, String>,
}
impl IdentityBuilder {
	/// Creates a builder seeded with the application-scoped subject id.
	pub fn new(app_scoped_id: impl AsRef<str>) -> Self {
		Self::default().app_scoped_id(app_scoped_id)
	}

	/// Overrides the application-scoped subject id.
	pub fn app_scoped_id(mut self, value: impl AsRef<str>) -> Self {
		overlay(&mut self.app_scoped_id, value);

		self
	}

	/// Sets the cross-application subject id.
	pub fn union_id(mut self, value: impl AsRef<str>) -> Self {
		overlay(&mut self.union_id, value);

		self
	}

	/// Sets the username.
	pub fn username(mut self, value: impl AsRef<str>) -> Self {
		overlay(&mut self.username, value);

		self
	}

	/// Sets the display name.
	pub fn display_name(mut self, value: impl AsRef<str>) -> Self {
		overlay(&mut self.display_name, value);

		self
	}

	/// Sets the email address.
	pub fn email(mut self, value: impl AsRef<str>) -> Self {
		overlay(&mut self.email, value);

		self
	}

	/// Sets the phone number.
	pub fn phone(mut self, value: impl AsRef<str>) -> Self {
		overlay(&mut self.phone, value);

		self
	}

	/// Sets the ISO region code.
	pub fn country_code(mut self, value: impl AsRef<str>) -> Self {
		overlay(&mut self.country_code, value);

		self
	}

	/// Sets the avatar URL.
	pub fn avatar_url(mut self, value: impl AsRef<str>) -> Self {
		overlay(&mut self.avatar_url, value);

		self
	}

	/// Records a provider-specific attribute.
	pub fn extra(mut self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
		let value = value.as_ref();

		if !value.trim().is_empty() {
			self.extra.insert(key.into(), value.to_owned());
		}

		self
	}

	/// Finalizes the identity.
	///
	/// The union id becomes the subject id when present, the application-scoped id otherwise.
	/// The display name falls back to the username.
	pub fn build(self) -> Result<Identity, DecodeError> {
		let id = self
			.union_id
			.clone()
			.or(self.app_scoped_id)
			.ok_or(DecodeError::MissingField { field: "id" })?;
		let username = self.username.unwrap_or_default();
		let display_name = self.display_name.unwrap_or_else(|| username.clone());

		Ok(Identity {
			id,
			username,
			display_name,
			union_id: self.union_id,
			email: self.email,
			phone: self.phone,
			country_code: self.country_code,
			avatar_url: self.avatar_url,
			extra: self.extra,
		})
	}
}

fn overlay(slot: &mut Option<String>, value: impl AsRef<str>) {
	let value = value.as_ref();

	if !value.trim().is_empty() {
		*slot = Some(value.to_owned());
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn union_id_wins_over_app_scoped_id() {
		let identity = Identity::builder("open-1")
			.union_id("union-1")
			.username("alice")
			.build()
			.expect("Identity should build.");

		assert_eq!(identity.id, "union-1");
		assert_eq!(identity.union_id.as_deref(), Some("union-1"));
		assert_eq!(identity.display_name, "alice");
	}

	#[test]
	fn app_scoped_id_is_used_without_union_id() {
		let identity =
			Identity::builder("open-1").union_id("").build().expect("Identity should build.");

		assert_eq!(identity.id, "open-1");
		assert!(identity.union_id.is_none());
	}

	#[test]
	fn later_non_empty_values_override_earlier_ones() {
		let identity = Identity::builder("u")
			.email("public@example.com")
			.phone("100")
			.username("nick")
			// Directory source.
			.email("corp@example.com")
			.phone("")
			.username("   ")
			.build()
			.expect("Identity should build.");

		assert_eq!(identity.email.as_deref(), Some("corp@example.com"));
		assert_eq!(identity.phone.as_deref(), Some("100"));
		assert_eq!(identity.username, "nick");
	}

	#[test]
	fn missing_ids_are_decode_errors() {
		let err = Identity::builder("").build().expect_err("Empty ids must be rejected.");

		assert!(matches!(err, DecodeError::MissingField { field: "id" }));
	}

	#[test]
	fn empty_extras_are_skipped() {
		let identity = Identity::builder("u")
			.extra("kept", "v")
			.extra("dropped", "")
			.build()
			.expect("Identity should build.");

		assert_eq!(identity.extra.len(), 1);
		assert_eq!(identity.extra.get("kept").map(String::as_str), Some("v"));
	}
}

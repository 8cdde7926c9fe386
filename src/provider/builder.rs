//! Fluent construction of validated [`ProviderConfig`] values.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
	provider::{EndpointRole, ProviderConfig, ProviderEndpoints, ProviderQuirks},
};

/// Builder for [`ProviderConfig`] values.
#[derive(Debug)]
pub struct ProviderConfigBuilder {
	/// Provider kind name.
	pub kind: String,
	/// Client id.
	pub client_id: String,
	/// Client secret or private key material.
	pub client_secret: TokenSecret,
	/// Optional redirect URI.
	pub redirect_url: Option<Url>,
	/// Endpoint overrides.
	pub endpoints: ProviderEndpoints,
	/// Provider quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderConfigBuilder {
	/// Creates a builder for the given kind name.
	pub fn new(kind: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			client_id: String::new(),
			client_secret: TokenSecret::default(),
			redirect_url: None,
			endpoints: ProviderEndpoints::default(),
			quirks: ProviderQuirks::default(),
		}
	}

	/// Sets the client id.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = client_id.into();

		self
	}

	/// Sets the client secret (or private key material).
	pub fn client_secret(mut self, client_secret: impl Into<TokenSecret>) -> Self {
		self.client_secret = client_secret.into();

		self
	}

	/// Sets the redirect URI.
	pub fn redirect_url(mut self, url: Url) -> Self {
		self.redirect_url = Some(url);

		self
	}

	/// Overrides the URL used for one endpoint role.
	pub fn endpoint(mut self, role: EndpointRole, url: Url) -> Self {
		self.endpoints.insert(role, url);

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<ProviderConfig, ConfigError> {
		let config = ProviderConfig {
			kind: self.kind,
			client_id: self.client_id,
			client_secret: self.client_secret,
			redirect_url: self.redirect_url,
			endpoints: self.endpoints,
			quirks: self.quirks,
		};

		config.validate()?;

		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Fixture URL should parse.")
	}

	#[test]
	fn builder_requires_client_id() {
		let err = ProviderConfig::builder("GitHub").build().expect_err("Client id is required.");

		assert!(matches!(err, ConfigError::MissingClientId));
	}

	#[test]
	fn builder_rejects_insecure_overrides() {
		let err = ProviderConfig::builder("WeChat")
			.client_id("wx123")
			.endpoint(EndpointRole::UserInfo, url("http://api.example.com/sns/userinfo"))
			.build()
			.expect_err("Plain HTTP overrides must be rejected.");

		assert!(matches!(err, ConfigError::InsecureEndpoint { role: EndpointRole::UserInfo, .. }));
	}

	#[test]
	fn builder_keeps_kind_unvalidated_until_registry() {
		let config = ProviderConfig::builder("NotAProvider")
			.client_id("id")
			.client_secret("secret")
			.redirect_url(url("http://localhost:8000/callback"))
			.quirks(ProviderQuirks { fallback_token_lifetime_secs: None })
			.build()
			.expect("Kind names are validated by the registry.");

		assert_eq!(config.kind, "NotAProvider");
		assert_eq!(config.client_secret.expose(), "secret");
		assert!(config.quirks.fallback_token_lifetime_secs.is_none());
	}
}

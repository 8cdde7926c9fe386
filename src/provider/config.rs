//! Caller-owned provider configuration.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
	provider::{ProviderConfigBuilder, ProviderQuirks},
};

/// Role an endpoint plays for an adapter.
///
/// Adapters use a documented production URL for every role they need; [`ProviderEndpoints`]
/// only carries overrides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointRole {
	/// Token (or session) endpoint used by the exchange step.
	Token,
	/// Primary user profile endpoint.
	UserInfo,
	/// Endpoint that resolves the opaque subject id before profile lookups.
	SubjectLookup,
	/// Application-level token endpoint used for directory or QR calls.
	AppToken,
	/// Directory endpoint resolving a subject into a member id.
	DirectoryLookup,
	/// Directory endpoint returning member details.
	DirectoryDetail,
	/// Secondary endpoint returning the subject's email.
	Email,
	/// QR ticket creation endpoint.
	QrCode,
	/// Redirect URI registered with the provider.
	Redirect,
}
impl EndpointRole {
	/// Returns a stable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			EndpointRole::Token => "token",
			EndpointRole::UserInfo => "user_info",
			EndpointRole::SubjectLookup => "subject_lookup",
			EndpointRole::AppToken => "app_token",
			EndpointRole::DirectoryLookup => "directory_lookup",
			EndpointRole::DirectoryDetail => "directory_detail",
			EndpointRole::Email => "email",
			EndpointRole::QrCode => "qr_code",
			EndpointRole::Redirect => "redirect",
		}
	}
}
impl Display for EndpointRole {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Endpoint overrides keyed by role.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderEndpoints(BTreeMap<EndpointRole, Url>);
impl ProviderEndpoints {
	/// Returns the override configured for `role`.
	pub fn get(&self, role: EndpointRole) -> Option<&Url> {
		self.0.get(&role)
	}

	/// Sets the override for `role`, returning the previous value.
	pub fn insert(&mut self, role: EndpointRole, url: Url) -> Option<Url> {
		self.0.insert(role, url)
	}

	/// Iterates over every override.
	pub fn iter(&self) -> impl Iterator<Item = (EndpointRole, &Url)> {
		self.0.iter().map(|(role, url)| (*role, url))
	}

	/// Returns the override for `role`, or parses `default` when none is configured.
	pub fn resolve(&self, role: EndpointRole, default: &str) -> Result<Url, ConfigError> {
		match self.get(role) {
			Some(url) => Ok(url.clone()),
			None => Url::parse(default).map_err(|source| ConfigError::InvalidEndpoint { role, source }),
		}
	}
}

/// Immutable configuration for one provider instance.
///
/// Adapters share the configuration behind an [`Arc`] for their whole lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
	/// Provider kind name, validated when the registry creates the adapter.
	pub kind: String,
	/// Client id, app id, app key, or corp id depending on the platform.
	pub client_id: String,
	/// Client secret, or the RSA private key for signature-authenticated gateways.
	pub client_secret: TokenSecret,
	/// Redirect URI registered with the platform.
	#[serde(default)]
	pub redirect_url: Option<Url>,
	/// Endpoint overrides.
	#[serde(default)]
	pub endpoints: ProviderEndpoints,
	/// Workarounds for platform behavior.
	#[serde(default)]
	pub quirks: ProviderQuirks,
}
impl ProviderConfig {
	/// Creates a builder for the given kind name.
	pub fn builder(kind: impl Into<String>) -> ProviderConfigBuilder {
		ProviderConfigBuilder::new(kind)
	}

	/// Validates invariants; deserialized configs should pass through here before use.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::MissingClientId);
		}

		for (role, url) in self.endpoints.iter() {
			validate_endpoint(role, url)?;
		}

		Ok(())
	}
}

fn validate_endpoint(role: EndpointRole, url: &Url) -> Result<(), ConfigError> {
	if url.scheme() != "https" {
		Err(ConfigError::InsecureEndpoint { role, url: url.to_string() })
	} else {
		Ok(())
	}
}

//! GitLab login over the standard authorization code grant.

// crates.io
use oauth2::TokenResponse;
// self
use crate::{
	_prelude::*,
	adapter::{
		common::{RemoteStatus, get_request, lenient_string},
		context_adapter,
	},
	auth::{Credential, Identity},
	error::RemoteCode,
	oauth::StandardCodeExchange,
	provider::EndpointRole,
};

const TOKEN_URL: &str = "https://gitlab.com/oauth/token";
const USER_INFO_URL: &str = "https://gitlab.com/api/v4/user";

#[derive(Debug, Deserialize)]
struct UserResponse {
	#[serde(default, deserialize_with = "lenient_string")]
	id: String,
	#[serde(default)]
	username: String,
	name: Option<String>,
	email: Option<String>,
	avatar_url: Option<String>,
	#[serde(default)]
	error: String,
	#[serde(default)]
	error_description: String,
}
impl RemoteStatus for UserResponse {
	fn remote_error(&self) -> Option<(RemoteCode, String)> {
		(!self.error.is_empty())
			.then(|| (RemoteCode::Symbolic(self.error.clone()), self.error_description.clone()))
	}
}

context_adapter! {
	/// GitLab adapter.
	GitLabAdapter
}
impl GitLabAdapter {
	pub(crate) async fn exchange_credential(&self, code: &str) -> Result<Credential> {
		let config = self.ctx.config();
		let token_url = self.ctx.endpoint(EndpointRole::Token, TOKEN_URL)?;
		let exchange = StandardCodeExchange::new(
			&config.client_id,
			config.client_secret.expose(),
			&token_url,
			config.redirect_url.as_ref(),
		)?;
		let token = exchange.exchange(self.ctx.transport(), code).await?;
		// GitLab often omits `expires_in`; the configured fallback covers it.
		let expires_in = token
			.expires_in()
			.map(|lifetime| i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX))
			.unwrap_or(0);
		let mut credential = Credential::bearer(token.access_token().secret().as_str())
			.with_token_type(token.token_type().as_ref())
			.with_expiry(self.ctx.expiry(expires_in));

		if let Some(refresh) = token.refresh_token() {
			credential = credential.with_refresh_token(refresh.secret().as_str());
		}

		Ok(credential)
	}

	pub(crate) async fn fetch_identity(&self, credential: &Credential) -> Result<Identity> {
		let url = self.ctx.endpoint(EndpointRole::UserInfo, USER_INFO_URL)?;
		let authorization = format!("Bearer {}", credential.access_token.expose());
		let user: UserResponse =
			self.ctx.send(get_request(&url, &[("authorization", authorization.as_str())])?).await?;

		Ok(Identity::builder(&user.id)
			.username(&user.username)
			.display_name(user.name.unwrap_or_default())
			.email(user.email.unwrap_or_default())
			.avatar_url(user.avatar_url.unwrap_or_default())
			.build()?)
	}
}

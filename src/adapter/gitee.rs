//! Gitee login.

// self
use crate::{
	_prelude::*,
	adapter::{
		common::{RemoteStatus, form_request, lenient_i64, lenient_string},
		context_adapter,
	},
	auth::{Credential, Identity},
	error::RemoteCode,
	provider::EndpointRole,
};

const TOKEN_URL: &str = "https://gitee.com/oauth/token";
const USER_INFO_URL: &str = "https://gitee.com/api/v5/user";

#[derive(Debug, Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: String,
	#[serde(default)]
	token_type: String,
	#[serde(default)]
	refresh_token: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	expires_in: i64,
	#[serde(default)]
	error: String,
	#[serde(default)]
	error_description: String,
}
impl RemoteStatus for TokenResponse {
	fn remote_error(&self) -> Option<(RemoteCode, String)> {
		(!self.error.is_empty())
			.then(|| (RemoteCode::Symbolic(self.error.clone()), self.error_description.clone()))
	}
}

#[derive(Debug, Deserialize)]
struct UserResponse {
	#[serde(default, deserialize_with = "lenient_string")]
	id: String,
	#[serde(default)]
	login: String,
	name: Option<String>,
	email: Option<String>,
	avatar_url: Option<String>,
	#[serde(default)]
	message: String,
}
impl RemoteStatus for UserResponse {
	fn remote_error(&self) -> Option<(RemoteCode, String)> {
		// Gitee answers bad tokens with a bare `message` and no profile.
		(self.id.is_empty() && !self.message.is_empty())
			.then(|| (RemoteCode::Symbolic("invalid_token".into()), self.message.clone()))
	}
}

context_adapter! {
	/// Gitee adapter.
	GiteeAdapter
}
impl GiteeAdapter {
	pub(crate) async fn exchange_credential(&self, code: &str) -> Result<Credential> {
		let config = self.ctx.config();
		let redirect = config.redirect_url.as_ref().map(Url::as_str).unwrap_or_default();
		let url = self.ctx.endpoint_with_query(
			EndpointRole::Token,
			TOKEN_URL,
			&[
				("grant_type", "authorization_code"),
				("code", code),
				("client_id", config.client_id.as_str()),
				("redirect_uri", redirect),
			],
		)?;
		// The secret stays out of the query string.
		let request = form_request(&url, [("client_secret", config.client_secret.expose())], &[])?;
		let token: TokenResponse = self.ctx.send(request).await?;
		let mut credential = Credential::bearer(token.access_token)
			.with_refresh_token(token.refresh_token)
			.with_expiry(self.ctx.expiry(token.expires_in));

		if !token.token_type.is_empty() {
			credential = credential.with_token_type(token.token_type);
		}

		Ok(credential)
	}

	pub(crate) async fn fetch_identity(&self, credential: &Credential) -> Result<Identity> {
		let url = self.ctx.endpoint_with_query(
			EndpointRole::UserInfo,
			USER_INFO_URL,
			&[("access_token", credential.access_token.expose())],
		)?;
		let user: UserResponse = self.ctx.get_json(&url).await?;

		Ok(Identity::builder(&user.id)
			.username(&user.login)
			.display_name(user.name.unwrap_or_default())
			.email(user.email.unwrap_or_default())
			.avatar_url(user.avatar_url.unwrap_or_default())
			.build()?)
	}
}

//! GitHub OAuth App login.

// self
use crate::{
	_prelude::*,
	adapter::{
		common::{RemoteStatus, get_request, json_request, lenient_string},
		context_adapter,
	},
	auth::{Credential, Identity},
	error::RemoteCode,
	provider::EndpointRole,
};

const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const USER_INFO_URL: &str = "https://api.github.com/user";
// The REST API rejects requests without a user agent.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: String,
	#[serde(default)]
	token_type: String,
	#[serde(default)]
	error: String,
	#[serde(default)]
	error_description: String,
}
impl RemoteStatus for TokenResponse {
	fn remote_error(&self) -> Option<(RemoteCode, String)> {
		(!self.error.is_empty()).then(|| {
			let message =
				if self.error_description.is_empty() { &self.error } else { &self.error_description };

			(RemoteCode::Symbolic(self.error.clone()), message.clone())
		})
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
}
impl RemoteStatus for UserResponse {
	fn remote_error(&self) -> Option<(RemoteCode, String)> {
		None
	}
}

context_adapter! {
	/// GitHub adapter.
	GitHubAdapter
}
impl GitHubAdapter {
	pub(crate) async fn exchange_credential(&self, code: &str) -> Result<Credential> {
		let config = self.ctx.config();
		let url = self.ctx.endpoint(EndpointRole::Token, TOKEN_URL)?;
		let body = serde_json::json!({
			"code": code,
			"client_id": config.client_id,
			"client_secret": config.client_secret.expose(),
		});
		let token: TokenResponse = self.ctx.send(json_request(&url, &body, &[])?).await?;
		let mut credential = Credential::bearer(token.access_token).with_expiry(self.ctx.expiry(0));

		if !token.token_type.is_empty() {
			credential = credential.with_token_type(token.token_type);
		}

		Ok(credential)
	}

	pub(crate) async fn fetch_identity(&self, credential: &Credential) -> Result<Identity> {
		let url = self.ctx.endpoint(EndpointRole::UserInfo, USER_INFO_URL)?;
		let authorization = format!("token {}", credential.access_token.expose());
		let request = get_request(
			&url,
			&[("authorization", authorization.as_str()), ("user-agent", USER_AGENT)],
		)?;
		let user: UserResponse = self.ctx.send(request).await?;

		Ok(Identity::builder(&user.id)
			.username(&user.login)
			.display_name(user.name.unwrap_or_default())
			.email(user.email.unwrap_or_default())
			.avatar_url(user.avatar_url.unwrap_or_default())
			.build()?)
	}
}

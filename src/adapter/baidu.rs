//! Baidu account login.

// self
use crate::{
	_prelude::*,
	adapter::{
		common::{RemoteStatus, lenient_i64, lenient_string},
		context_adapter,
	},
	auth::{Credential, Identity},
	error::RemoteCode,
	provider::EndpointRole,
};

const TOKEN_URL: &str = "https://openapi.baidu.com/oauth/2.0/token";
const USER_INFO_URL: &str = "https://openapi.baidu.com/rest/2.0/passport/users/getInfo";
const PORTRAIT_BASE_URL: &str = "https://himg.bdimg.com/sys/portrait/item/";

#[derive(Debug, Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: String,
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
struct UserInfoResponse {
	#[serde(default)]
	openid: String,
	#[serde(default, deserialize_with = "lenient_string")]
	userid: String,
	#[serde(default)]
	username: String,
	#[serde(default)]
	portrait: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	error_code: i64,
	#[serde(default)]
	error_msg: String,
}
impl RemoteStatus for UserInfoResponse {
	fn remote_error(&self) -> Option<(RemoteCode, String)> {
		(self.error_code != 0).then(|| (RemoteCode::Numeric(self.error_code), self.error_msg.clone()))
	}
}

context_adapter! {
	/// Baidu adapter.
	BaiduAdapter
}
impl BaiduAdapter {
	pub(crate) async fn exchange_credential(&self, code: &str) -> Result<Credential> {
		let config = self.ctx.config();
		let redirect = config.redirect_url.as_ref().map(Url::as_str).unwrap_or("oob");
		let url = self.ctx.endpoint_with_query(
			EndpointRole::Token,
			TOKEN_URL,
			&[
				("grant_type", "authorization_code"),
				("code", code),
				("client_id", config.client_id.as_str()),
				("client_secret", config.client_secret.expose()),
				("redirect_uri", redirect),
			],
		)?;
		let token: TokenResponse = self.ctx.get_json(&url).await?;

		Ok(Credential::bearer(token.access_token)
			.with_refresh_token(token.refresh_token)
			.with_expiry(self.ctx.expiry(token.expires_in)))
	}

	pub(crate) async fn fetch_identity(&self, credential: &Credential) -> Result<Identity> {
		let url = self.ctx.endpoint_with_query(
			EndpointRole::UserInfo,
			USER_INFO_URL,
			&[("access_token", credential.access_token.expose())],
		)?;
		let info: UserInfoResponse = self.ctx.get_json(&url).await?;
		let avatar = if info.portrait.is_empty() {
			String::new()
		} else {
			format!("{PORTRAIT_BASE_URL}{}", info.portrait)
		};

		Ok(Identity::builder(&info.userid)
			.app_scoped_id(&info.openid)
			.username(&info.username)
			.avatar_url(avatar)
			.build()?)
	}
}

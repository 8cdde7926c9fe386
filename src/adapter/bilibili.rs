//! Bilibili open platform login.
//!
//! Both endpoints wrap their payload as `{ code, message, data }`; a non-zero `code` is a
//! platform error even when the HTTP status is 200.

// self
use crate::{
	_prelude::*,
	adapter::{
		common::{RemoteStatus, lenient_i64},
		context_adapter,
	},
	auth::{Credential, Identity},
	error::RemoteCode,
	provider::EndpointRole,
};

const TOKEN_URL: &str = "https://api.bilibili.com/x/account-oauth2/v1/token";
const USER_INFO_URL: &str = "https://member.bilibili.com/arcopen/fn/user/account/info";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
	#[serde(default, deserialize_with = "lenient_i64")]
	code: i64,
	#[serde(default)]
	message: String,
	data: Option<T>,
}
impl<T> RemoteStatus for Envelope<T> {
	fn remote_error(&self) -> Option<(RemoteCode, String)> {
		(self.code != 0).then(|| (RemoteCode::Numeric(self.code), self.message.clone()))
	}
}
impl<T> Envelope<T> {
	fn into_data(self) -> T
	where
		T: Default,
	{
		self.data.unwrap_or_default()
	}
}

#[derive(Debug, Default, Deserialize)]
struct TokenData {
	#[serde(default)]
	access_token: String,
	#[serde(default)]
	refresh_token: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	expires_in: i64,
}

#[derive(Debug, Default, Deserialize)]
struct AccountData {
	#[serde(default)]
	openid: String,
	#[serde(default)]
	name: String,
	#[serde(default)]
	face: String,
}

context_adapter! {
	/// Bilibili adapter.
	BilibiliAdapter
}
impl BilibiliAdapter {
	pub(crate) async fn exchange_credential(&self, code: &str) -> Result<Credential> {
		let config = self.ctx.config();
		let url = self.ctx.endpoint(EndpointRole::Token, TOKEN_URL)?;
		let body = serde_json::json!({
			"client_id": config.client_id,
			"client_secret": config.client_secret.expose(),
			"grant_type": "authorization_code",
			"code": code,
		});
		let token = self.ctx.post_json::<Envelope<TokenData>>(&url, &body).await?.into_data();

		Ok(Credential::bearer(token.access_token)
			.with_refresh_token(token.refresh_token)
			.with_expiry(self.ctx.expiry(token.expires_in)))
	}

	pub(crate) async fn fetch_identity(&self, credential: &Credential) -> Result<Identity> {
		let url = self.ctx.endpoint_with_query(
			EndpointRole::UserInfo,
			USER_INFO_URL,
			&[
				("client_id", self.ctx.config().client_id.as_str()),
				("access_token", credential.access_token.expose()),
			],
		)?;
		let account = self.ctx.get_json::<Envelope<AccountData>>(&url).await?.into_data();

		Ok(Identity::builder(&account.openid)
			.username(&account.name)
			.avatar_url(&account.face)
			.build()?)
	}
}

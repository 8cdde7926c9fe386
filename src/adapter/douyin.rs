//! Douyin open platform login.
//!
//! Douyin reports failures through `data.error_code` (often as a string) next to a generic
//! `message`, so both endpoints check the nested code before trusting the payload.

// self
use crate::{
	_prelude::*,
	adapter::{
		common::{RemoteStatus, lenient_i64},
		context_adapter, mismatch,
	},
	auth::{Credential, CredentialExtra, Identity},
	error::RemoteCode,
	provider::EndpointRole,
};

const TOKEN_URL: &str = "https://open.douyin.com/oauth/access_token/";
const USER_INFO_URL: &str = "https://open.douyin.com/oauth/userinfo/";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
	data: Option<T>,
	#[serde(default)]
	message: String,
}
impl<T> RemoteStatus for Envelope<T>
where
	T: DataStatus,
{
	fn remote_error(&self) -> Option<(RemoteCode, String)> {
		let data = self.data.as_ref()?;
		let (code, description) = data.status();

		(code != 0).then(|| {
			let message = if description.is_empty() { self.message.clone() } else { description.to_owned() };

			(RemoteCode::Numeric(code), message)
		})
	}
}

trait DataStatus {
	fn status(&self) -> (i64, &str);
}

#[derive(Debug, Default, Deserialize)]
struct TokenData {
	#[serde(default)]
	access_token: String,
	#[serde(default)]
	refresh_token: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	expires_in: i64,
	#[serde(default)]
	open_id: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	error_code: i64,
	#[serde(default)]
	description: String,
}
impl DataStatus for TokenData {
	fn status(&self) -> (i64, &str) {
		(self.error_code, &self.description)
	}
}

#[derive(Debug, Default, Deserialize)]
struct UserData {
	#[serde(default)]
	open_id: String,
	#[serde(default)]
	union_id: String,
	#[serde(default)]
	nickname: String,
	#[serde(default)]
	avatar: String,
	#[serde(default)]
	city: String,
	#[serde(default)]
	province: String,
	#[serde(default)]
	country: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	error_code: i64,
	#[serde(default)]
	description: String,
}
impl DataStatus for UserData {
	fn status(&self) -> (i64, &str) {
		(self.error_code, &self.description)
	}
}

context_adapter! {
	/// Douyin adapter.
	DouyinAdapter
}
impl DouyinAdapter {
	pub(crate) async fn exchange_credential(&self, code: &str) -> Result<Credential> {
		let config = self.ctx.config();
		let url = self.ctx.endpoint(EndpointRole::Token, TOKEN_URL)?;
		let response: Envelope<TokenData> = self
			.ctx
			.post_form(
				&url,
				&[
					("client_key", config.client_id.as_str()),
					("client_secret", config.client_secret.expose()),
					("code", code),
					("grant_type", "authorization_code"),
				],
			)
			.await?;
		let token = response.data.unwrap_or_default();

		Ok(Credential::bearer(token.access_token)
			.with_refresh_token(token.refresh_token)
			.with_expiry(self.ctx.expiry(token.expires_in))
			.with_extra(CredentialExtra::OpenId { open_id: token.open_id, union_id: None }))
	}

	pub(crate) async fn fetch_identity(&self, credential: &Credential) -> Result<Identity> {
		let CredentialExtra::OpenId { open_id, .. } = &credential.extra else {
			return Err(mismatch(self.ctx.kind(), "open_id"));
		};
		let url = self.ctx.endpoint(EndpointRole::UserInfo, USER_INFO_URL)?;
		let response: Envelope<UserData> = self
			.ctx
			.post_form(
				&url,
				&[("access_token", credential.access_token.expose()), ("open_id", open_id.as_str())],
			)
			.await?;
		let user = response.data.unwrap_or_default();

		Ok(Identity::builder(open_id)
			.app_scoped_id(&user.open_id)
			.union_id(&user.union_id)
			.username(&user.nickname)
			.avatar_url(&user.avatar)
			.extra("country", &user.country)
			.extra("province", &user.province)
			.extra("city", &user.city)
			.build()?)
	}
}

//! WeCom third-party (service provider) login.

// self
use crate::{
	_prelude::*,
	adapter::{
		common::{errcode_status, lenient_i64},
		context_adapter, mismatch,
	},
	auth::{Credential, CredentialExtra, Identity},
	provider::EndpointRole,
};

const PROVIDER_TOKEN_URL: &str = "https://qyapi.weixin.qq.com/cgi-bin/service/get_provider_token";
const LOGIN_INFO_URL: &str = "https://qyapi.weixin.qq.com/cgi-bin/service/get_login_info";

#[derive(Debug, Deserialize)]
struct ProviderTokenResponse {
	#[serde(default)]
	provider_access_token: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	expires_in: i64,
	#[serde(default, deserialize_with = "lenient_i64")]
	errcode: i64,
	#[serde(default)]
	errmsg: String,
}

#[derive(Debug, Default, Deserialize)]
struct LoginUser {
	#[serde(default)]
	userid: String,
	#[serde(default)]
	open_userid: String,
	#[serde(default)]
	name: String,
	#[serde(default)]
	avatar: String,
}

#[derive(Debug, Default, Deserialize)]
struct LoginCorp {
	#[serde(default)]
	corpid: String,
}

#[derive(Debug, Deserialize)]
struct LoginInfoResponse {
	#[serde(default)]
	user_info: LoginUser,
	#[serde(default)]
	corp_info: LoginCorp,
	#[serde(default, deserialize_with = "lenient_i64")]
	usertype: i64,
	#[serde(default, deserialize_with = "lenient_i64")]
	errcode: i64,
	#[serde(default)]
	errmsg: String,
}

errcode_status!(ProviderTokenResponse, LoginInfoResponse);

context_adapter! {
	/// WeCom third-party application adapter.
	///
	/// The exchange step only obtains the provider token; the login code travels in the side
	/// channel and is redeemed by the fetch step.
	WeComAdapter
}
impl WeComAdapter {
	pub(crate) async fn exchange_credential(&self, code: &str) -> Result<Credential> {
		let config = self.ctx.config();
		let url = self.ctx.endpoint(EndpointRole::Token, PROVIDER_TOKEN_URL)?;
		let body = serde_json::json!({
			"corpid": config.client_id,
			"provider_secret": config.client_secret.expose(),
		});
		let token: ProviderTokenResponse = self.ctx.post_json(&url, &body).await?;

		Ok(Credential::bearer(token.provider_access_token)
			.with_expiry(self.ctx.expiry(token.expires_in))
			.with_extra(CredentialExtra::AuthCode { code: code.to_owned() }))
	}

	pub(crate) async fn fetch_identity(&self, credential: &Credential) -> Result<Identity> {
		let CredentialExtra::AuthCode { code } = &credential.extra else {
			return Err(mismatch(self.ctx.kind(), "auth_code"));
		};
		let url = self.ctx.endpoint_with_query(
			EndpointRole::UserInfo,
			LOGIN_INFO_URL,
			&[("access_token", credential.access_token.expose())],
		)?;
		let info: LoginInfoResponse =
			self.ctx.post_json(&url, &serde_json::json!({ "auth_code": code })).await?;
		let user = &info.user_info;

		Ok(Identity::builder(&user.userid)
			.app_scoped_id(&user.open_userid)
			.username(&user.name)
			.avatar_url(&user.avatar)
			.extra("wecom_userid", &user.userid)
			.extra("wecom_corpid", &info.corp_info.corpid)
			.extra("wecom_usertype", info.usertype.to_string())
			.build()?)
	}
}

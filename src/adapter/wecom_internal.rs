//! WeCom self-built application login.
//!
//! The fetch step is a dependent chain: `user/getuserinfo` resolves the login code into a
//! member id, then `user/get` returns that member's directory record.

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

const TOKEN_URL: &str = "https://qyapi.weixin.qq.com/cgi-bin/gettoken";
const SUBJECT_URL: &str = "https://qyapi.weixin.qq.com/cgi-bin/user/getuserinfo";
const MEMBER_URL: &str = "https://qyapi.weixin.qq.com/cgi-bin/user/get";

#[derive(Debug, Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	expires_in: i64,
	#[serde(default, deserialize_with = "lenient_i64")]
	errcode: i64,
	#[serde(default)]
	errmsg: String,
}

#[derive(Debug, Deserialize)]
struct SubjectResponse {
	#[serde(default, rename = "UserId", alias = "userid")]
	user_id: String,
	#[serde(default, rename = "OpenId", alias = "openid")]
	open_id: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	errcode: i64,
	#[serde(default)]
	errmsg: String,
}

#[derive(Debug, Deserialize)]
struct MemberResponse {
	#[serde(default)]
	userid: String,
	#[serde(default)]
	name: String,
	#[serde(default)]
	email: String,
	#[serde(default)]
	mobile: String,
	#[serde(default)]
	avatar: String,
	#[serde(default)]
	open_userid: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	errcode: i64,
	#[serde(default)]
	errmsg: String,
}

errcode_status!(TokenResponse, SubjectResponse, MemberResponse);

context_adapter! {
	/// WeCom internal application adapter.
	WeComInternalAdapter
}
impl WeComInternalAdapter {
	pub(crate) async fn exchange_credential(&self, code: &str) -> Result<Credential> {
		let config = self.ctx.config();
		let url = self.ctx.endpoint_with_query(
			EndpointRole::Token,
			TOKEN_URL,
			&[("corpid", config.client_id.as_str()), ("corpsecret", config.client_secret.expose())],
		)?;
		let token: TokenResponse = self.ctx.get_json(&url).await?;

		Ok(Credential::bearer(token.access_token)
			.with_expiry(self.ctx.expiry(token.expires_in))
			.with_extra(CredentialExtra::AuthCode { code: code.to_owned() }))
	}

	pub(crate) async fn fetch_identity(&self, credential: &Credential) -> Result<Identity> {
		let CredentialExtra::AuthCode { code } = &credential.extra else {
			return Err(mismatch(self.ctx.kind(), "auth_code"));
		};
		let access_token = credential.access_token.expose();
		let subject_url = self.ctx.endpoint_with_query(
			EndpointRole::SubjectLookup,
			SUBJECT_URL,
			&[("access_token", access_token), ("code", code)],
		)?;
		let subject: SubjectResponse = self.ctx.get_json(&subject_url).await?;

		// Non-members come back with an OpenId instead of a UserId.
		if !subject.open_id.is_empty() {
			return Err(Error::SubjectRejected {
				reason: "the user is not a member of this organization".into(),
			});
		}

		let member_url = self.ctx.endpoint_with_query(
			EndpointRole::UserInfo,
			MEMBER_URL,
			&[("access_token", access_token), ("userid", subject.user_id.as_str())],
		)?;
		let member: MemberResponse = self.ctx.get_json(&member_url).await?;

		Ok(Identity::builder(&subject.user_id)
			.app_scoped_id(&member.userid)
			.username(&member.name)
			.email(&member.email)
			.phone(&member.mobile)
			.avatar_url(&member.avatar)
			.extra("wecom_open_userid", &member.open_userid)
			.build()?)
	}
}

//! WeChat mini program login via `jscode2session`.
//!
//! The session response already names the subject, so the fetch step reads the identity
//! straight from the credential's side channel.

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

const SESSION_URL: &str = "https://api.weixin.qq.com/sns/jscode2session";

#[derive(Debug, Deserialize)]
struct SessionResponse {
	#[serde(default)]
	openid: String,
	#[serde(default)]
	session_key: String,
	#[serde(default)]
	unionid: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	errcode: i64,
	#[serde(default)]
	errmsg: String,
}
errcode_status!(SessionResponse);

context_adapter! {
	/// WeChat mini program adapter.
	WeChatMiniProgramAdapter
}
impl WeChatMiniProgramAdapter {
	pub(crate) async fn exchange_credential(&self, js_code: &str) -> Result<Credential> {
		let config = self.ctx.config();
		let url = self.ctx.endpoint_with_query(
			EndpointRole::Token,
			SESSION_URL,
			&[
				("appid", config.client_id.as_str()),
				("secret", config.client_secret.expose()),
				("js_code", js_code),
				("grant_type", "authorization_code"),
			],
		)?;
		let session: SessionResponse = self.ctx.get_json(&url).await?;
		let union_id = (!session.unionid.is_empty()).then_some(session.unionid);

		Ok(Credential::bearer(session.session_key)
			.with_token_type("SessionKey")
			.with_extra(CredentialExtra::OpenId { open_id: session.openid, union_id }))
	}

	pub(crate) async fn fetch_identity(&self, credential: &Credential) -> Result<Identity> {
		let CredentialExtra::OpenId { open_id, union_id } = &credential.extra else {
			return Err(mismatch(self.ctx.kind(), "open_id"));
		};

		Ok(Identity::builder(open_id)
			.union_id(union_id.as_deref().unwrap_or_default())
			.username(open_id)
			.extra(format!("wechat_openid_{}", self.ctx.config().client_id), open_id)
			.build()?)
	}
}

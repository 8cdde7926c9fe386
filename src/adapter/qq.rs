//! QQ Connect login.
//!
//! QQ answers the token call with a form-encoded body and reports errors (and the `me` lookup)
//! as JSONP, so those responses are unwrapped before decoding.

// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	adapter::{
		common::{RemoteStatus, ensure_success, get_request, lenient_i64, parse_json},
		context_adapter,
	},
	auth::{Credential, CredentialExtra, Identity},
	error::{DecodeError, RemoteCode},
	provider::EndpointRole,
};

const TOKEN_URL: &str = "https://graph.qq.com/oauth2.0/token";
const ME_URL: &str = "https://graph.qq.com/oauth2.0/me";
const USER_INFO_URL: &str = "https://graph.qq.com/user/get_user_info";

#[derive(Debug, Deserialize)]
struct JsonpError {
	#[serde(default, deserialize_with = "lenient_i64")]
	error: i64,
	#[serde(default)]
	error_description: String,
}
impl RemoteStatus for JsonpError {
	fn remote_error(&self) -> Option<(RemoteCode, String)> {
		(self.error != 0).then(|| (RemoteCode::Numeric(self.error), self.error_description.clone()))
	}
}

#[derive(Debug, Deserialize)]
struct MeResponse {
	#[serde(default)]
	openid: String,
	#[serde(default)]
	unionid: String,
	#[serde(flatten)]
	status: JsonpError,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
	#[serde(default, deserialize_with = "lenient_i64")]
	ret: i64,
	#[serde(default)]
	msg: String,
	#[serde(default)]
	nickname: String,
	#[serde(default)]
	figureurl_qq_1: String,
	#[serde(default)]
	gender: String,
	#[serde(default)]
	province: String,
	#[serde(default)]
	city: String,
}
impl RemoteStatus for UserInfoResponse {
	fn remote_error(&self) -> Option<(RemoteCode, String)> {
		(self.ret != 0).then(|| (RemoteCode::Numeric(self.ret), self.msg.clone()))
	}
}

/// Returns the JSON payload inside a `callback( ... );` wrapper.
fn strip_jsonp(body: &str) -> Option<&str> {
	let body = body.trim();
	let inner = body.strip_prefix("callback")?.trim_start().strip_prefix('(')?;
	let inner = inner.trim_end().trim_end_matches(';').trim_end().strip_suffix(')')?;

	Some(inner.trim())
}

context_adapter! {
	/// QQ Connect adapter.
	QqAdapter
}
impl QqAdapter {
	pub(crate) async fn exchange_credential(&self, code: &str) -> Result<Credential> {
		let config = self.ctx.config();
		let redirect = config.redirect_url.as_ref().map(Url::as_str).unwrap_or_default();
		let url = self.ctx.endpoint_with_query(
			EndpointRole::Token,
			TOKEN_URL,
			&[
				("grant_type", "authorization_code"),
				("client_id", config.client_id.as_str()),
				("client_secret", config.client_secret.expose()),
				("code", code),
				("redirect_uri", redirect),
			],
		)?;
		let response = self.ctx.send_raw(get_request(&url, &[])?).await?;
		let status = response.status().as_u16();
		let body = String::from_utf8_lossy(response.body());

		if let Some(json) = strip_jsonp(&body) {
			let error = parse_json::<JsonpError>(json.as_bytes(), status)?;

			return Err(match error.remote_error() {
				Some((code, message)) => Error::Remote { code, message },
				None => DecodeError::Format { reason: "unexpected JSONP token body".into() }.into(),
			});
		}

		ensure_success(&response)?;

		let fields = form_urlencoded::parse(body.trim().as_bytes())
			.into_owned()
			.collect::<HashMap<String, String>>();
		let access_token = fields
			.get("access_token")
			.filter(|token| !token.is_empty())
			.ok_or(DecodeError::MissingField { field: "access_token" })?;
		let expires_in = fields.get("expires_in").and_then(|value| value.parse().ok()).unwrap_or(0);

		Ok(Credential::bearer(access_token.as_str())
			.with_refresh_token(fields.get("refresh_token").cloned().unwrap_or_default())
			.with_expiry(self.ctx.expiry(expires_in)))
	}

	pub(crate) async fn fetch_identity(&self, credential: &Credential) -> Result<Identity> {
		let access_token = credential.access_token.expose();
		let (open_id, union_id) = match &credential.extra {
			CredentialExtra::OpenId { open_id, union_id } =>
				(open_id.clone(), union_id.clone().unwrap_or_default()),
			_ => self.resolve_open_id(access_token).await?,
		};
		let url = self.ctx.endpoint_with_query(
			EndpointRole::UserInfo,
			USER_INFO_URL,
			&[
				("access_token", access_token),
				("oauth_consumer_key", self.ctx.config().client_id.as_str()),
				("openid", open_id.as_str()),
			],
		)?;
		let info: UserInfoResponse = self.ctx.get_json(&url).await?;

		Ok(Identity::builder(&open_id)
			.union_id(&union_id)
			.username(&info.nickname)
			.avatar_url(&info.figureurl_qq_1)
			.extra("gender", &info.gender)
			.extra("province", &info.province)
			.extra("city", &info.city)
			.build()?)
	}

	async fn resolve_open_id(&self, access_token: &str) -> Result<(String, String)> {
		let url = self.ctx.endpoint_with_query(
			EndpointRole::SubjectLookup,
			ME_URL,
			&[("access_token", access_token), ("unionid", "1")],
		)?;
		let response = self.ctx.send_raw(get_request(&url, &[])?).await?;
		let status = response.status().as_u16();
		let body = String::from_utf8_lossy(response.body());
		let json = strip_jsonp(&body).unwrap_or(body.as_ref());
		let me = parse_json::<MeResponse>(json.as_bytes(), status)?;

		if let Some((code, message)) = me.status.remote_error() {
			return Err(Error::Remote { code, message });
		}

		ensure_success(&response)?;

		if me.openid.is_empty() {
			return Err(DecodeError::MissingField { field: "openid" }.into());
		}

		Ok((me.openid, me.unionid))
	}
}

//! Alipay login through the signed open-platform gateway.
//!
//! Every gateway call is a form `POST` whose parameters are signed with the application's RSA
//! private key (configured as the client secret). Failures come back inside an HTTP 200 body,
//! either as an `error_response` object or as a non-`10000` code inside the method response.

// std
use std::sync::OnceLock;
// crates.io
use time::{
	UtcOffset,
	format_description::BorrowedFormatItem,
	macros::{format_description, offset},
};
// self
use crate::{
	_prelude::*,
	adapter::{
		common::{RemoteStatus, form_request, lenient_i64, lenient_string},
		AdapterContext, mismatch,
	},
	auth::{Credential, CredentialExtra, Identity},
	error::RemoteCode,
	provider::EndpointRole,
	signing::{RequestSigner, RsaRequestSigner, SigningError},
};

const GATEWAY_URL: &str = "https://openapi.alipay.com/gateway.do";
const TOKEN_METHOD: &str = "alipay.system.oauth.token";
const USER_INFO_METHOD: &str = "alipay.user.info.share";
const SUCCESS_CODE: &str = "10000";
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
	format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
// Gateway timestamps are read as China Standard Time.
const GATEWAY_OFFSET: UtcOffset = offset!(+8);

#[derive(Debug, Default, Deserialize)]
struct GatewayStatus {
	#[serde(default, deserialize_with = "lenient_string")]
	code: String,
	#[serde(default)]
	msg: String,
	#[serde(default)]
	sub_code: String,
	#[serde(default)]
	sub_msg: String,
}
impl GatewayStatus {
	fn remote_error(&self) -> Option<(RemoteCode, String)> {
		if self.code.is_empty() || self.code == SUCCESS_CODE {
			return None;
		}

		let code = if self.sub_code.is_empty() { &self.code } else { &self.sub_code };
		let message = if self.sub_msg.is_empty() { &self.msg } else { &self.sub_msg };

		Some((RemoteCode::Symbolic(code.clone()), message.clone()))
	}
}

#[derive(Debug, Default, Deserialize)]
struct TokenPayload {
	#[serde(default)]
	access_token: String,
	#[serde(default)]
	refresh_token: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	expires_in: i64,
	#[serde(default)]
	user_id: String,
	#[serde(default)]
	open_id: String,
	#[serde(flatten)]
	status: GatewayStatus,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
	#[serde(default)]
	alipay_system_oauth_token_response: TokenPayload,
	#[serde(default)]
	error_response: Option<GatewayStatus>,
}
impl RemoteStatus for TokenResponse {
	fn remote_error(&self) -> Option<(RemoteCode, String)> {
		self.error_response
			.as_ref()
			.and_then(GatewayStatus::remote_error)
			.or_else(|| self.alipay_system_oauth_token_response.status.remote_error())
	}
}

#[derive(Debug, Default, Deserialize)]
struct UserInfoPayload {
	#[serde(default)]
	user_id: String,
	#[serde(default)]
	open_id: String,
	#[serde(default)]
	nick_name: String,
	#[serde(default)]
	avatar: String,
	#[serde(default)]
	province: String,
	#[serde(default)]
	city: String,
	#[serde(flatten)]
	status: GatewayStatus,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
	#[serde(default)]
	alipay_user_info_share_response: UserInfoPayload,
	#[serde(default)]
	error_response: Option<GatewayStatus>,
}
impl RemoteStatus for UserInfoResponse {
	fn remote_error(&self) -> Option<(RemoteCode, String)> {
		self.error_response
			.as_ref()
			.and_then(GatewayStatus::remote_error)
			.or_else(|| self.alipay_user_info_share_response.status.remote_error())
	}
}

/// Alipay adapter.
///
/// The private key is decoded on the first gateway call and reused afterwards; a key that
/// fails to decode is retried on the next call.
#[derive(Clone, Debug)]
pub struct AlipayAdapter {
	ctx: AdapterContext,
	signer: OnceLock<RsaRequestSigner>,
}
impl AlipayAdapter {
	/// Wraps the shared adapter context.
	pub fn new(ctx: AdapterContext) -> Self {
		Self { ctx, signer: OnceLock::new() }
	}

	/// Shared adapter context.
	pub fn context(&self) -> &AdapterContext {
		&self.ctx
	}

	pub(crate) fn context_mut(&mut self) -> &mut AdapterContext {
		&mut self.ctx
	}

	pub(crate) async fn exchange_credential(&self, code: &str) -> Result<Credential> {
		let params = self.signed_params(
			TOKEN_METHOD,
			&[("grant_type", "authorization_code"), ("code", code)],
			OffsetDateTime::now_utc(),
		)?;
		let response: TokenResponse = self.call_gateway(EndpointRole::Token, &params).await?;
		let token = response.alipay_system_oauth_token_response;
		let uid = if token.user_id.is_empty() { token.open_id } else { token.user_id };

		Ok(Credential::bearer(token.access_token)
			.with_refresh_token(token.refresh_token)
			.with_expiry(self.ctx.expiry(token.expires_in))
			.with_extra(CredentialExtra::Uid { uid }))
	}

	pub(crate) async fn fetch_identity(&self, credential: &Credential) -> Result<Identity> {
		let known_uid = match &credential.extra {
			CredentialExtra::Uid { uid } => uid.as_str(),
			CredentialExtra::None => "",
			_ => return Err(mismatch(self.ctx.kind(), "uid")),
		};
		let params = self.signed_params(
			USER_INFO_METHOD,
			&[("auth_token", credential.access_token.expose())],
			OffsetDateTime::now_utc(),
		)?;
		let response: UserInfoResponse = self.call_gateway(EndpointRole::UserInfo, &params).await?;
		let info = response.alipay_user_info_share_response;

		Ok(Identity::builder(known_uid)
			.app_scoped_id(&info.open_id)
			.app_scoped_id(&info.user_id)
			.username(&info.nick_name)
			.avatar_url(&info.avatar)
			.extra("province", &info.province)
			.extra("city", &info.city)
			.build()?)
	}

	fn signer(&self) -> Result<&RsaRequestSigner, SigningError> {
		if let Some(signer) = self.signer.get() {
			return Ok(signer);
		}

		let parsed = RsaRequestSigner::from_material(self.ctx.config().client_secret.expose())?;

		Ok(self.signer.get_or_init(|| parsed))
	}

	/// Builds the signed parameter set for one gateway `method`.
	pub(crate) fn signed_params(
		&self,
		method: &str,
		business: &[(&str, &str)],
		now: OffsetDateTime,
	) -> Result<BTreeMap<String, String>, SigningError> {
		let signer = self.signer()?;
		let timestamp = now.to_offset(GATEWAY_OFFSET).format(TIMESTAMP_FORMAT)?;
		let mut params = BTreeMap::from_iter(
			[
				("app_id", self.ctx.config().client_id.as_str()),
				("charset", "utf-8"),
				("method", method),
				("sign_type", "RSA2"),
				("timestamp", timestamp.as_str()),
				("version", "1.0"),
			]
			.into_iter()
			.chain(business.iter().copied())
			.map(|(key, value)| (key.to_owned(), value.to_owned())),
		);

		signer.sign_params(&mut params)?;

		Ok(params)
	}

	async fn call_gateway<T>(
		&self,
		role: EndpointRole,
		params: &BTreeMap<String, String>,
	) -> Result<T>
	where
		T: DeserializeOwned + RemoteStatus,
	{
		// Token and profile calls share one gateway; roles let callers split them anyway.
		let url = self.ctx.endpoint(role, GATEWAY_URL)?;
		let request =
			form_request(&url, params.iter().map(|(key, value)| (key.as_str(), value.as_str())), &[])?;

		self.ctx.send(request).await
	}
}

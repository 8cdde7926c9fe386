//! DingTalk login with organization directory enrichment.
//!
//! The public profile (`contact/users/me`) yields the union id. An application token then
//! resolves the union id into the organization member id, and the member record overrides
//! the profile's phone, email, and username wherever it carries a value.

// self
use crate::{
	_prelude::*,
	adapter::{
		common::{RemoteStatus, errcode_status, get_request, lenient_i64},
		context_adapter,
	},
	auth::{Credential, Identity},
	country,
	error::RemoteCode,
	provider::EndpointRole,
};

const TOKEN_URL: &str = "https://api.dingtalk.com/v1.0/oauth2/userAccessToken";
const PROFILE_URL: &str = "https://api.dingtalk.com/v1.0/contact/users/me";
const APP_TOKEN_URL: &str = "https://api.dingtalk.com/v1.0/oauth2/accessToken";
const MEMBER_LOOKUP_URL: &str = "https://oapi.dingtalk.com/topapi/user/getbyunionid";
const MEMBER_DETAIL_URL: &str = "https://oapi.dingtalk.com/topapi/v2/user/get";
const ACCESS_TOKEN_HEADER: &str = "x-acs-dingtalk-access-token";
// Returned by the member lookup when the subject belongs to another organization.
const ERR_NOT_IN_ORGANIZATION: i64 = 60121;

/// Error envelope of the `api.dingtalk.com` v1.0 endpoints.
#[derive(Debug, Default, Deserialize)]
struct GatewayStatus {
	#[serde(default)]
	code: String,
	#[serde(default)]
	message: String,
}
impl GatewayStatus {
	fn remote_error(&self) -> Option<(RemoteCode, String)> {
		(!self.code.is_empty() && self.code != "0")
			.then(|| (RemoteCode::Symbolic(self.code.clone()), self.message.clone()))
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
	#[serde(default)]
	access_token: String,
	#[serde(default)]
	refresh_token: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	expire_in: i64,
	#[serde(flatten)]
	status: GatewayStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
	#[serde(default)]
	nick: String,
	#[serde(default)]
	open_id: String,
	#[serde(default)]
	union_id: String,
	#[serde(default)]
	avatar_url: String,
	#[serde(default)]
	email: String,
	#[serde(default)]
	mobile: String,
	#[serde(default)]
	state_code: String,
	#[serde(flatten)]
	status: GatewayStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppTokenResponse {
	#[serde(default)]
	access_token: String,
	#[serde(flatten)]
	status: GatewayStatus,
}

macro_rules! gateway_status {
	($($ty:ty),+) => {
		$(
			impl RemoteStatus for $ty {
				fn remote_error(&self) -> Option<(RemoteCode, String)> {
					self.status.remote_error()
				}
			}
		)+
	};
}
gateway_status!(TokenResponse, ProfileResponse, AppTokenResponse);

#[derive(Debug, Default, Deserialize)]
struct MemberLookup {
	#[serde(default)]
	userid: String,
}

#[derive(Debug, Deserialize)]
struct MemberLookupResponse {
	#[serde(default)]
	result: MemberLookup,
	#[serde(default, deserialize_with = "lenient_i64")]
	errcode: i64,
	#[serde(default)]
	errmsg: String,
}

#[derive(Debug, Default, Deserialize)]
struct MemberDetail {
	#[serde(default)]
	mobile: String,
	#[serde(default)]
	email: String,
	#[serde(default)]
	job_number: String,
	#[serde(default)]
	title: String,
}

#[derive(Debug, Deserialize)]
struct MemberDetailResponse {
	#[serde(default)]
	result: MemberDetail,
	#[serde(default, deserialize_with = "lenient_i64")]
	errcode: i64,
	#[serde(default)]
	errmsg: String,
}

errcode_status!(MemberLookupResponse, MemberDetailResponse);

context_adapter! {
	/// DingTalk adapter.
	DingTalkAdapter
}
impl DingTalkAdapter {
	pub(crate) async fn exchange_credential(&self, code: &str) -> Result<Credential> {
		let config = self.ctx.config();
		let url = self.ctx.endpoint(EndpointRole::Token, TOKEN_URL)?;
		let body = serde_json::json!({
			"clientId": config.client_id,
			"clientSecret": config.client_secret.expose(),
			"code": code,
			"grantType": "authorization_code",
		});
		let token: TokenResponse = self.ctx.post_json(&url, &body).await?;

		Ok(Credential::bearer(token.access_token)
			.with_refresh_token(token.refresh_token)
			.with_expiry(self.ctx.expiry(token.expire_in)))
	}

	pub(crate) async fn fetch_identity(&self, credential: &Credential) -> Result<Identity> {
		let profile_url = self.ctx.endpoint(EndpointRole::UserInfo, PROFILE_URL)?;
		let profile: ProfileResponse = self
			.ctx
			.send(get_request(
				&profile_url,
				&[(ACCESS_TOKEN_HEADER, credential.access_token.expose())],
			)?)
			.await?;
		let builder = Identity::builder(&profile.open_id)
			.union_id(&profile.union_id)
			.username(&profile.nick)
			.email(&profile.email)
			.phone(&profile.mobile)
			.avatar_url(&profile.avatar_url)
			.country_code(country::calling_code_to_iso(&profile.state_code));
		let app_token = self.app_token().await?;
		let member_id = self.member_id(&app_token, &profile.union_id).await?;
		let member = self.member_detail(&app_token, &member_id).await?;

		Ok(builder
			.phone(&member.mobile)
			.email(&member.email)
			.username(&member.job_number)
			.extra("dingtalk_userid", &member_id)
			.extra("dingtalk_title", &member.title)
			.build()?)
	}

	async fn app_token(&self) -> Result<String> {
		let config = self.ctx.config();
		let url = self.ctx.endpoint(EndpointRole::AppToken, APP_TOKEN_URL)?;
		let body = serde_json::json!({
			"appKey": config.client_id,
			"appSecret": config.client_secret.expose(),
		});
		let token: AppTokenResponse = self.ctx.post_json(&url, &body).await?;

		Ok(token.access_token)
	}

	async fn member_id(&self, app_token: &str, union_id: &str) -> Result<String> {
		let url = self.ctx.endpoint_with_query(
			EndpointRole::DirectoryLookup,
			MEMBER_LOOKUP_URL,
			&[("access_token", app_token)],
		)?;
		let body = serde_json::json!({ "unionid": union_id });

		match self.ctx.post_json::<MemberLookupResponse>(&url, &body).await {
			Ok(response) => Ok(response.result.userid),
			Err(Error::Remote { code: RemoteCode::Numeric(ERR_NOT_IN_ORGANIZATION), message }) =>
				Err(Error::SubjectRejected { reason: message }),
			Err(e) => Err(e),
		}
	}

	async fn member_detail(&self, app_token: &str, member_id: &str) -> Result<MemberDetail> {
		let url = self.ctx.endpoint_with_query(
			EndpointRole::DirectoryDetail,
			MEMBER_DETAIL_URL,
			&[("access_token", app_token)],
		)?;
		let detail: MemberDetailResponse =
			self.ctx.post_json(&url, &serde_json::json!({ "userid": member_id })).await?;

		Ok(detail.result)
	}
}

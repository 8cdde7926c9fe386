//! WeChat website login plus official-account scan login.
//!
//! Website login redeems an authorization code through `sns/oauth2/access_token` and reads the
//! profile from `sns/userinfo`. Scan login never talks to those endpoints: the QR session
//! registers a ticket in the injected [`ScanTicketCache`], the official-account callback
//! confirms it, and the fetch step consumes the confirmed subject.

// self
use crate::{
	_prelude::*,
	adapter::{
		AdapterContext,
		common::{errcode_status, lenient_i64, lenient_string},
		mismatch,
	},
	auth::{Credential, CredentialExtra, Identity, TicketId},
	error::ConfigError,
	obs::{CallSpan, Operation},
	provider::EndpointRole,
	scan::{ScanError, ScanTicketCache},
};

/// Prefix that marks an exchange artifact as a scan-login ticket rather than an
/// authorization code.
pub const SCAN_ARTIFACT_PREFIX: &str = "wechat_oa:";

const TOKEN_URL: &str = "https://api.weixin.qq.com/sns/oauth2/access_token";
const USER_INFO_URL: &str = "https://api.weixin.qq.com/sns/userinfo";
const APP_TOKEN_URL: &str = "https://api.weixin.qq.com/cgi-bin/token";
const QR_CODE_URL: &str = "https://api.weixin.qq.com/cgi-bin/qrcode/create";
const QR_EXPIRE_SECONDS: i64 = 3600;

#[derive(Debug, Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	expires_in: i64,
	#[serde(default)]
	refresh_token: String,
	#[serde(default)]
	openid: String,
	#[serde(default)]
	unionid: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	errcode: i64,
	#[serde(default)]
	errmsg: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
	#[serde(default)]
	openid: String,
	#[serde(default)]
	nickname: String,
	#[serde(default)]
	headimgurl: String,
	#[serde(default)]
	unionid: String,
	#[serde(default)]
	country: String,
	#[serde(default)]
	province: String,
	#[serde(default)]
	city: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	errcode: i64,
	#[serde(default)]
	errmsg: String,
}

#[derive(Debug, Deserialize)]
struct AppTokenResponse {
	#[serde(default)]
	access_token: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	errcode: i64,
	#[serde(default)]
	errmsg: String,
}

#[derive(Debug, Deserialize)]
struct QrCodeResponse {
	#[serde(default)]
	ticket: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	expire_seconds: i64,
	#[serde(default, deserialize_with = "lenient_string")]
	url: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	errcode: i64,
	#[serde(default)]
	errmsg: String,
}

errcode_status!(TokenResponse, UserInfoResponse, AppTokenResponse, QrCodeResponse);

/// Pending official-account scan login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanSession {
	/// Ticket registered in the cache; also the QR ticket issued by WeChat.
	pub ticket: TicketId,
	/// Content to encode in the QR image.
	pub url: String,
	/// Lifetime reported by WeChat.
	pub expires_in: Duration,
}
impl ScanSession {
	/// Artifact the polling client passes to
	/// [`exchange_credential`](crate::adapter::IdentityProvider::exchange_credential) once the
	/// scan is confirmed.
	pub fn artifact(&self) -> String {
		format!("{SCAN_ARTIFACT_PREFIX}{}", self.ticket)
	}
}

/// WeChat adapter.
#[derive(Clone, Debug)]
pub struct WeChatAdapter {
	ctx: AdapterContext,
	scan_cache: Option<Arc<ScanTicketCache>>,
}
impl WeChatAdapter {
	/// Creates the adapter; scan login needs `scan_cache`.
	pub fn new(ctx: AdapterContext, scan_cache: Option<Arc<ScanTicketCache>>) -> Self {
		Self { ctx, scan_cache }
	}

	/// Shared adapter context.
	pub fn context(&self) -> &AdapterContext {
		&self.ctx
	}

	pub(crate) fn context_mut(&mut self) -> &mut AdapterContext {
		&mut self.ctx
	}

	/// Extra-map key under which the application-scoped openid is recorded; openids differ
	/// per app id.
	pub fn open_id_key(&self) -> String {
		format!("wechat_openid_{}", self.ctx.config().client_id)
	}

	/// Starts an official-account scan login for `scene`.
	///
	/// Obtains an application token, creates a temporary string-scene QR ticket, and registers
	/// the ticket in the cache. The cache is touched only after both remote calls finish.
	pub async fn start_scan_login(&self, scene: &str) -> Result<ScanSession> {
		CallSpan::new(self.ctx.kind().as_str(), Operation::StartScanLogin)
			.observe_async(self.start_scan_login_inner(scene))
			.await
	}

	pub(crate) async fn exchange_credential(&self, artifact: &str) -> Result<Credential> {
		if let Some(ticket) = artifact.strip_prefix(SCAN_ARTIFACT_PREFIX) {
			let ticket = TicketId::new(ticket).map_err(ScanError::from)?;

			return Ok(Credential::scan_ticket(ticket));
		}

		let config = self.ctx.config();
		let url = self.ctx.endpoint_with_query(
			EndpointRole::Token,
			TOKEN_URL,
			&[
				("appid", config.client_id.as_str()),
				("secret", config.client_secret.expose()),
				("code", artifact),
				("grant_type", "authorization_code"),
			],
		)?;
		let token: TokenResponse = self.ctx.get_json(&url).await?;
		let union_id = (!token.unionid.is_empty()).then_some(token.unionid);

		Ok(Credential::bearer(token.access_token)
			.with_refresh_token(token.refresh_token)
			.with_expiry(self.ctx.expiry(token.expires_in))
			.with_extra(CredentialExtra::OpenId { open_id: token.openid, union_id }))
	}

	pub(crate) async fn fetch_identity(&self, credential: &Credential) -> Result<Identity> {
		match &credential.extra {
			CredentialExtra::ScanTicket { ticket } => self.consume_scan(ticket),
			CredentialExtra::OpenId { open_id, union_id } =>
				self.fetch_profile(credential, open_id, union_id.as_deref()).await,
			_ => Err(mismatch(self.ctx.kind(), "open_id")),
		}
	}

	async fn fetch_profile(
		&self,
		credential: &Credential,
		open_id: &str,
		union_id: Option<&str>,
	) -> Result<Identity> {
		let url = self.ctx.endpoint_with_query(
			EndpointRole::UserInfo,
			USER_INFO_URL,
			&[("access_token", credential.access_token.expose()), ("openid", open_id)],
		)?;
		let info: UserInfoResponse = self.ctx.get_json(&url).await?;
		let open_id = if info.openid.is_empty() { open_id } else { info.openid.as_str() };

		Ok(Identity::builder(open_id)
			.union_id(union_id.unwrap_or_default())
			.union_id(&info.unionid)
			.username(&info.nickname)
			.avatar_url(&info.headimgurl)
			.extra(self.open_id_key(), open_id)
			.extra("country", &info.country)
			.extra("province", &info.province)
			.extra("city", &info.city)
			.build()?)
	}

	fn consume_scan(&self, ticket: &TicketId) -> Result<Identity> {
		let cache = self.scan_cache.as_ref().ok_or(ConfigError::ScanLoginUnavailable)?;
		let subject = cache.read_and_consume(ticket)?;
		let handle = format!("wx_user_{subject}");

		Ok(Identity::builder(&subject).union_id(&subject).username(handle).build()?)
	}

	async fn start_scan_login_inner(&self, scene: &str) -> Result<ScanSession> {
		let cache = self.scan_cache.as_ref().ok_or(ConfigError::ScanLoginUnavailable)?;
		let config = self.ctx.config();
		let token_url = self.ctx.endpoint_with_query(
			EndpointRole::AppToken,
			APP_TOKEN_URL,
			&[
				("grant_type", "client_credential"),
				("appid", config.client_id.as_str()),
				("secret", config.client_secret.expose()),
			],
		)?;
		let app_token: AppTokenResponse = self.ctx.get_json(&token_url).await?;
		let qr_url = self.ctx.endpoint_with_query(
			EndpointRole::QrCode,
			QR_CODE_URL,
			&[("access_token", app_token.access_token.as_str())],
		)?;
		let body = serde_json::json!({
			"expire_seconds": QR_EXPIRE_SECONDS,
			"action_name": "QR_STR_SCENE",
			"action_info": { "scene": { "scene_str": scene } },
		});
		let qr: QrCodeResponse = self.ctx.post_json(&qr_url, &body).await?;
		let ticket = TicketId::new(&qr.ticket).map_err(ScanError::from)?;
		let expires_in =
			if qr.expire_seconds > 0 { qr.expire_seconds } else { QR_EXPIRE_SECONDS };

		cache.create(ticket.clone());

		Ok(ScanSession { ticket, url: qr.url, expires_in: Duration::seconds(expires_in) })
	}
}

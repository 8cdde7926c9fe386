//! Sina Weibo login.
//!
//! The profile and the e-mail address live behind separate endpoints; the e-mail call needs its
//! own user grant and may answer with either a bare object or a one-element array.

// self
use crate::{
	_prelude::*,
	adapter::{
		common::{RemoteStatus, lenient_i64, lenient_string},
		context_adapter,
	},
	auth::{Credential, CredentialExtra, Identity},
	error::RemoteCode,
	provider::EndpointRole,
};

const TOKEN_URL: &str = "https://api.weibo.com/oauth2/access_token";
const USER_INFO_URL: &str = "https://api.weibo.com/2/users/show.json";
const EMAIL_URL: &str = "https://api.weibo.com/2/account/profile/email.json";

#[derive(Debug, Default, Deserialize)]
struct WeiboStatus {
	#[serde(default)]
	error: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	error_code: i64,
}
impl RemoteStatus for WeiboStatus {
	fn remote_error(&self) -> Option<(RemoteCode, String)> {
		(self.error_code != 0).then(|| (RemoteCode::Numeric(self.error_code), self.error.clone()))
	}
}

/// Implements [`RemoteStatus`] by delegating to a flattened `status` field.
macro_rules! weibo_status {
	($($ty:ty),+ $(,)?) => {
		$(
			impl RemoteStatus for $ty {
				fn remote_error(&self) -> Option<(RemoteCode, String)> {
					self.status.remote_error()
				}
			}
		)+
	};
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: String,
	#[serde(default, deserialize_with = "lenient_i64")]
	expires_in: i64,
	#[serde(default, deserialize_with = "lenient_string")]
	uid: String,
	#[serde(flatten)]
	status: WeiboStatus,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
	#[serde(default, deserialize_with = "lenient_string")]
	id: String,
	#[serde(default)]
	screen_name: String,
	#[serde(default)]
	name: String,
	#[serde(default)]
	avatar_large: String,
	#[serde(default)]
	location: String,
	#[serde(flatten)]
	status: WeiboStatus,
}

#[derive(Debug, Default, Deserialize)]
struct EmailEntry {
	#[serde(default)]
	email: String,
	#[serde(flatten)]
	status: WeiboStatus,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmailResponse {
	List(Vec<EmailEntry>),
	Single(EmailEntry),
}
impl EmailResponse {
	fn into_email(self) -> String {
		match self {
			Self::List(entries) => entries
				.into_iter()
				.map(|entry| entry.email)
				.find(|email| !email.is_empty())
				.unwrap_or_default(),
			Self::Single(entry) => entry.email,
		}
	}
}
impl RemoteStatus for EmailResponse {
	fn remote_error(&self) -> Option<(RemoteCode, String)> {
		match self {
			Self::List(entries) => entries.iter().find_map(|entry| entry.status.remote_error()),
			Self::Single(entry) => entry.status.remote_error(),
		}
	}
}

weibo_status!(TokenResponse, UserResponse);

context_adapter! {
	/// Sina Weibo adapter.
	WeiboAdapter
}
impl WeiboAdapter {
	pub(crate) async fn exchange_credential(&self, code: &str) -> Result<Credential> {
		let config = self.ctx.config();
		let redirect = config.redirect_url.as_ref().map(Url::as_str).unwrap_or_default();
		let url = self.ctx.endpoint(EndpointRole::Token, TOKEN_URL)?;
		let token: TokenResponse = self
			.ctx
			.post_form(
				&url,
				&[
					("grant_type", "authorization_code"),
					("client_id", config.client_id.as_str()),
					("client_secret", config.client_secret.expose()),
					("code", code),
					("redirect_uri", redirect),
				],
			)
			.await?;

		Ok(Credential::bearer(token.access_token)
			.with_expiry(self.ctx.expiry(token.expires_in))
			.with_extra(CredentialExtra::Uid { uid: token.uid }))
	}

	pub(crate) async fn fetch_identity(&self, credential: &Credential) -> Result<Identity> {
		let access_token = credential.access_token.expose();
		let uid = match &credential.extra {
			CredentialExtra::Uid { uid } => uid.as_str(),
			_ => "",
		};
		let mut query = vec![("access_token", access_token)];

		if !uid.is_empty() {
			query.push(("uid", uid));
		}

		let url = self.ctx.endpoint_with_query(EndpointRole::UserInfo, USER_INFO_URL, &query)?;
		let user: UserResponse = self.ctx.get_json(&url).await?;
		let url = self.ctx.endpoint_with_query(
			EndpointRole::Email,
			EMAIL_URL,
			&[("access_token", access_token)],
		)?;
		let email = self.ctx.get_json::<EmailResponse>(&url).await?.into_email();

		Ok(Identity::builder(uid)
			.app_scoped_id(&user.id)
			.username(&user.name)
			.display_name(&user.name)
			.display_name(&user.screen_name)
			.avatar_url(&user.avatar_large)
			.email(email)
			.extra("location", &user.location)
			.build()?)
	}
}

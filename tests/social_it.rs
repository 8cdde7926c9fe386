#![cfg(feature = "reqwest")]

// std
use std::sync::atomic::{AtomicUsize, Ordering};
// crates.io
use httpmock::prelude::*;
// self
use idp_broker::{
	_preludet::*,
	adapter::{Adapter, IdentityProvider},
	auth::{Credential, CredentialExtra},
	error::RemoteCode,
	http::{HttpRequest, HttpResponse, HttpTransport, TransportFuture},
	oauth::oauth2::http::StatusCode,
	provider::{EndpointRole, ProviderRegistry},
};

fn adapter(kind: &str, server: &MockServer, routes: &[(EndpointRole, &str)]) -> Adapter {
	let config = mock_config_builder(kind, &server.url(""), routes)
		.redirect_url(Url::parse("https://app.example.com/callback").expect("URL should parse."))
		.build()
		.expect("Config should build.");

	ProviderRegistry::new(test_reqwest_transport()).create(config).expect("Adapter should build.")
}

#[tokio::test]
async fn weibo_merges_profile_and_email() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2/access_token")
				.form_urlencoded_tuple("grant_type", "authorization_code")
				.form_urlencoded_tuple("client_id", "mock-client")
				.form_urlencoded_tuple("code", "wb-code");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"wb-token","expires_in":157679999,"remind_in":"157679999","uid":"1404376560"}"#);
		})
		.await;

	let show = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/2/users/show.json")
				.query_param("access_token", "wb-token")
				.query_param("uid", "1404376560");
			then.status(200).header("content-type", "application/json").body(
				r#"{"id":1404376560,"screen_name":"zaku","name":"zaku","location":"北京 朝阳区","avatar_large":"https://img.example.com/large.jpg"}"#,
			);
		})
		.await;
	let email = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/2/account/profile/email.json")
				.query_param("access_token", "wb-token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"[{"email":"zaku@weibo.example.com"}]"#);
		})
		.await;
	let weibo = adapter(
		"Weibo",
		&server,
		&[
			(EndpointRole::Token, "/oauth2/access_token"),
			(EndpointRole::UserInfo, "/2/users/show.json"),
			(EndpointRole::Email, "/2/account/profile/email.json"),
		],
	);
	let credential = weibo.exchange_credential("wb-code").await.expect("Exchange should succeed.");

	assert_eq!(credential.extra, CredentialExtra::Uid { uid: "1404376560".into() });

	let identity = weibo.fetch_identity(&credential).await.expect("Identity should resolve.");

	assert_eq!(identity.id, "1404376560");
	assert_eq!(identity.username, "zaku");
	assert_eq!(identity.email.as_deref(), Some("zaku@weibo.example.com"));
	assert_eq!(identity.avatar_url.as_deref(), Some("https://img.example.com/large.jpg"));

	show.assert_async().await;
	email.assert_async().await;
}

#[tokio::test]
async fn weibo_email_failures_fail_the_fetch() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/2/users/show.json");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"id":1404376560,"name":"zaku"}"#);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/2/account/profile/email.json");
			then.status(403)
				.header("content-type", "application/json")
				.body(r#"{"error":"Insufficient app permissions!","error_code":10014,"request":"/2/account/profile/email.json"}"#);
		})
		.await;

	let weibo = adapter(
		"Weibo",
		&server,
		&[
			(EndpointRole::UserInfo, "/2/users/show.json"),
			(EndpointRole::Email, "/2/account/profile/email.json"),
		],
	);
	let credential = Credential::bearer("wb-token")
		.with_extra(CredentialExtra::Uid { uid: "1404376560".into() });
	let err = weibo.fetch_identity(&credential).await.expect_err("Email errors must propagate.");

	assert!(matches!(err, Error::Remote { code: RemoteCode::Numeric(10014), .. }));
}

#[tokio::test]
async fn douyin_prefers_the_union_id() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/access_token/")
				.form_urlencoded_tuple("client_key", "mock-client")
				.form_urlencoded_tuple("client_secret", "mock-secret")
				.form_urlencoded_tuple("code", "dy-code");
			then.status(200).header("content-type", "application/json").body(
				r#"{"data":{"access_token":"dy-token","expires_in":"1296000","open_id":"dy-open","refresh_token":"dy-refresh","error_code":"0","description":""},"message":"success"}"#,
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/userinfo/")
				.form_urlencoded_tuple("access_token", "dy-token")
				.form_urlencoded_tuple("open_id", "dy-open");
			then.status(200).header("content-type", "application/json").body(
				r#"{"data":{"avatar":"https://img.example.com/dy.png","nickname":"Doudou","open_id":"dy-open","union_id":"dy-union","city":"","province":"","country":"","error_code":0},"message":"success"}"#,
			);
		})
		.await;

	let douyin = adapter(
		"Douyin",
		&server,
		&[(EndpointRole::Token, "/oauth/access_token/"), (EndpointRole::UserInfo, "/oauth/userinfo/")],
	);
	let credential = douyin.exchange_credential("dy-code").await.expect("Exchange should succeed.");
	let identity = douyin.fetch_identity(&credential).await.expect("Identity should resolve.");

	assert_eq!(identity.id, "dy-union");
	assert_eq!(identity.username, "Doudou");
	assert!(identity.extra.get("city").is_none());
}

#[tokio::test]
async fn douyin_nested_error_codes_fail_the_exchange() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/access_token/");
			then.status(200).header("content-type", "application/json").body(
				r#"{"data":{"error_code":10007,"description":"授权码过期"},"message":"error"}"#,
			);
		})
		.await;

	let err = adapter("Douyin", &server, &[(EndpointRole::Token, "/oauth/access_token/")])
		.exchange_credential("old")
		.await
		.expect_err("Expired codes must fail.");

	assert!(matches!(
		err,
		Error::Remote { code: RemoteCode::Numeric(10007), ref message } if message == "授权码过期"
	));
}

#[tokio::test]
async fn bilibili_envelopes_unwrap() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/x/account-oauth2/v1/token").json_body(serde_json::json!({
				"client_id": "mock-client",
				"client_secret": "mock-secret",
				"grant_type": "authorization_code",
				"code": "bl-code",
			}));
			then.status(200).header("content-type", "application/json").body(
				r#"{"code":0,"message":"0","data":{"access_token":"bl-token","expires_in":1630000000,"refresh_token":"bl-refresh"}}"#,
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/arcopen/fn/user/account/info")
				.query_param("client_id", "mock-client")
				.query_param("access_token", "bl-token");
			then.status(200).header("content-type", "application/json").body(
				r#"{"code":0,"message":"0","data":{"name":"bili","face":"https://img.example.com/face.jpg","openid":"bl-open"}}"#,
			);
		})
		.await;

	let bilibili = adapter(
		"Bilibili",
		&server,
		&[
			(EndpointRole::Token, "/x/account-oauth2/v1/token"),
			(EndpointRole::UserInfo, "/arcopen/fn/user/account/info"),
		],
	);
	let credential = bilibili.exchange_credential("bl-code").await.expect("Exchange should succeed.");
	let identity = bilibili.fetch_identity(&credential).await.expect("Identity should resolve.");

	assert_eq!(identity.id, "bl-open");
	assert_eq!(identity.username, "bili");
}

#[tokio::test]
async fn bilibili_non_zero_codes_are_remote_errors() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/x/account-oauth2/v1/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"code":-400,"message":"请求错误"}"#);
		})
		.await;

	let err = adapter("Bilibili", &server, &[(EndpointRole::Token, "/x/account-oauth2/v1/token")])
		.exchange_credential("bl-code")
		.await
		.expect_err("Non-zero codes must fail.");

	assert!(matches!(err, Error::Remote { code: RemoteCode::Numeric(-400), .. }));
}

#[tokio::test]
async fn baidu_builds_the_portrait_url() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/oauth/2.0/token")
				.query_param("grant_type", "authorization_code")
				.query_param("code", "bd-code")
				.query_param("redirect_uri", "https://app.example.com/callback");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"bd-token","expires_in":2592000,"refresh_token":"bd-refresh"}"#);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/rest/2.0/passport/users/getInfo")
				.query_param("access_token", "bd-token");
			then.status(200).header("content-type", "application/json").body(
				r#"{"openid":"bd-open","username":"baidu_user","portrait":"e2c1776c31393837313031319605"}"#,
			);
		})
		.await;

	let baidu = adapter(
		"Baidu",
		&server,
		&[
			(EndpointRole::Token, "/oauth/2.0/token"),
			(EndpointRole::UserInfo, "/rest/2.0/passport/users/getInfo"),
		],
	);
	let credential = baidu.exchange_credential("bd-code").await.expect("Exchange should succeed.");
	let identity = baidu.fetch_identity(&credential).await.expect("Identity should resolve.");

	assert_eq!(identity.id, "bd-open");
	assert_eq!(identity.username, "baidu_user");
	assert_eq!(
		identity.avatar_url.as_deref(),
		Some("https://himg.bdimg.com/sys/portrait/item/e2c1776c31393837313031319605")
	);
}

#[tokio::test]
async fn baidu_token_errors_are_symbolic() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth/2.0/token");
			then.status(401)
				.header("content-type", "application/json")
				.body(r#"{"error":"invalid_grant","error_description":"Invalid authorization code"}"#);
		})
		.await;

	let err = adapter("Baidu", &server, &[(EndpointRole::Token, "/oauth/2.0/token")])
		.exchange_credential("bd-code")
		.await
		.expect_err("Invalid codes must fail.");

	assert!(matches!(
		err,
		Error::Remote { code: RemoteCode::Symbolic(ref code), .. } if code == "invalid_grant"
	));
}

#[tokio::test]
async fn mini_program_identity_comes_from_the_session() {
	let server = MockServer::start_async().await;
	let session = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/sns/jscode2session")
				.query_param("appid", "mock-client")
				.query_param("js_code", "js-code");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"openid":"mp-open","session_key":"mp-session","unionid":"mp-union"}"#);
		})
		.await;
	let mini = adapter("WeChatMiniProgram", &server, &[(EndpointRole::Token, "/sns/jscode2session")]);
	let credential = mini.exchange_credential("js-code").await.expect("Exchange should succeed.");

	assert_eq!(credential.token_type, "SessionKey");
	assert_eq!(credential.access_token.expose(), "mp-session");

	let identity = mini.fetch_identity(&credential).await.expect("Identity should resolve.");

	assert_eq!(identity.id, "mp-union");
	assert_eq!(identity.extra.get("wechat_openid_mock-client").map(String::as_str), Some("mp-open"));

	session.assert_async().await;
}

struct CannedTransport {
	body: &'static str,
	calls: AtomicUsize,
}
impl HttpTransport for CannedTransport {
	fn execute(&self, _request: HttpRequest) -> TransportFuture<'_> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let mut response = HttpResponse::new(self.body.as_bytes().to_vec());

		*response.status_mut() = StatusCode::OK;

		Box::pin(async move { Ok(response) })
	}
}

#[tokio::test]
async fn replacing_the_transport_redirects_later_calls() {
	let server = MockServer::start_async().await;
	let original = server
		.mock_async(|when, then| {
			when.method(GET).path("/sns/jscode2session");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let canned = Arc::new(CannedTransport {
		body: r#"{"openid":"canned-open","session_key":"canned-session"}"#,
		calls: AtomicUsize::new(0),
	});
	let mut mini =
		adapter("WeChatMiniProgram", &server, &[(EndpointRole::Token, "/sns/jscode2session")]);

	mini.set_transport(canned.clone());

	let credential = mini.exchange_credential("js-code").await.expect("Exchange should succeed.");

	assert_eq!(credential.access_token.expose(), "canned-session");
	assert_eq!(canned.calls.load(Ordering::SeqCst), 1);
	assert_eq!(original.hits_async().await, 0);
}

#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use idp_broker::{
	_preludet::*,
	adapter::{Adapter, IdentityProvider},
	error::RemoteCode,
	provider::{EndpointRole, ProviderRegistry},
};

fn qq(server: &MockServer) -> Adapter {
	let config = mock_config_builder(
		"QQ",
		&server.url(""),
		&[
			(EndpointRole::Token, "/oauth2.0/token"),
			(EndpointRole::SubjectLookup, "/oauth2.0/me"),
			(EndpointRole::UserInfo, "/user/get_user_info"),
		],
	)
	.redirect_url(Url::parse("https://app.example.com/qq/callback").expect("URL should parse."))
	.build()
	.expect("QQ config should build.");

	ProviderRegistry::new(test_reqwest_transport()).create(config).expect("QQ adapter should build.")
}

#[tokio::test]
async fn form_encoded_tokens_and_jsonp_lookups_resolve_the_union_id() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/oauth2.0/token")
				.query_param("grant_type", "authorization_code")
				.query_param("client_id", "mock-client")
				.query_param("code", "qq-code")
				.query_param("redirect_uri", "https://app.example.com/qq/callback");
			then.status(200)
				.header("content-type", "text/html")
				.body("access_token=qq-token&expires_in=7776000&refresh_token=qq-refresh");
		})
		.await;
	let me = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/oauth2.0/me")
				.query_param("access_token", "qq-token")
				.query_param("unionid", "1");
			then.status(200).header("content-type", "text/html").body(
				"callback( {\"client_id\":\"mock-client\",\"openid\":\"QQOPEN\",\"unionid\":\"QQUNION\"} );\n",
			);
		})
		.await;
	let profile = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/user/get_user_info")
				.query_param("access_token", "qq-token")
				.query_param("oauth_consumer_key", "mock-client")
				.query_param("openid", "QQOPEN");
			then.status(200).header("content-type", "application/json").body(
				r#"{"ret":0,"msg":"","nickname":"Pony","figureurl_qq_1":"https://img.example.com/40.png","figureurl_qq_2":"https://img.example.com/100.png","gender":"男"}"#,
			);
		})
		.await;
	let adapter = qq(&server);
	let credential = adapter.exchange_credential("qq-code").await.expect("Exchange should succeed.");

	assert_eq!(credential.access_token.expose(), "qq-token");
	assert_eq!(credential.refresh_token.as_ref().map(|token| token.expose()), Some("qq-refresh"));

	let identity = adapter.fetch_identity(&credential).await.expect("Identity should resolve.");

	assert_eq!(identity.id, "QQUNION");
	assert_eq!(identity.username, "Pony");
	assert_eq!(identity.avatar_url.as_deref(), Some("https://img.example.com/40.png"));

	token.assert_async().await;
	me.assert_async().await;
	profile.assert_async().await;
}

#[tokio::test]
async fn jsonp_token_errors_carry_the_platform_code() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth2.0/token");
			then.status(200).body(
				"callback( {\"error\":100019,\"error_description\":\"code to access token error\"} );",
			);
		})
		.await;

	let err = qq(&server).exchange_credential("stale").await.expect_err("Stale codes must fail.");

	assert!(matches!(err, Error::Remote { code: RemoteCode::Numeric(100019), .. }));
}

#[tokio::test]
async fn profile_ret_codes_fail_the_fetch() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth2.0/me");
			then.status(200).body("callback( {\"openid\":\"QQOPEN\"} );");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/user/get_user_info");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"ret":-1,"msg":"client request's parameters are invalid, invalid openid"}"#);
		})
		.await;

	let err = qq(&server)
		.fetch_identity(&idp_broker::auth::Credential::bearer("qq-token"))
		.await
		.expect_err("Negative ret codes must fail.");

	assert!(matches!(err, Error::Remote { code: RemoteCode::Numeric(-1), .. }));
}

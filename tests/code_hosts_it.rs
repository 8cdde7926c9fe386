#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use idp_broker::{
	_preludet::*,
	adapter::{Adapter, IdentityProvider},
	auth::Credential,
	error::RemoteCode,
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
async fn github_exchange_and_profile() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/login/oauth/access_token")
				.header("accept", "application/json")
				.json_body(serde_json::json!({
					"code": "gh-code",
					"client_id": "mock-client",
					"client_secret": "mock-secret",
				}));
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"gho_token","token_type":"bearer","scope":"read:user"}"#);
		})
		.await;
	let user = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/user")
				.header("authorization", "token gho_token")
				.header_exists("user-agent");
			then.status(200).header("content-type", "application/json").body(
				r#"{"login":"octocat","id":583231,"avatar_url":"https://avatars.example.com/u/583231","name":"The Octocat","email":null}"#,
			);
		})
		.await;
	let github = adapter(
		"GitHub",
		&server,
		&[(EndpointRole::Token, "/login/oauth/access_token"), (EndpointRole::UserInfo, "/user")],
	);
	let credential = github.exchange_credential("gh-code").await.expect("Exchange should succeed.");

	assert_eq!(credential.token_type, "bearer");

	let identity = github.fetch_identity(&credential).await.expect("Profile should resolve.");

	assert_eq!(identity.id, "583231");
	assert_eq!(identity.username, "octocat");
	assert_eq!(identity.display_name, "The Octocat");
	assert_eq!(identity.email, None);

	token.assert_async().await;
	user.assert_async().await;
}

#[tokio::test]
async fn github_errors_in_success_bodies_are_remote_errors() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/login/oauth/access_token");
			then.status(200).header("content-type", "application/json").body(
				r#"{"error":"bad_verification_code","error_description":"The code passed is incorrect or expired."}"#,
			);
		})
		.await;

	let err = adapter("GitHub", &server, &[(EndpointRole::Token, "/login/oauth/access_token")])
		.exchange_credential("expired")
		.await
		.expect_err("Bad codes must fail.");

	assert!(matches!(
		err,
		Error::Remote { code: RemoteCode::Symbolic(ref code), ref message }
			if code == "bad_verification_code" && message == "The code passed is incorrect or expired."
	));
}

#[tokio::test]
async fn gitee_keeps_the_secret_out_of_the_query() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.query_param("grant_type", "authorization_code")
				.query_param("code", "gitee-code")
				.query_param("client_id", "mock-client")
				.query_param("redirect_uri", "https://app.example.com/callback")
				.query_param_missing("client_secret")
				.form_urlencoded_tuple("client_secret", "mock-secret");
			then.status(200).header("content-type", "application/json").body(
				r#"{"access_token":"gitee-token","token_type":"bearer","expires_in":86400,"refresh_token":"gitee-refresh","scope":"user_info","created_at":1700000000}"#,
			);
		})
		.await;
	let user = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v5/user").query_param("access_token", "gitee-token");
			then.status(200).header("content-type", "application/json").body(
				r#"{"id":1024,"login":"gitee-dev","name":"码云开发者","email":"dev@gitee.example.com","avatar_url":"https://gitee.example.com/a.png"}"#,
			);
		})
		.await;
	let gitee = adapter(
		"Gitee",
		&server,
		&[(EndpointRole::Token, "/oauth/token"), (EndpointRole::UserInfo, "/api/v5/user")],
	);
	let credential = gitee.exchange_credential("gitee-code").await.expect("Exchange should succeed.");
	let identity = gitee.fetch_identity(&credential).await.expect("Profile should resolve.");

	assert_eq!(identity.id, "1024");
	assert_eq!(identity.username, "gitee-dev");
	assert_eq!(identity.display_name, "码云开发者");
	assert_eq!(identity.email.as_deref(), Some("dev@gitee.example.com"));

	token.assert_async().await;
	user.assert_async().await;
}

#[tokio::test]
async fn gitlab_uses_the_standard_code_grant() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.form_urlencoded_tuple("grant_type", "authorization_code")
				.form_urlencoded_tuple("code", "gl-code")
				.form_urlencoded_tuple("client_id", "mock-client")
				.form_urlencoded_tuple("client_secret", "mock-secret")
				.form_urlencoded_tuple("redirect_uri", "https://app.example.com/callback");
			then.status(200).header("content-type", "application/json").body(
				r#"{"access_token":"gl-token","token_type":"Bearer","refresh_token":"gl-refresh","created_at":1700000000}"#,
			);
		})
		.await;
	let user = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v4/user").header("authorization", "Bearer gl-token");
			then.status(200).header("content-type", "application/json").body(
				r#"{"id":42,"username":"tanuki","name":"Tanuki","email":"tanuki@gitlab.example.com","avatar_url":null}"#,
			);
		})
		.await;
	let gitlab = adapter(
		"GitLab",
		&server,
		&[(EndpointRole::Token, "/oauth/token"), (EndpointRole::UserInfo, "/api/v4/user")],
	);
	let credential = gitlab.exchange_credential("gl-code").await.expect("Exchange should succeed.");

	assert_eq!(credential.access_token.expose(), "gl-token");
	assert_eq!(credential.refresh_token.as_ref().map(|token| token.expose()), Some("gl-refresh"));
	// No `expires_in`: the default fallback lifetime applies.
	assert!(credential.expiry.is_some_and(|expiry| expiry > OffsetDateTime::now_utc()));

	let identity = gitlab.fetch_identity(&credential).await.expect("Profile should resolve.");

	assert_eq!(identity.id, "42");
	assert_eq!(identity.username, "tanuki");
	assert_eq!(identity.avatar_url, None);

	token.assert_async().await;
	user.assert_async().await;
}

#[tokio::test]
async fn gitlab_oauth_errors_map_to_remote_errors() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(400).header("content-type", "application/json").body(
				r#"{"error":"invalid_grant","error_description":"The provided authorization grant is invalid."}"#,
			);
		})
		.await;

	let err = adapter("GitLab", &server, &[(EndpointRole::Token, "/oauth/token")])
		.exchange_credential("bad")
		.await
		.expect_err("Invalid grants must fail.");

	assert!(matches!(
		err,
		Error::Remote { code: RemoteCode::Symbolic(ref code), .. } if code == "invalid_grant"
	));
}

#[tokio::test]
async fn unauthorized_profiles_without_a_body_report_the_status() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/user");
			then.status(401).body("");
		})
		.await;

	let err = adapter("GitHub", &server, &[(EndpointRole::UserInfo, "/user")])
		.fetch_identity(&Credential::bearer("revoked"))
		.await
		.expect_err("Revoked tokens must fail.");

	assert!(matches!(err, Error::UnexpectedStatus { status: 401, .. }));
}

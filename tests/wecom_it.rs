#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use idp_broker::{
	_preludet::*,
	adapter::{Adapter, IdentityProvider},
	auth::{Credential, CredentialExtra},
	error::ConfigError,
	provider::{EndpointRole, ProviderRegistry},
};

fn adapter(kind: &str, server: &MockServer, routes: &[(EndpointRole, &str)]) -> Adapter {
	let config = mock_config_builder(kind, &server.url(""), routes)
		.build()
		.expect("WeCom config should build.");

	ProviderRegistry::new(test_reqwest_transport())
		.create(config)
		.expect("WeCom adapter should build.")
}

#[tokio::test]
async fn third_party_login_redeems_the_code_during_fetch() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/cgi-bin/service/get_provider_token").json_body(
				serde_json::json!({ "corpid": "mock-client", "provider_secret": "mock-secret" }),
			);
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"provider_access_token":"provider-token","expires_in":7200}"#);
		})
		.await;
	let login = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/cgi-bin/service/get_login_info")
				.query_param("access_token", "provider-token")
				.json_body(serde_json::json!({ "auth_code": "wecom-code" }));
			then.status(200).header("content-type", "application/json").body(
				r#"{"errcode":0,"errmsg":"ok","usertype":1,"user_info":{"userid":"zhangsan","open_userid":"woAJ2GCAAA","name":"Zhang San","avatar":"https://img.example.com/zs.png"},"corp_info":{"corpid":"wxCorpId"}}"#,
			);
		})
		.await;
	let adapter = adapter(
		"WeCom",
		&server,
		&[
			(EndpointRole::Token, "/cgi-bin/service/get_provider_token"),
			(EndpointRole::UserInfo, "/cgi-bin/service/get_login_info"),
		],
	);
	let credential = adapter.exchange_credential("wecom-code").await.expect("Exchange should succeed.");

	assert_eq!(credential.extra, CredentialExtra::AuthCode { code: "wecom-code".into() });

	let identity = adapter.fetch_identity(&credential).await.expect("Login info should resolve.");

	assert_eq!(identity.id, "woAJ2GCAAA");
	assert_eq!(identity.username, "Zhang San");
	assert_eq!(identity.extra.get("wecom_userid").map(String::as_str), Some("zhangsan"));
	assert_eq!(identity.extra.get("wecom_corpid").map(String::as_str), Some("wxCorpId"));
	assert_eq!(identity.extra.get("wecom_usertype").map(String::as_str), Some("1"));

	token.assert_async().await;
	login.assert_async().await;
}

#[tokio::test]
async fn internal_login_reads_the_member_profile() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/cgi-bin/gettoken")
				.query_param("corpid", "mock-client")
				.query_param("corpsecret", "mock-secret");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"errcode":0,"errmsg":"ok","access_token":"corp-token","expires_in":7200}"#);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/cgi-bin/user/getuserinfo")
				.query_param("access_token", "corp-token")
				.query_param("code", "member-code");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"errcode":0,"errmsg":"ok","UserId":"lisi","DeviceId":""}"#);
		})
		.await;

	let member = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/cgi-bin/user/get")
				.query_param("access_token", "corp-token")
				.query_param("userid", "lisi");
			then.status(200).header("content-type", "application/json").body(
				r#"{"errcode":0,"errmsg":"ok","userid":"lisi","name":"Li Si","email":"lisi@corp.example.com","mobile":"13700000000","avatar":"https://img.example.com/ls.png"}"#,
			);
		})
		.await;
	let adapter = adapter(
		"WeComInternal",
		&server,
		&[
			(EndpointRole::Token, "/cgi-bin/gettoken"),
			(EndpointRole::SubjectLookup, "/cgi-bin/user/getuserinfo"),
			(EndpointRole::UserInfo, "/cgi-bin/user/get"),
		],
	);
	let credential =
		adapter.exchange_credential("member-code").await.expect("Exchange should succeed.");
	let identity = adapter.fetch_identity(&credential).await.expect("Member should resolve.");

	assert_eq!(identity.id, "lisi");
	assert_eq!(identity.username, "Li Si");
	assert_eq!(identity.email.as_deref(), Some("lisi@corp.example.com"));
	assert_eq!(identity.phone.as_deref(), Some("13700000000"));

	member.assert_async().await;
}

#[tokio::test]
async fn internal_login_rejects_non_members() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/cgi-bin/user/getuserinfo");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"errcode":0,"errmsg":"ok","OpenId":"outsider-open-id"}"#);
		})
		.await;

	let adapter = adapter(
		"WeComInternal",
		&server,
		&[(EndpointRole::SubjectLookup, "/cgi-bin/user/getuserinfo")],
	);
	let credential = Credential::bearer("corp-token")
		.with_extra(CredentialExtra::AuthCode { code: "outsider-code".into() });
	let err = adapter.fetch_identity(&credential).await.expect_err("Outsiders must be rejected.");

	assert!(matches!(err, Error::SubjectRejected { .. }));
}

#[tokio::test]
async fn foreign_credentials_are_refused_without_network_calls() {
	let server = MockServer::start_async().await;
	let adapter = adapter("WeCom", &server, &[]);
	let err = adapter
		.fetch_identity(&Credential::bearer("token"))
		.await
		.expect_err("Credentials without an auth code must fail.");

	assert!(matches!(
		err,
		Error::Config(ConfigError::CredentialMismatch { kind: "WeCom", expected: "auth_code" })
	));
}

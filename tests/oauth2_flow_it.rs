mod common;

// std
use std::collections::HashMap;
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use time::Duration;
// self
use common::*;
use oauth_handshake::{
	auth::ClientCredentials,
	error::{Error, NotAuthenticatedError, TokenExchangeError, TransportError},
	flows::{AccessTokenParams, AuthorizeParams, PkcePair},
	http_types::Method,
	provider::{ClientAuthMethod, ProviderQuirks},
	request::ApiRequest,
};

const CLIENT_ID: &str = "abc";
const CLIENT_SECRET: &str = "client-secret";
const REDIRECT_URI: &str = "https://app.test/callback";

fn credentials() -> ClientCredentials {
	ClientCredentials::new(CLIENT_ID, CLIENT_SECRET)
}

#[test]
fn authorize_url_emits_each_required_parameter_once() {
	let descriptor = oauth2_builder().build().expect("OAuth 2.0 descriptor should build.");
	let (client, transport) = mock_client(descriptor, credentials());
	let mut client = client.with_redirect_uri(REDIRECT_URI);
	let pkce = PkcePair::generate();
	let params = AuthorizeParams::default()
		.scopes(["read", "write"])
		.state("xyz")
		.pkce(&pkce)
		.param("client_id", "spoofed")
		.param("prompt", "consent");
	let url = client.oauth2().expect("Descriptor should speak OAuth 2.0.").authorize_url(&params);
	let query = url.query().expect("Authorize URL should carry a query.");

	assert!(query.contains("client_id=abc"));
	assert!(query.contains("scope=read%20write"));
	assert!(!query.contains("spoofed"));

	let pairs = url.query_pairs().into_owned().collect::<Vec<_>>();

	for key in ["client_id", "response_type", "redirect_uri", "scope", "state", "code_challenge"] {
		assert_eq!(pairs.iter().filter(|(k, _)| k == key).count(), 1, "`{key}` should appear once.");
	}

	let pairs = pairs.into_iter().collect::<HashMap<_, _>>();

	assert_eq!(pairs.get("response_type").map(String::as_str), Some("code"));
	assert_eq!(pairs.get("redirect_uri").map(String::as_str), Some(REDIRECT_URI));
	assert_eq!(pairs.get("code_challenge").map(String::as_str), Some(pkce.challenge()));
	assert_eq!(pairs.get("code_challenge_method").map(String::as_str), Some("S256"));
	assert_eq!(pairs.get("prompt").map(String::as_str), Some("consent"));
	assert!(transport.requests().is_empty());
}

#[test]
fn authorize_url_uses_provider_scope_separator() {
	let descriptor = oauth2_builder()
		.scope_separator(",")
		.build()
		.expect("OAuth 2.0 descriptor should build.");
	let (mut client, _) = mock_client(descriptor, credentials());
	let url = client
		.oauth2()
		.expect("Descriptor should speak OAuth 2.0.")
		.authorize_url(&AuthorizeParams::default().scopes(["email", "public_profile"]));

	assert!(url.as_str().contains("scope=email%2Cpublic_profile"));
	assert!(!url.as_str().contains("redirect_uri"));
}

#[tokio::test]
async fn code_exchange_stores_access_token_and_keeps_extras() {
	let descriptor = oauth2_builder().build().expect("OAuth 2.0 descriptor should build.");
	let (client, transport) = mock_client(descriptor, credentials());
	let mut client = client.with_redirect_uri(REDIRECT_URI);
	let pkce = PkcePair::generate();

	transport.push(reply(200, Some(JSON), r#"{"access_token":"tok123","token_type":"bearer"}"#));

	let token = client
		.oauth2()
		.expect("Descriptor should speak OAuth 2.0.")
		.access_token("auth-code", AccessTokenParams::default().pkce(&pkce))
		.await
		.expect("Code exchange should succeed.");

	assert_eq!(token.access_token.expose(), "tok123");
	assert_eq!(token.extra.len(), 1);
	assert_eq!(token.token_type(), Some("bearer"));
	assert_eq!(client.credentials().bearer(), Some("tok123"));

	let recorded = transport.last();
	let form = recorded.form();

	assert_eq!(recorded.method, Method::POST);
	assert_eq!(recorded.url.path(), "/oauth2/token");
	assert_eq!(recorded.header("accept"), Some("application/json"));
	assert_eq!(recorded.header("content-type"), Some(FORM));
	assert_eq!(param(&form, "grant_type"), Some("authorization_code"));
	assert_eq!(param(&form, "code"), Some("auth-code"));
	assert_eq!(param(&form, "redirect_uri"), Some(REDIRECT_URI));
	assert_eq!(param(&form, "code_verifier"), Some(pkce.verifier()));
	assert_eq!(param(&form, "client_id"), Some(CLIENT_ID));
	assert_eq!(param(&form, "client_secret"), Some(CLIENT_SECRET));

	let request = client
		.build_request(ApiRequest::get("user"))
		.expect("Token should authorize API requests.");

	assert_eq!(request.url.as_str(), "https://api.provider.test/v2/user");
	assert_eq!(request.header_str("authorization"), Some("Bearer tok123"));
}

#[tokio::test]
async fn form_encoded_token_replies_parse_like_json() {
	let descriptor = oauth2_builder().build().expect("OAuth 2.0 descriptor should build.");
	let (mut client, transport) = mock_client(descriptor, credentials());

	transport.push(reply(200, Some("text/plain"), "access_token=tok123&scope=user&expires_in=3600"));

	let token = client
		.oauth2()
		.expect("Descriptor should speak OAuth 2.0.")
		.access_token("auth-code", AccessTokenParams::default())
		.await
		.expect("Form reply should parse.");

	assert_eq!(token.access_token.expose(), "tok123");
	assert_eq!(token.scope(), Some("user"));
	assert_eq!(token.expires_in(), Some(Duration::hours(1)));
}

#[tokio::test]
async fn provider_error_payload_is_surfaced_verbatim() {
	let descriptor = oauth2_builder().build().expect("OAuth 2.0 descriptor should build.");
	let (mut client, transport) = mock_client(descriptor, credentials());
	let body = r#"{"error":"bad_verification_code","error_description":"The code passed is incorrect or expired."}"#;

	// Some providers report errors with a 200 status.
	transport.push(reply(200, Some(JSON), body));

	let err = client
		.oauth2()
		.expect("Descriptor should speak OAuth 2.0.")
		.access_token("stale-code", AccessTokenParams::default())
		.await
		.expect_err("Error payload should fail the exchange.");

	match err {
		Error::TokenExchange(ref e @ TokenExchangeError::Provider { ref error, .. }) => {
			assert_eq!(error, "bad_verification_code");
			assert_eq!(e.payload(), body);
			assert!(err.to_string().contains("The code passed is incorrect or expired."));
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	assert_eq!(client.credentials().access_token, None);
}

#[tokio::test]
async fn status_without_error_payload_reports_retry_after() {
	let descriptor = oauth2_builder().build().expect("OAuth 2.0 descriptor should build.");
	let (mut client, transport) = mock_client(descriptor, credentials());
	let mut response = reply(429, Some(JSON), r#"{"message":"slow down"}"#);

	response.headers_mut().insert(
		"retry-after",
		"30".parse().expect("Retry-After fixture should be a valid header value."),
	);
	transport.push(response);

	let err = client
		.oauth2()
		.expect("Descriptor should speak OAuth 2.0.")
		.refresh("refresh-1")
		.await
		.expect_err("Rate limited refresh should fail.");

	assert!(matches!(
		err,
		Error::Transport(TransportError::Status { status: 429, retry_after: Some(after), .. })
			if after == Duration::seconds(30)
	));
}

#[tokio::test]
async fn refresh_with_basic_auth_replaces_access_token() {
	let descriptor = oauth2_builder()
		.client_auth_method(ClientAuthMethod::ClientSecretBasic)
		.build()
		.expect("OAuth 2.0 descriptor should build.");
	let (mut client, transport) =
		mock_client(descriptor, credentials().with_access_token("expired-token"));

	transport.push(reply(
		200,
		Some(JSON),
		r#"{"access_token":"fresh-token","refresh_token":"refresh-2","expires_in":7200}"#,
	));

	let token = client
		.oauth2()
		.expect("Descriptor should speak OAuth 2.0.")
		.refresh("refresh-1")
		.await
		.expect("Refresh should succeed.");

	assert_eq!(token.refresh_token(), Some("refresh-2"));
	assert_eq!(token.expires_in(), Some(Duration::hours(2)));
	assert_eq!(client.credentials().bearer(), Some("fresh-token"));

	let recorded = transport.last();
	let form = recorded.form();
	let expected = format!("Basic {}", STANDARD.encode(format!("{CLIENT_ID}:{CLIENT_SECRET}")));

	assert_eq!(recorded.header("authorization"), Some(expected.as_str()));
	assert_eq!(param(&form, "grant_type"), Some("refresh_token"));
	assert_eq!(param(&form, "refresh_token"), Some("refresh-1"));
	assert_eq!(param(&form, "client_secret"), None);
}

#[tokio::test]
async fn extras_cannot_spoof_client_authentication() {
	let spoofed = || {
		AccessTokenParams::default()
			.param("client_id", "evil")
			.param("client_secret", "x")
			.param("audience", "api")
	};
	let descriptor = oauth2_builder().build().expect("OAuth 2.0 descriptor should build.");
	let (mut client, transport) = mock_client(descriptor, credentials());

	transport.push(reply(200, Some(JSON), r#"{"access_token":"tok123"}"#));
	client
		.oauth2()
		.expect("Descriptor should speak OAuth 2.0.")
		.access_token("c", spoofed())
		.await
		.expect("Code exchange should succeed.");

	let form = transport.last().form();

	for key in ["client_id", "client_secret"] {
		assert_eq!(form.iter().filter(|(k, _)| k == key).count(), 1, "`{key}` should appear once.");
	}

	assert_eq!(param(&form, "client_id"), Some(CLIENT_ID));
	assert_eq!(param(&form, "client_secret"), Some(CLIENT_SECRET));
	assert_eq!(param(&form, "audience"), Some("api"));

	let descriptor = oauth2_builder()
		.client_auth_method(ClientAuthMethod::ClientSecretBasic)
		.build()
		.expect("OAuth 2.0 descriptor should build.");
	let (mut client, transport) = mock_client(descriptor, credentials());

	transport.push(reply(200, Some(JSON), r#"{"access_token":"tok123"}"#));
	client
		.oauth2()
		.expect("Descriptor should speak OAuth 2.0.")
		.access_token("c", spoofed())
		.await
		.expect("Code exchange should succeed.");

	let recorded = transport.last();
	let form = recorded.form();

	assert!(recorded.header("authorization").is_some_and(|value| value.starts_with("Basic ")));
	assert_eq!(param(&form, "client_id"), None);
	assert_eq!(param(&form, "client_secret"), None);
	assert_eq!(param(&form, "audience"), Some("api"));
}

#[tokio::test]
async fn custom_token_field_is_required() {
	let descriptor = oauth2_builder()
		.quirks(ProviderQuirks { access_token_key: "token".into(), ..Default::default() })
		.build()
		.expect("OAuth 2.0 descriptor should build.");
	let (mut client, transport) = mock_client(descriptor, credentials());

	transport.push(reply(200, Some(JSON), r#"{"access_token":"ignored"}"#));

	let err = client
		.oauth2()
		.expect("Descriptor should speak OAuth 2.0.")
		.access_token("code", AccessTokenParams::default())
		.await
		.expect_err("Reply without the configured field should fail.");

	assert!(matches!(
		err,
		Error::TokenExchange(TokenExchangeError::MissingField { ref field, .. }) if field == "token"
	));

	transport.push(reply(200, Some(JSON), r#"{"token":"custom"}"#));

	let token = client
		.oauth2()
		.expect("Descriptor should speak OAuth 2.0.")
		.access_token("code", AccessTokenParams::default())
		.await
		.expect("Reply with the configured field should succeed.");

	assert_eq!(token.access_token.expose(), "custom");
}

#[tokio::test]
async fn blank_client_id_is_rejected_before_sending() {
	let descriptor = oauth2_builder().build().expect("OAuth 2.0 descriptor should build.");
	let (mut client, transport) = mock_client(descriptor, ClientCredentials::new(" ", "secret"));
	let err = client
		.oauth2()
		.expect("Descriptor should speak OAuth 2.0.")
		.access_token("code", AccessTokenParams::default())
		.await
		.expect_err("Blank client id should fail.");

	assert!(matches!(
		err,
		Error::NotAuthenticated(NotAuthenticatedError::MissingClientCredentials)
	));
	assert!(transport.requests().is_empty());
}

//! Shared fixtures for integration tests: a scripted transport that records every request.

#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::{Arc, Mutex},
};
// crates.io
use percent_encoding::percent_decode_str;
// self
use oauth_handshake::{
	auth::{ClientCredentials, ProviderId},
	flows::Client,
	http::{HttpRequest, HttpResponse, HttpTransport, TransportFuture},
	http_types::{HeaderMap, HeaderValue, Method, StatusCode, header::CONTENT_TYPE},
	provider::{ProtocolVersion, ProviderDescriptor, ProviderDescriptorBuilder},
	url::Url,
};

pub const FORM: &str = "application/x-www-form-urlencoded";
pub const JSON: &str = "application/json";

#[derive(Debug)]
pub struct Offline;
impl Display for Offline {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "No scripted response left.")
	}
}
impl StdError for Offline {}

/// Request as seen by the transport.
#[derive(Clone, Debug)]
pub struct Recorded {
	pub method: Method,
	pub url: Url,
	pub headers: HeaderMap,
	pub body: Vec<u8>,
}
impl Recorded {
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	pub fn query(&self) -> Vec<(String, String)> {
		self.url.query_pairs().into_owned().collect()
	}

	pub fn form(&self) -> Vec<(String, String)> {
		url::form_urlencoded::parse(&self.body).into_owned().collect()
	}
}

/// Transport replaying scripted responses in order; fails once the script runs dry.
#[derive(Default)]
pub struct RecordingTransport {
	responses: Mutex<VecDeque<HttpResponse>>,
	requests: Mutex<Vec<Recorded>>,
}
impl RecordingTransport {
	pub fn push(&self, response: HttpResponse) {
		self.responses
			.lock()
			.expect("Response script lock should not be poisoned.")
			.push_back(response);
	}

	pub fn requests(&self) -> Vec<Recorded> {
		self.requests.lock().expect("Request log lock should not be poisoned.").clone()
	}

	pub fn last(&self) -> Recorded {
		self.requests().pop().expect("Transport should have recorded a request.")
	}
}
impl HttpTransport for RecordingTransport {
	type TransportError = Offline;

	fn send(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		let (parts, body) = request.into_parts();
		let recorded = Recorded {
			method: parts.method,
			url: Url::parse(&parts.uri.to_string()).expect("Recorded URI should be absolute."),
			headers: parts.headers,
			body,
		};

		self.requests.lock().expect("Request log lock should not be poisoned.").push(recorded);

		let next =
			self.responses.lock().expect("Response script lock should not be poisoned.").pop_front();

		Box::pin(async move { next.ok_or(Offline) })
	}
}

pub fn url(value: &str) -> Url {
	Url::parse(value).expect("Failed to parse test URL.")
}

pub fn reply(status: u16, content_type: Option<&str>, body: &str) -> HttpResponse {
	let mut response = HttpResponse::new(body.as_bytes().to_vec());

	*response.status_mut() = StatusCode::from_u16(status).expect("Test status should be valid.");

	if let Some(content_type) = content_type {
		response.headers_mut().insert(
			CONTENT_TYPE,
			HeaderValue::from_str(content_type).expect("Test content type should be valid."),
		);
	}

	response
}

pub fn oauth1_builder() -> ProviderDescriptorBuilder {
	ProviderDescriptor::builder(
		ProviderId::new("mock-oauth1").expect("Provider identifier should be valid."),
		ProtocolVersion::OAuth1,
	)
	.request_token_endpoint(url("https://provider.test/oauth/request_token"))
	.authorization_endpoint(url("https://provider.test/oauth/authorize"))
	.access_token_endpoint(url("https://provider.test/oauth/access_token"))
	.api_base(url("https://api.provider.test/1.1/"))
}

pub fn oauth2_builder() -> ProviderDescriptorBuilder {
	ProviderDescriptor::builder(
		ProviderId::new("mock-oauth2").expect("Provider identifier should be valid."),
		ProtocolVersion::OAuth2,
	)
	.authorization_endpoint(url("https://provider.test/oauth2/authorize"))
	.access_token_endpoint(url("https://provider.test/oauth2/token"))
	.api_base(url("https://api.provider.test/v2/"))
}

pub fn mock_client(
	descriptor: ProviderDescriptor,
	credentials: ClientCredentials,
) -> (Client<RecordingTransport>, Arc<RecordingTransport>) {
	let transport = Arc::new(RecordingTransport::default());
	let client = Client::with_transport(descriptor, credentials, transport.clone());

	(client, transport)
}

/// Decodes an `Authorization: OAuth ...` header into its parameters, in header order.
pub fn oauth_header_params(header: &str) -> Vec<(String, String)> {
	header
		.strip_prefix("OAuth ")
		.expect("Header should use the OAuth scheme.")
		.split(", ")
		.map(|part| {
			let (key, value) = part.split_once('=').expect("Header part should be key=value.");
			let value = value.trim_matches('"');

			(decode(key), decode(value))
		})
		.collect()
}

pub fn decode(value: &str) -> String {
	percent_decode_str(value).decode_utf8().expect("Header value should be UTF-8.").into_owned()
}

pub fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
	params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

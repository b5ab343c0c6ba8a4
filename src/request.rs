//! Authenticated request building.
//!
//! [`ApiRequest`] describes a provider API call the way callers think about it (verb, URL,
//! parameters, headers, body). [`Client::build_request`] resolves it against the
//! descriptor and injects credentials per its placement rule: a fresh OAuth 1.0a signature
//! for every call, or the OAuth 2.0 bearer token. [`Client::send`] hands the result to the
//! transport, and [`Client::user_info`] does the same for the profile endpoint.

// std
use std::{borrow::Cow, collections::BTreeMap};
// crates.io
use oauth2::http::{
	HeaderName,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
use rand::{Rng, distr::Alphanumeric};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::ClientCredentials,
	encode::encode_pairs,
	error::{ConfigError, NotAuthenticatedError},
	flows::Client,
	http::{HttpRequest, HttpResponse, HttpTransport},
	obs::{self, FlowKind, FlowSpan},
	provider::{CredentialPlacement, ProtocolVersion, ProviderDescriptor},
	response,
	sign::{self, SignatureInput},
};

const NONCE_LEN: usize = 32;
const OAUTH_PREFIX: &str = "oauth_";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Outgoing API call before credentials are attached.
///
/// `url` may be absolute or relative to the descriptor's `base_url`. `params` travel in the
/// query string; form bodies are set with [`ApiRequest::form`].
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute URL or path relative to the descriptor's base URL.
	pub url: String,
	/// Query parameters, in caller order.
	pub params: Vec<(String, String)>,
	/// Extra request headers.
	pub headers: HeaderMap,
	/// Request body.
	pub body: RequestBody,
}
impl ApiRequest {
	/// Creates a request without parameters, headers, or body.
	pub fn new(method: Method, url: impl Into<String>) -> Self {
		Self {
			method,
			url: url.into(),
			params: Vec::new(),
			headers: HeaderMap::new(),
			body: RequestBody::Empty,
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(url: impl Into<String>) -> Self {
		Self::new(Method::GET, url)
	}

	/// Shorthand for a `POST` request.
	pub fn post(url: impl Into<String>) -> Self {
		Self::new(Method::POST, url)
	}

	/// Appends a query parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.push((key.into(), value.into()));

		self
	}

	/// Appends every query parameter yielded by `params`.
	pub fn params<I, K, V>(mut self, params: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.params.extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));

		self
	}

	/// Sets a request header, replacing any previous value.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Appends form fields, switching the body to `application/x-www-form-urlencoded`.
	pub fn form<I, K, V>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		if !matches!(self.body, RequestBody::Form(_)) {
			self.body = RequestBody::Form(Vec::new());
		}
		if let RequestBody::Form(existing) = &mut self.body {
			existing.extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
		}

		self
	}

	/// Sets an opaque body. Opaque bodies never take part in OAuth 1.0a signatures.
	pub fn raw_body(mut self, content_type: Option<&str>, bytes: impl Into<Vec<u8>>) -> Self {
		self.body =
			RequestBody::Raw { content_type: content_type.map(str::to_owned), bytes: bytes.into() };

		self
	}
}

/// Body attached to an [`ApiRequest`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RequestBody {
	/// No body.
	#[default]
	Empty,
	/// Form fields, signed under OAuth 1.0a.
	Form(Vec<(String, String)>),
	/// Opaque bytes with an optional content type.
	Raw {
		/// `Content-Type` header value.
		content_type: Option<String>,
		/// Body bytes.
		bytes: Vec<u8>,
	},
}

/// Request description after credential injection.
#[derive(Clone, Debug)]
pub struct AuthorizedRequest {
	/// HTTP method.
	pub method: Method,
	/// Final URL including every query parameter.
	pub url: Url,
	/// Headers including any `Authorization` value.
	pub headers: HeaderMap,
	/// Encoded body.
	pub body: Vec<u8>,
}
impl AuthorizedRequest {
	/// Returns a header as text when it is present and valid UTF-8.
	pub fn header_str(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	/// Returns the decoded query pairs of the final URL.
	pub fn query_pairs(&self) -> Vec<(String, String)> {
		self.url.query_pairs().into_owned().collect()
	}

	/// Converts the description into an HTTP request for an [`HttpTransport`].
	pub fn into_http(self) -> Result<HttpRequest, ConfigError> {
		let mut request = oauth2::http::Request::builder()
			.method(self.method)
			.uri(self.url.as_str())
			.body(self.body)?;

		*request.headers_mut() = self.headers;

		Ok(request)
	}
}

/// Raw provider API response returned by [`Client::send`].
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers.
	pub headers: HeaderMap,
	/// Response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Returns true for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns the body as text, replacing invalid UTF-8.
	pub fn text(&self) -> Cow<'_, str> {
		response::lossy(&self.body)
	}

	/// Deserializes the body as JSON.
	pub fn json<T>(&self) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
	where
		T: DeserializeOwned,
	{
		let mut de = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut de)
	}
}
impl From<HttpResponse> for ApiResponse {
	fn from(response: HttpResponse) -> Self {
		let status = response.status().as_u16();
		let (parts, body) = response.into_parts();

		Self { status, headers: parts.headers, body }
	}
}

impl<T> Client<T>
where
	T: ?Sized + HttpTransport,
{
	/// Decorates `request` with the credentials the descriptor's placement rule asks for.
	///
	/// OAuth 1.0a requests get a new nonce, timestamp, and signature on every call; caller
	/// parameters named `oauth_*` join the protocol parameters and a caller-supplied
	/// `oauth_signature` is discarded. OAuth 2.0 requests fail with
	/// [`NotAuthenticatedError::MissingAccessToken`] when no access token is set.
	pub fn build_request(&self, request: ApiRequest) -> Result<AuthorizedRequest> {
		let _span = FlowSpan::new(FlowKind::SignedRequest, "build_request").entered();
		let ApiRequest { method, url, params, headers, body } = request;
		let url = self.descriptor.resolve_url(&url)?;
		let mut draft = Draft { method, url, headers, body };

		match self.descriptor.version {
			ProtocolVersion::OAuth1 => {
				let (protocol, params) = split_protocol_params(params);
				let mut signer = OAuth1Signer::new(&self.descriptor, &self.credentials)?;

				if let Some((token, secret)) = self.credentials.token_pair()? {
					signer = signer.with_token(token, secret);
				}

				draft.append_query(&params);
				signer.apply(&mut draft, protocol)?;
			},
			ProtocolVersion::OAuth2 => {
				draft.append_query(&params);
				apply_bearer(&self.descriptor, &self.credentials, &mut draft)?;
			},
		}

		draft.finish().map_err(Into::into)
	}

	/// Builds the authorized request and sends it through the transport.
	///
	/// The response is returned as-is; non-2xx statuses are not treated as errors here.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		obs::observe(FlowKind::SignedRequest, "send", async move {
			let authorized = self.build_request(request)?;
			let response = self.dispatch(authorized).await?;

			Ok(ApiResponse::from(response))
		})
		.await
	}

	/// Fetches the authenticated user's profile from the descriptor's user info endpoint.
	///
	/// The reply is returned untouched; mapping it onto a profile is up to the caller.
	pub async fn user_info(&self) -> Result<ApiResponse> {
		let url = self.descriptor.endpoints.user_info.as_ref().ok_or_else(|| {
			ConfigError::MissingUserInfoEndpoint { descriptor: self.descriptor.id.to_string() }
		})?;

		self.send(ApiRequest::get(url.as_str())).await
	}
}

/// Mutable request under construction.
#[derive(Debug)]
pub(crate) struct Draft {
	pub(crate) method: Method,
	pub(crate) url: Url,
	pub(crate) headers: HeaderMap,
	pub(crate) body: RequestBody,
}
impl Draft {
	pub(crate) fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: RequestBody::Empty }
	}

	pub(crate) fn append_query(&mut self, pairs: &[(String, String)]) {
		append_query(&mut self.url, pairs);
	}

	pub(crate) fn append_form(&mut self, pairs: Vec<(String, String)>) -> Result<(), ConfigError> {
		if self.body == RequestBody::Empty {
			self.body = RequestBody::Form(Vec::new());
		}

		match &mut self.body {
			RequestBody::Form(existing) => {
				existing.extend(pairs);

				Ok(())
			},
			_ => Err(ConfigError::BodyPlacementRequiresForm),
		}
	}

	fn form_pairs(&self) -> &[(String, String)] {
		match &self.body {
			RequestBody::Form(pairs) => pairs,
			_ => &[],
		}
	}

	pub(crate) fn finish(self) -> Result<AuthorizedRequest, ConfigError> {
		let Draft { method, url, mut headers, body } = self;
		let body = match body {
			RequestBody::Empty => Vec::new(),
			RequestBody::Form(pairs) => {
				if !headers.contains_key(CONTENT_TYPE) {
					headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
				}

				encode_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))).into_bytes()
			},
			RequestBody::Raw { content_type, bytes } => {
				if let Some(content_type) = content_type {
					headers.insert(CONTENT_TYPE, HeaderValue::from_str(&content_type)?);
				}

				bytes
			},
		};

		Ok(AuthorizedRequest { method, url, headers, body })
	}
}

/// Signs one request with the consumer credentials and an optional token.
pub(crate) struct OAuth1Signer<'a> {
	descriptor: &'a ProviderDescriptor,
	consumer_key: &'a str,
	consumer_secret: &'a str,
	token: Option<&'a str>,
	token_secret: Option<&'a str>,
}
impl<'a> OAuth1Signer<'a> {
	/// Creates a signer carrying only the consumer credentials.
	pub(crate) fn new(
		descriptor: &'a ProviderDescriptor,
		credentials: &'a ClientCredentials,
	) -> Result<Self, NotAuthenticatedError> {
		credentials.ensure_client()?;

		Ok(Self {
			descriptor,
			consumer_key: &credentials.client_id,
			consumer_secret: credentials.client_secret.expose(),
			token: None,
			token_secret: None,
		})
	}

	pub(crate) fn with_token(mut self, token: &'a str, token_secret: Option<&'a str>) -> Self {
		self.token = Some(token);
		self.token_secret = token_secret;

		self
	}

	/// Computes the signature over the draft's URL, form body, and protocol parameters, then
	/// injects the protocol parameters per the descriptor's placement.
	pub(crate) fn apply(&self, draft: &mut Draft, extra: Vec<(String, String)>) -> Result<()> {
		let mut oauth = BTreeMap::new();

		oauth.insert("oauth_consumer_key".to_owned(), self.consumer_key.to_owned());
		oauth.insert("oauth_nonce".to_owned(), nonce());
		oauth.insert(
			"oauth_signature_method".to_owned(),
			self.descriptor.signature_method.as_str().to_owned(),
		);
		oauth.insert(
			"oauth_timestamp".to_owned(),
			OffsetDateTime::now_utc().unix_timestamp().to_string(),
		);
		oauth.insert("oauth_version".to_owned(), "1.0".to_owned());

		if let Some(token) = self.token {
			oauth.insert("oauth_token".to_owned(), token.to_owned());
		}

		oauth.extend(extra);
		oauth.remove("oauth_signature");

		let input = SignatureInput::new(draft.method.as_str(), draft.url.as_str())
			.params(draft.form_pairs().iter().cloned())
			.params(oauth.iter().map(|(k, v)| (k.clone(), v.clone())));
		let signature = sign::sign(
			self.descriptor.signature_method,
			&input,
			self.consumer_secret,
			self.token_secret,
		)?;

		oauth.insert("oauth_signature".to_owned(), signature);

		let oauth = oauth.into_iter().collect::<Vec<_>>();

		match self.descriptor.credential_placement {
			CredentialPlacement::Header => {
				let realm = self.descriptor.quirks.realm.as_deref();
				let header = sign::authorization_header(realm, &oauth);
				let mut value = HeaderValue::from_str(&header).map_err(ConfigError::from)?;

				value.set_sensitive(true);
				draft.headers.insert(AUTHORIZATION, value);
			},
			CredentialPlacement::Query => draft.append_query(&oauth),
			CredentialPlacement::Body => draft.append_form(oauth)?,
		}

		Ok(())
	}
}

fn apply_bearer(
	descriptor: &ProviderDescriptor,
	credentials: &ClientCredentials,
	draft: &mut Draft,
) -> Result<()> {
	let placement = descriptor.credential_placement;
	let token = credentials
		.bearer()
		.ok_or(NotAuthenticatedError::MissingAccessToken { placement: placement.as_str() })?;
	let param = || vec![(descriptor.quirks.access_token_param.clone(), token.to_owned())];

	match placement {
		CredentialPlacement::Header => {
			let mut value =
				HeaderValue::from_str(&format!("Bearer {token}")).map_err(ConfigError::from)?;

			value.set_sensitive(true);
			draft.headers.insert(AUTHORIZATION, value);
		},
		CredentialPlacement::Query => draft.append_query(&param()),
		CredentialPlacement::Body => draft.append_form(param())?,
	}

	Ok(())
}

/// Splits caller parameters into OAuth protocol parameters and everything else.
pub(crate) fn split_protocol_params(
	params: Vec<(String, String)>,
) -> (Vec<(String, String)>, Vec<(String, String)>) {
	params.into_iter().partition(|(key, _)| key.starts_with(OAUTH_PREFIX))
}

/// Appends RFC 3986 encoded pairs after any query already on `url`.
pub(crate) fn append_query(url: &mut Url, pairs: &[(String, String)]) {
	if pairs.is_empty() {
		return;
	}

	let encoded = encode_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
	let query = match url.query() {
		Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
		_ => encoded,
	};

	url.set_query(Some(&query));
}

fn nonce() -> String {
	rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect()
}

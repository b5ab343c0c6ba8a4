// self
use crate::_prelude::*;

/// HTTP verb used for OAuth 1.0a token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenRequestMethod {
	/// `GET` with OAuth parameters per the credential placement.
	Get,
	/// `POST`, the RFC 5849 recommendation.
	#[default]
	Post,
}
impl TokenRequestMethod {
	/// Returns the matching HTTP method.
	pub fn method(self) -> Method {
		match self {
			TokenRequestMethod::Get => Method::GET,
			TokenRequestMethod::Post => Method::POST,
		}
	}
}

/// Provider-specific quirks that influence how flows behave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Token response field carrying the OAuth 2.0 access token.
	pub access_token_key: String,
	/// Parameter name used when the access token rides in the query string or body.
	pub access_token_param: String,
	/// Separator used to join scopes in authorize URLs.
	pub scope_separator: String,
	/// Verb used for OAuth 1.0a request-token and access-token calls.
	pub token_request_method: TokenRequestMethod,
	/// OAuth 1.0a `realm` emitted in the `Authorization` header.
	pub realm: Option<String>,
	/// Scopes requested by authorize URLs when the caller names none.
	pub default_scopes: Vec<String>,
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self {
			access_token_key: "access_token".into(),
			access_token_param: "access_token".into(),
			scope_separator: " ".into(),
			token_request_method: TokenRequestMethod::default(),
			realm: None,
			default_scopes: Vec::new(),
		}
	}
}

//! Serde-facing provider configuration.
//!
//! [`ProviderConfig`] mirrors the flat key set used in configuration files
//! (`request_token_url`, `authorize_url`, `access_token_url`, `signature_method`,
//! `version`, `access_token_key`, `credential_placement`, `scope_separator`, plus a few
//! optional extras such as `user_info_url`) and converts into a validated
//! [`ProviderDescriptor`].

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	provider::{
		ClientAuthMethod, CredentialPlacement, ProtocolVersion, ProviderDescriptor,
		ProviderDescriptorError, TokenRequestMethod,
	},
	sign::SignatureMethod,
};

/// Raw provider configuration as read from a file or literal.
///
/// Every key except `version` is optional; omitted keys fall back to the nominal protocol
/// behavior when converted with [`ProviderConfig::into_descriptor`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
	/// OAuth protocol version (`1.0` or `2.0`).
	pub version: ProtocolVersion,
	/// OAuth 1.0a temporary credential endpoint.
	pub request_token_url: Option<String>,
	/// Authorization endpoint.
	pub authorize_url: Option<String>,
	/// Token endpoint.
	pub access_token_url: Option<String>,
	/// `HMAC-SHA1` or `PLAINTEXT`.
	pub signature_method: Option<String>,
	/// Token response field carrying the OAuth 2.0 access token.
	pub access_token_key: Option<String>,
	/// Parameter name used for query/body access token placement.
	pub access_token_param: Option<String>,
	/// `header`, `query`, or `body`.
	pub credential_placement: Option<CredentialPlacement>,
	/// Separator joining scopes in authorize URLs.
	pub scope_separator: Option<String>,
	/// Base URL for relative API request URLs.
	pub base_url: Option<String>,
	/// Endpoint returning the authenticated user's profile.
	pub user_info_url: Option<String>,
	/// `GET` or `POST` for OAuth 1.0a token endpoint calls.
	pub token_request_method: Option<TokenRequestMethod>,
	/// `client_secret_post` or `client_secret_basic`.
	pub client_auth_method: Option<ClientAuthMethod>,
	/// OAuth 1.0a `realm` emitted in the `Authorization` header.
	pub realm: Option<String>,
	/// Scopes requested when an authorize URL names none.
	pub default_scopes: Option<Vec<String>>,
}
impl ProviderConfig {
	/// Creates an empty configuration for `version`.
	pub fn new(version: ProtocolVersion) -> Self {
		Self {
			version,
			request_token_url: None,
			authorize_url: None,
			access_token_url: None,
			signature_method: None,
			access_token_key: None,
			access_token_param: None,
			credential_placement: None,
			scope_separator: None,
			base_url: None,
			user_info_url: None,
			token_request_method: None,
			client_auth_method: None,
			realm: None,
			default_scopes: None,
		}
	}

	/// Validates the configuration and converts it into a descriptor named `id`.
	pub fn into_descriptor(
		self,
		id: ProviderId,
	) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let mut builder = ProviderDescriptor::builder(id, self.version);

		if let Some(raw) = self.request_token_url {
			builder = builder.request_token_endpoint(parse_url("request_token_url", &raw)?);
		}
		if let Some(raw) = self.authorize_url {
			builder = builder.authorization_endpoint(parse_url("authorize_url", &raw)?);
		}
		if let Some(raw) = self.access_token_url {
			builder = builder.access_token_endpoint(parse_url("access_token_url", &raw)?);
		}
		if let Some(raw) = self.base_url {
			builder = builder.api_base(parse_url("base_url", &raw)?);
		}
		if let Some(raw) = self.user_info_url {
			builder = builder.user_info_endpoint(parse_url("user_info_url", &raw)?);
		}
		if let Some(raw) = self.signature_method {
			builder = builder.signature_method(raw.parse::<SignatureMethod>()?);
		}
		if let Some(key) = self.access_token_key {
			builder = builder.access_token_key(key);
		}
		if let Some(param) = self.access_token_param {
			builder = builder.access_token_param(param);
		}
		if let Some(placement) = self.credential_placement {
			builder = builder.credential_placement(placement);
		}
		if let Some(separator) = self.scope_separator {
			builder = builder.scope_separator(separator);
		}
		if let Some(method) = self.token_request_method {
			builder = builder.token_request_method(method);
		}
		if let Some(method) = self.client_auth_method {
			builder = builder.client_auth_method(method);
		}
		if let Some(realm) = self.realm {
			builder = builder.realm(realm);
		}
		if let Some(scopes) = self.default_scopes {
			builder = builder.default_scopes(scopes);
		}

		builder.build()
	}
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ProviderDescriptorError> {
	Url::parse(raw.trim())
		.map_err(|_| ProviderDescriptorError::InvalidUrl { field, url: raw.to_owned() })
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::error::SignatureError;

	fn id() -> ProviderId {
		ProviderId::new("custom").expect("Failed to build provider identifier.")
	}

	#[test]
	fn json_config_builds_descriptor() {
		let config: ProviderConfig = serde_json::from_value(json!({
			"request_token_url": "https://example.com/oauth/request_token",
			"authorize_url": "https://example.com/oauth/authorize",
			"access_token_url": "https://example.com/oauth/access_token",
			"signature_method": "PLAINTEXT",
			"version": "1.0",
			"credential_placement": "query",
			"base_url": "https://api.example.com/1/",
			"user_info_url": "https://api.example.com/1/account/me",
			"token_request_method": "GET",
			"realm": "Example"
		}))
		.expect("Configuration should deserialize.");
		let descriptor = config.into_descriptor(id()).expect("Configuration should validate.");

		assert_eq!(descriptor.version, ProtocolVersion::OAuth1);
		assert_eq!(descriptor.signature_method, SignatureMethod::Plaintext);
		assert_eq!(descriptor.credential_placement, CredentialPlacement::Query);
		assert_eq!(descriptor.quirks.token_request_method, TokenRequestMethod::Get);
		assert_eq!(descriptor.quirks.realm.as_deref(), Some("Example"));
		assert_eq!(
			descriptor.endpoints.api_base.as_ref().map(Url::as_str),
			Some("https://api.example.com/1/")
		);
		assert_eq!(
			descriptor.endpoints.user_info.as_ref().map(Url::as_str),
			Some("https://api.example.com/1/account/me")
		);
	}

	#[test]
	fn unknown_keys_and_bad_values_are_rejected() {
		let unknown = serde_json::from_value::<ProviderConfig>(json!({
			"version": "2.0",
			"authorise_url": "https://example.com/authorize"
		}));

		assert!(unknown.is_err());

		let mut config = ProviderConfig::new(ProtocolVersion::OAuth2);

		config.authorize_url = Some("https://example.com/authorize".into());
		config.access_token_url = Some("https://example.com/token".into());
		config.signature_method = Some("RSA-SHA1".into());

		assert_eq!(
			config.clone().into_descriptor(id()),
			Err(ProviderDescriptorError::Signature(SignatureError::UnsupportedMethod {
				method: "RSA-SHA1".into()
			}))
		);

		config.signature_method = None;
		config.access_token_url = Some("not a url".into());

		assert_eq!(
			config.into_descriptor(id()),
			Err(ProviderDescriptorError::InvalidUrl {
				field: "access_token_url",
				url: "not a url".into()
			})
		);
	}

	#[test]
	fn access_token_key_override_is_kept() {
		let mut config = ProviderConfig::new(ProtocolVersion::OAuth2);

		config.authorize_url = Some("https://example.com/authorize".into());
		config.access_token_url = Some("https://example.com/token".into());
		config.access_token_key = Some("oauth_token".into());
		config.scope_separator = Some(",".into());
		config.default_scopes = Some(vec!["offline".into()]);

		let descriptor = config.into_descriptor(id()).expect("Configuration should validate.");

		assert_eq!(descriptor.quirks.access_token_key, "oauth_token");
		assert_eq!(descriptor.quirks.access_token_param, "access_token");
		assert_eq!(descriptor.quirks.scope_separator, ",");
		assert_eq!(descriptor.quirks.default_scopes, ["offline"]);
	}
}
